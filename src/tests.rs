//! Unit tests for the typed SQLite access layer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::ffi;
use crate::params;

use super::*;

fn scratch() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT);")
        .expect("create table");
    conn
}

// ── Basic execution ─────────────────────────────────────────────────────

#[test]
fn insert_and_select_round_trip() {
    let conn = scratch();
    conn.execute(
        "INSERT INTO t (id, val) VALUES (?1, ?2)",
        params![1_i64, "hello"],
    )
    .expect("insert");
    let result = conn
        .query_row("SELECT val FROM t WHERE id = ?1", params![1_i64], |row| {
            row.get::<String>(0)
        })
        .expect("query");
    assert_eq!(result, "hello");
}

#[test]
fn create_insert_select_exact_row() {
    let conn = scratch();
    {
        let mut tx = conn.transaction().expect("begin");
        tx.execute("INSERT INTO t (id, val) VALUES (1, 'x')", &[])
            .expect("insert");
        tx.commit().expect("commit");
    }
    let rows = conn
        .query_map("SELECT id, val FROM t", &[], |row| {
            row.get_columns::<(i64, String)>(&[0, 1])
        })
        .expect("query");
    assert_eq!(rows, vec![(1, "x".to_string())]);
}

#[test]
fn query_row_no_rows_is_an_error() {
    let conn = scratch();
    let err = conn
        .query_row("SELECT id FROM t WHERE id = 999", &[], |row| {
            row.get::<i64>(0)
        })
        .unwrap_err();
    assert!(matches!(err, DbError::Step { .. }));
    assert_eq!(err.code(), ffi::SQLITE_DONE);
}

#[test]
fn query_row_optional_none() {
    let conn = scratch();
    let result = conn
        .query_row_optional("SELECT id FROM t WHERE id = 999", &[], |row| {
            row.get::<i64>(0)
        })
        .expect("query");
    assert!(result.is_none());
}

#[test]
fn last_insert_rowid_and_changes() {
    let conn = scratch();
    let changed = conn
        .execute("INSERT INTO t (id, val) VALUES (41, 'a')", &[])
        .expect("insert");
    assert_eq!(changed, 1);
    assert_eq!(conn.last_insert_rowid(), 41);
    let changed = conn
        .execute("UPDATE t SET val = 'b'", &[])
        .expect("update");
    assert_eq!(changed, 1);
    assert_eq!(conn.total_changes(), 2);
}

// ── Typed binding and extraction ────────────────────────────────────────

#[test]
fn bind_round_trip_preserves_values() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT ?1").expect("prepare");

    query.bind(1, 42_i64).expect("bind i64");
    {
        let mut rows = query.rows();
        let row = rows.next().expect("step").expect("row");
        assert_eq!(row.get::<i64>(0).expect("get"), 42);
    }
    query.reset_code();

    query.bind(1, 7_i32).expect("bind i32");
    {
        let mut rows = query.rows();
        let row = rows.next().expect("step").expect("row");
        assert_eq!(row.get::<i32>(0).expect("get"), 7);
    }
    query.reset_code();

    query.bind(1, 2.5_f64).expect("bind f64");
    {
        let mut rows = query.rows();
        let row = rows.next().expect("step").expect("row");
        assert!((row.get::<f64>(0).expect("get") - 2.5).abs() < f64::EPSILON);
        assert_eq!(row.column_type(0).expect("type"), ValueType::Real);
    }
    query.reset_code();

    query.bind(1, "text with ' quote").expect("bind text");
    {
        let mut rows = query.rows();
        let row = rows.next().expect("step").expect("row");
        assert_eq!(row.get::<String>(0).expect("get"), "text with ' quote");
    }
    query.reset_code();

    let data = vec![0xDE, 0xAD, 0xBE, 0xEF];
    query.bind(1, data.as_slice()).expect("bind blob");
    {
        let mut rows = query.rows();
        let row = rows.next().expect("step").expect("row");
        assert_eq!(row.get::<Vec<u8>>(0).expect("get"), data);
        assert_eq!(row.column_bytes(0).expect("bytes"), data.len());
    }
    query.reset_code();

    query.bind(1, Value::Null).expect("bind null");
    {
        let mut rows = query.rows();
        let row = rows.next().expect("step").expect("row");
        assert_eq!(row.column_type(0).expect("type"), ValueType::Null);
        assert_eq!(row.get::<Option<i64>>(0).expect("get"), None);
        assert_eq!(row.get::<String>(0).expect("get"), "");
        assert_eq!(row.value(0).expect("value"), Value::Null);
    }
}

#[test]
fn storage_class_coercion() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT 1, 'x'").expect("prepare");
    let mut rows = query.rows();
    let row = rows.next().expect("step").expect("row");
    assert!((row.get::<f64>(0).expect("get") - 1.0).abs() < f64::EPSILON);
    assert_eq!(row.get::<String>(0).expect("get"), "1");
    assert_eq!(row.get::<i64>(1).expect("get"), 0);
    assert_eq!(row.value(0).expect("value"), Value::Integer(1));
}

#[test]
fn bind_out_of_range_index_fails() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT ?1 + ?2").expect("prepare");
    assert_eq!(query.parameter_count(), 2);
    let err = query.bind(5, 1_i64).unwrap_err();
    assert!(matches!(err, DbError::Bind { .. }));
    assert_eq!(err.code(), ffi::SQLITE_RANGE);
}

#[test]
fn bind_after_step_requires_reset() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT ?1").expect("prepare");
    query.bind(1, 1_i64).expect("bind");
    assert_eq!(query.step().expect("step"), StepResult::Row);
    let err = query.bind(1, 2_i64).unwrap_err();
    assert!(matches!(err, DbError::Bind { .. }));
    assert_eq!(err.code(), ffi::SQLITE_MISUSE);
    query.reset_code();
    query.bind(1, 2_i64).expect("bind after reset");
}

#[test]
fn named_parameters() {
    let conn = scratch();
    let mut cmd = conn
        .command("INSERT INTO t (id, val) VALUES (:id, :val)")
        .expect("prepare");
    cmd.bind_named(":id", 7_i64).expect("bind id");
    cmd.bind_named(":val", "seven").expect("bind val");
    cmd.execute().expect("execute");
    let val = conn
        .query_row("SELECT val FROM t WHERE id = 7", &[], |row| {
            row.get::<String>(0)
        })
        .expect("query");
    assert_eq!(val, "seven");

    let mut other = conn
        .command("INSERT INTO t (id) VALUES (:id)")
        .expect("prepare");
    let err = other.bind_named(":missing", 1_i64).unwrap_err();
    assert!(matches!(err, DbError::Bind { .. }));
    assert_eq!(err.code(), ffi::SQLITE_RANGE);
}

#[test]
fn reset_retains_bindings() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT ?1").expect("prepare");
    query.bind(1, 9_i64).expect("bind");
    {
        let mut rows = query.rows();
        assert_eq!(rows.next().expect("step").expect("row").get::<i64>(0).expect("get"), 9);
    }
    query.reset_code();
    {
        let mut rows = query.rows();
        assert_eq!(rows.next().expect("step").expect("row").get::<i64>(0).expect("get"), 9);
    }
    query.clear_bindings();
    query.reset_code();
    {
        let mut rows = query.rows();
        let row = rows.next().expect("step").expect("row");
        assert_eq!(row.get::<Option<i64>>(0).expect("get"), None);
    }
}

// ── Iteration protocol ──────────────────────────────────────────────────

#[test]
fn bound_addition_yields_row_then_done() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT ?1 + ?2").expect("prepare");
    query.bind(1, 2_i64).expect("bind");
    query.bind(2, 3_i64).expect("bind");
    let mut rows = query.rows();
    let row = rows.next().expect("step").expect("row");
    assert_eq!(row.get::<i64>(0).expect("get"), 5);
    assert!(rows.next().expect("step").is_none());
}

#[test]
fn step_after_done_stays_done_until_reset() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT 1").expect("prepare");
    assert_eq!(query.step_code(), ffi::SQLITE_ROW);
    assert_eq!(query.step_code(), ffi::SQLITE_DONE);
    assert_eq!(query.step_code(), ffi::SQLITE_DONE);
    assert_eq!(query.step().expect("step"), StepResult::Done);
    assert_eq!(query.reset_code(), ffi::SQLITE_OK);
    assert_eq!(query.step_code(), ffi::SQLITE_ROW);
}

#[test]
fn finalized_statement_reports_misuse_and_can_be_reprepared() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT 1").expect("prepare");
    assert_eq!(query.finish(), ffi::SQLITE_OK);
    assert_eq!(query.finish(), ffi::SQLITE_OK);
    assert!(!query.is_prepared());
    assert_eq!(query.step_code(), ffi::SQLITE_MISUSE);
    let err = query.step().unwrap_err();
    assert!(matches!(err, DbError::Step { .. }));
    assert_eq!(query.reset_code(), ffi::SQLITE_OK);

    query.prepare("SELECT 2").expect("re-prepare");
    let mut rows = query.rows();
    assert_eq!(rows.next().expect("step").expect("row").get::<i64>(0).expect("get"), 2);
}

#[test]
fn query_map_collects_all_rows() {
    let conn = scratch();
    conn.execute_batch(
        "INSERT INTO t (id, val) VALUES (1, 'a');
         INSERT INTO t (id, val) VALUES (2, 'b');
         INSERT INTO t (id, val) VALUES (3, 'c');",
    )
    .expect("seed");
    let ids = conn
        .query_map("SELECT id FROM t ORDER BY id", &[], |row| row.get::<i64>(0))
        .expect("query");
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn column_metadata_contract() {
    let conn = scratch();
    let mut query = conn.query("SELECT id, val FROM t").expect("prepare");
    // Query-level metadata is valid from prepare time.
    assert_eq!(query.column_count(), 2);
    assert_eq!(query.column_name(0).as_deref(), Some("id"));
    assert_eq!(query.column_name(1).as_deref(), Some("val"));
    assert_eq!(query.column_decltype(0).as_deref(), Some("INTEGER"));
    assert_eq!(query.column_decltype(1).as_deref(), Some("TEXT"));
    assert!(query.column_name(5).is_none());
    // Row-level accessors exist only while positioned: the only way to get a
    // Row at all is a successful next().
    {
        let mut rows = query.rows();
        assert!(rows.next().expect("step").is_none());
    }
    // Still valid after exhaustion.
    assert_eq!(query.column_count(), 2);
}

#[test]
fn getter_stream_and_tuple_extraction() {
    let conn = Connection::open_in_memory().expect("open");
    let mut query = conn.query("SELECT 1, 2.5, 'x'").expect("prepare");
    let mut rows = query.rows();
    let row = rows.next().expect("step").expect("row");

    let mut getter = row.getter(0);
    assert_eq!(getter.read::<i64>().expect("read"), 1);
    assert!((getter.read::<f64>().expect("read") - 2.5).abs() < f64::EPSILON);
    assert_eq!(getter.read::<String>().expect("read"), "x");
    let err = getter.read::<i64>().unwrap_err();
    assert_eq!(err.code(), ffi::SQLITE_RANGE);

    let (a, b): (i64, String) = row.get_columns(&[0, 2]).expect("tuple");
    assert_eq!((a, b.as_str()), (1, "x"));
    let err = row.get_columns::<(i64, String)>(&[0]).unwrap_err();
    assert_eq!(err.code(), ffi::SQLITE_RANGE);
}

// ── Command execution ───────────────────────────────────────────────────

#[test]
fn binder_chains_positional_binds() {
    let conn = scratch();
    let mut cmd = conn
        .command("INSERT INTO t (id, val) VALUES (?1, ?2)")
        .expect("prepare");
    cmd.binder(1)
        .bind(5_i64)
        .expect("bind")
        .bind("five")
        .expect("bind");
    cmd.execute().expect("execute");
    let val = conn
        .query_row("SELECT val FROM t WHERE id = 5", &[], |row| {
            row.get::<String>(0)
        })
        .expect("query");
    assert_eq!(val, "five");
}

#[test]
fn binder_raises_on_first_failure() {
    let conn = scratch();
    let mut cmd = conn
        .command("INSERT INTO t (id) VALUES (?1)")
        .expect("prepare");
    let err = cmd.binder(1).bind(1_i64).expect("bind").bind(2_i64).unwrap_err();
    assert!(matches!(err, DbError::Bind { .. }));
}

#[test]
fn command_rejects_result_rows() {
    let conn = Connection::open_in_memory().expect("open");
    let mut cmd = conn.command("SELECT 1").expect("prepare");
    let err = cmd.execute().unwrap_err();
    assert!(matches!(err, DbError::Step { .. }));
    assert_eq!(err.code(), ffi::SQLITE_MISUSE);
}

#[test]
fn execute_all_runs_whole_batch() {
    let conn = Connection::open_in_memory().expect("open");
    let mut cmd = conn
        .command(
            "CREATE TABLE a (x INTEGER);
             CREATE TABLE b (y INTEGER);
             INSERT INTO a VALUES (1);
             INSERT INTO b VALUES (2);",
        )
        .expect("prepare");
    let changed = cmd.execute_all().expect("batch");
    assert_eq!(changed, 2);
    let n = conn
        .query_row("SELECT count(*) FROM b", &[], |row| row.get::<i64>(0))
        .expect("query");
    assert_eq!(n, 1);
}

#[test]
fn execute_all_stops_at_first_failure() {
    let conn = Connection::open_in_memory().expect("open");
    conn.execute_batch("CREATE TABLE a (x INTEGER);").expect("create");
    let mut cmd = conn
        .command(
            "INSERT INTO a VALUES (1);
             INSERT INTO no_such_table VALUES (2);
             INSERT INTO a VALUES (3);",
        )
        .expect("prepare");
    let err = cmd.execute_all().unwrap_err();
    assert!(matches!(err, DbError::Compile { .. }));
    let n = conn
        .query_row("SELECT count(*) FROM a", &[], |row| row.get::<i64>(0))
        .expect("query");
    assert_eq!(n, 1);
}

#[test]
fn prepare_rejects_bad_sql() {
    let conn = Connection::open_in_memory().expect("open");
    let err = conn.command("NOT REAL SQL").unwrap_err();
    assert!(matches!(err, DbError::Compile { .. }));
    assert!(!err.message().is_empty());
}

// ── Formatted execution ─────────────────────────────────────────────────

#[test]
fn execute_format_escapes_literals() {
    let conn = scratch();
    conn.execute_format(
        "INSERT INTO t (id, val) VALUES ({}, {})",
        params![10_i64, "it's"],
    )
    .expect("formatted insert");
    let val = conn
        .query_row("SELECT val FROM t WHERE id = 10", &[], |row| {
            row.get::<String>(0)
        })
        .expect("query");
    assert_eq!(val, "it's");

    let err = conn
        .execute_format("INSERT INTO t (id) VALUES ({})", &[])
        .unwrap_err();
    assert!(matches!(err, DbError::Bind { .. }));
}

// ── Transactions ────────────────────────────────────────────────────────

#[test]
fn transaction_commit_persists() {
    let conn = scratch();
    {
        let mut tx = conn.transaction().expect("begin");
        tx.execute("INSERT INTO t (id) VALUES (42)", &[]).expect("insert");
        tx.commit().expect("commit");
    }
    let id = conn
        .query_row("SELECT id FROM t WHERE id = 42", &[], |row| row.get::<i64>(0))
        .expect("query");
    assert_eq!(id, 42);
}

#[test]
fn transaction_rolls_back_on_drop() {
    let conn = scratch();
    {
        let tx = conn.transaction().expect("begin");
        tx.execute("INSERT INTO t (id) VALUES (99)", &[]).expect("insert");
        // Dropped without commit.
    }
    let result = conn
        .query_row_optional("SELECT id FROM t WHERE id = 99", &[], |row| {
            row.get::<i64>(0)
        })
        .expect("query");
    assert!(result.is_none());
}

#[test]
fn transaction_commit_on_drop_behavior() {
    let conn = scratch();
    {
        let mut tx = conn.transaction().expect("begin");
        tx.set_drop_behavior(DropBehavior::Commit);
        tx.execute("INSERT INTO t (id) VALUES (77)", &[]).expect("insert");
    }
    let id = conn
        .query_row("SELECT id FROM t WHERE id = 77", &[], |row| row.get::<i64>(0))
        .expect("query");
    assert_eq!(id, 77);
}

#[test]
fn transaction_completion_is_idempotent() {
    let conn = scratch();
    let mut tx = conn.transaction().expect("begin");
    tx.execute("INSERT INTO t (id) VALUES (5)", &[]).expect("insert");
    tx.commit().expect("commit");
    tx.commit().expect("second commit is a no-op");
    tx.rollback().expect("rollback after commit is a no-op");
    drop(tx);
    let id = conn
        .query_row("SELECT id FROM t WHERE id = 5", &[], |row| row.get::<i64>(0))
        .expect("query");
    assert_eq!(id, 5);
}

#[test]
fn committed_data_is_durable_across_connections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("durable.sqlite3");
    {
        let conn = Connection::open(&path, false).expect("open rw");
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT);")
            .expect("create");
        let mut tx = conn.transaction_immediate().expect("begin");
        tx.execute("INSERT INTO t (id, val) VALUES (1, 'x')", &[])
            .expect("insert");
        tx.commit().expect("commit");
    }
    let conn = Connection::open(&path, true).expect("open ro");
    let (id, val): (i64, String) = conn
        .query_row("SELECT id, val FROM t", &[], |row| row.get_columns(&[0, 1]))
        .expect("query");
    assert_eq!((id, val.as_str()), (1, "x"));
}

// ── Hooks ───────────────────────────────────────────────────────────────

#[test]
fn update_hook_observes_row_mutations() {
    let mut conn = scratch();
    let events: Arc<Mutex<Vec<(UpdateAction, String, i64)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    conn.set_update_hook(move |action, _database, table, rowid| {
        sink.lock().unwrap().push((action, table.to_string(), rowid));
    });

    conn.execute("INSERT INTO t (id, val) VALUES (1, 'a')", &[])
        .expect("insert");
    conn.execute("UPDATE t SET val = 'b' WHERE id = 1", &[])
        .expect("update");
    conn.execute("DELETE FROM t WHERE id = 1", &[]).expect("delete");

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (UpdateAction::Insert, "t".to_string(), 1),
            (UpdateAction::Update, "t".to_string(), 1),
            (UpdateAction::Delete, "t".to_string(), 1),
        ]
    );
}

#[test]
fn commit_hook_can_abort_the_commit() {
    let mut conn = scratch();
    conn.set_commit_hook(|| true);
    {
        let mut tx = conn.transaction().expect("begin");
        tx.execute("INSERT INTO t (id) VALUES (1)", &[]).expect("insert");
        let err = tx.commit().unwrap_err();
        assert!(matches!(err, DbError::Step { .. }));
    }
    conn.clear_hooks();
    let n = conn
        .query_row("SELECT count(*) FROM t", &[], |row| row.get::<i64>(0))
        .expect("query");
    assert_eq!(n, 0);
}

#[test]
fn commit_hook_returning_false_allows_the_commit() {
    let mut conn = scratch();
    let seen = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&seen);
    conn.set_commit_hook(move || {
        flag.store(true, Ordering::SeqCst);
        false
    });
    let mut tx = conn.transaction().expect("begin");
    tx.execute("INSERT INTO t (id) VALUES (2)", &[]).expect("insert");
    tx.commit().expect("commit");
    assert!(seen.load(Ordering::SeqCst));
}

#[test]
fn rollback_hook_fires_on_rollback() {
    let mut conn = scratch();
    let fired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fired);
    conn.set_rollback_hook(move || {
        flag.store(true, Ordering::SeqCst);
    });
    let mut tx = conn.transaction().expect("begin");
    tx.execute("INSERT INTO t (id) VALUES (3)", &[]).expect("insert");
    tx.rollback().expect("rollback");
    assert!(fired.load(Ordering::SeqCst));
}

#[test]
fn authorizer_can_deny_preparation() {
    let mut conn = scratch();
    conn.set_authorizer(|action: &AuthAction<'_>| {
        if action.code == ffi::SQLITE_INSERT {
            Authorization::Deny
        } else {
            Authorization::Allow
        }
    });
    let err = conn.command("INSERT INTO t (id) VALUES (1)").unwrap_err();
    assert!(matches!(err, DbError::Compile { .. }));
    assert_eq!(err.code(), ffi::SQLITE_AUTH);

    conn.clear_hooks();
    conn.execute("INSERT INTO t (id) VALUES (1)", &[])
        .expect("insert after clearing the authorizer");
}

#[test]
fn authorizer_ignore_reads_null() {
    let mut conn = scratch();
    conn.execute("INSERT INTO t (id, val) VALUES (1, 'secret')", &[])
        .expect("insert");
    conn.set_authorizer(|action: &AuthAction<'_>| {
        if action.code == ffi::SQLITE_READ && action.arg2 == Some("val") {
            Authorization::Ignore
        } else {
            Authorization::Allow
        }
    });
    let val = conn
        .query_row("SELECT val FROM t WHERE id = 1", &[], |row| {
            row.get::<Option<String>>(0)
        })
        .expect("query");
    assert!(val.is_none());
}

#[test]
fn busy_handler_mediates_lock_contention() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("contended.sqlite3");

    let writer = Connection::open(&path, false).expect("open writer");
    writer
        .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);")
        .expect("create");
    let _held = writer.transaction_immediate().expect("hold reserved lock");

    let mut blocked = Connection::open(&path, false).expect("open blocked");
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    blocked.set_busy_handler(move |_prior| {
        counter.fetch_add(1, Ordering::SeqCst);
        false
    });

    let err = blocked.transaction_immediate().unwrap_err();
    assert_eq!(err.code(), ffi::SQLITE_BUSY);
    assert!(attempts.load(Ordering::SeqCst) >= 1);

    // An engine-managed timeout replaces the handler and still surfaces
    // SQLITE_BUSY once it elapses.
    blocked
        .busy_timeout(std::time::Duration::from_millis(20))
        .expect("set timeout");
    let err = blocked.transaction_immediate().unwrap_err();
    assert_eq!(err.code(), ffi::SQLITE_BUSY);
}

// ── Attached databases ──────────────────────────────────────────────────

#[test]
fn attach_and_detach() {
    let dir = tempfile::tempdir().expect("tempdir");
    let aux_path = dir.path().join("aux.sqlite3");
    {
        let aux = Connection::open(&aux_path, false).expect("open aux");
        aux.execute_batch(
            "CREATE TABLE kv (k TEXT, v TEXT); INSERT INTO kv VALUES ('a', 'b');",
        )
        .expect("seed aux");
    }

    let conn = Connection::open_in_memory().expect("open");
    conn.attach(&aux_path, "extra").expect("attach");
    let v = conn
        .query_row("SELECT v FROM extra.kv WHERE k = 'a'", &[], |row| {
            row.get::<String>(0)
        })
        .expect("query attached");
    assert_eq!(v, "b");

    conn.detach("extra").expect("detach");
    let err = conn.query("SELECT v FROM extra.kv").unwrap_err();
    assert!(matches!(err, DbError::Compile { .. }));

    let err = conn.detach("extra").unwrap_err();
    assert!(matches!(err, DbError::Connection { .. }));
}

// ── Values and errors ───────────────────────────────────────────────────

#[test]
fn value_conversions() {
    assert_eq!(Value::from(7_i32), Value::Integer(7));
    assert_eq!(Value::from(7_i64), Value::Integer(7));
    assert_eq!(Value::from("x"), Value::Text("x".to_string()));
    assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(
        Value::from(vec![1_u8, 2]),
        Value::Blob(vec![1, 2])
    );
}

#[test]
fn errors_carry_code_and_message() {
    let conn = Connection::open_in_memory().expect("open");
    let err = conn.query("SELECT * FROM missing").unwrap_err();
    assert_eq!(err.code(), ffi::SQLITE_ERROR);
    assert!(err.message().contains("missing"));
    assert_eq!(conn.last_error_code(), ffi::SQLITE_ERROR);
    assert!(conn.last_error_message().contains("missing"));
}

#[test]
fn explicit_close_reports_success() {
    let conn = Connection::open_in_memory().expect("open");
    conn.execute_batch("CREATE TABLE t (id INTEGER);").expect("create");
    conn.close().expect("close");
}
