//! Safe wrapper around a database connection.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::path::Path;
use std::time::Duration;

use crate::command::Command;
use crate::error::{DbError, DbResult};
use crate::ffi;
use crate::hooks::{
    self, AuthAction, Authorization, HookRegistry, UpdateAction,
};
use crate::query::Query;
use crate::row::Row;
use crate::transaction::{Transaction, TransactionBehavior};
use crate::value::Value;

/// A database connection.
///
/// The connection exclusively owns the engine handle and is closed when
/// dropped. It is **not** `Sync`: all access must happen from a single
/// logical flow of control at a time, and every statement or transaction
/// built on it must be dropped before the connection is.
pub struct Connection {
    /// Raw `sqlite3*` handle.
    db: *mut ffi::sqlite3,
    hooks: HookRegistry,
}

// Safety: Connection is not Sync but is Send: it can be moved to another
// thread as long as only one thread accesses it at a time. Hook closures
// are required to be Send for the same reason.
unsafe impl Send for Connection {}

impl Connection {
    /// Opens (or creates) a database at `path`.
    ///
    /// Pass `read_only = true` for read-only access to an existing file.
    pub fn open(path: &Path, read_only: bool) -> DbResult<Self> {
        let path_str = path.to_string_lossy();
        let c_path = CString::new(path_str.as_bytes())
            .map_err(|e| DbError::connection(ffi::SQLITE_ERROR, format!("invalid path: {e}")))?;

        let flags = if read_only {
            ffi::SQLITE_OPEN_READONLY | ffi::SQLITE_OPEN_FULLMUTEX
        } else {
            ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE | ffi::SQLITE_OPEN_FULLMUTEX
        };

        let mut db: *mut ffi::sqlite3 = std::ptr::null_mut();
        let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, std::ptr::null()) };
        if rc != ffi::SQLITE_OK {
            // If open failed but we got a handle, extract the error and close.
            let msg = if db.is_null() {
                format!("sqlite3_open_v2 returned {rc}")
            } else {
                let m = ffi::errmsg(db);
                unsafe {
                    ffi::sqlite3_close_v2(db);
                }
                m
            };
            return Err(DbError::connection(rc, msg));
        }
        log::debug!("opened database at {}", path.display());
        Ok(Self {
            db,
            hooks: HookRegistry::default(),
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(Path::new(":memory:"), false)
    }

    pub(crate) fn raw_db(&self) -> *mut ffi::sqlite3 {
        self.db
    }

    /// Closes the connection, releasing the engine handle.
    ///
    /// Dropping the connection closes it too; this form reports the
    /// engine's close code instead of discarding it.
    pub fn close(mut self) -> DbResult<()> {
        let rc = unsafe { ffi::sqlite3_close_v2(self.db) };
        self.db = std::ptr::null_mut();
        if rc != ffi::SQLITE_OK {
            return Err(DbError::connection(rc, "failed to close connection"));
        }
        Ok(())
    }

    // ── One-shot execution ──────────────────────────────────────────────

    /// Executes one or more SQL statements separated by semicolons.
    ///
    /// No result rows are returned and no parameters can be bound. Suitable
    /// for DDL, PRAGMAs, and multi-statement scripts.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let c_sql = CString::new(sql)
            .map_err(|e| DbError::compile(ffi::SQLITE_ERROR, format!("nul in SQL: {e}")))?;
        let mut errmsg: *mut c_char = std::ptr::null_mut();
        let rc = unsafe {
            ffi::sqlite3_exec(
                self.db,
                c_sql.as_ptr(),
                None,
                std::ptr::null_mut(),
                &mut errmsg,
            )
        };
        if rc != ffi::SQLITE_OK {
            let msg = if errmsg.is_null() {
                self.errmsg()
            } else {
                let s = unsafe { CStr::from_ptr(errmsg) }.to_string_lossy().into_owned();
                unsafe {
                    ffi::sqlite3_free(errmsg.cast());
                }
                s
            };
            return Err(DbError::step(rc, msg));
        }
        Ok(())
    }

    /// Prepares and executes a single SQL statement with the given
    /// parameters. Returns the number of rows changed.
    pub fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        let mut cmd = self.command(sql)?;
        cmd.bind_values(params)?;
        cmd.execute()
    }

    /// Substitutes each `{}` placeholder with the escaped SQL literal of
    /// the corresponding value, then executes the result as a batch.
    ///
    /// Prefer [`execute`](Self::execute) with bound parameters wherever the
    /// engine can parameterize; this exists for multi-statement scripts
    /// assembled from values.
    pub fn execute_format(&self, sql: &str, args: &[Value]) -> DbResult<()> {
        let rendered = format_sql(sql, args)?;
        self.execute_batch(&rendered)
    }

    // ── Prepared statements ─────────────────────────────────────────────

    /// Prepares a write-intent statement (DML, DDL, PRAGMA).
    pub fn command(&self, sql: &str) -> DbResult<Command<'_>> {
        Command::new(self, sql)
    }

    /// Prepares a read-intent statement.
    pub fn query(&self, sql: &str) -> DbResult<Query<'_>> {
        Query::new(self, sql)
    }

    /// Prepares and executes a statement, mapping exactly one result row.
    ///
    /// Returns an error if no row is produced.
    pub fn query_row<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl FnOnce(&Row<'_>) -> DbResult<T>,
    ) -> DbResult<T> {
        match self.query_row_optional(sql, params, mapper)? {
            Some(v) => Ok(v),
            None => Err(DbError::step(ffi::SQLITE_DONE, "query returned no rows")),
        }
    }

    /// Like [`query_row`](Self::query_row) but returns `Ok(None)` when no
    /// row is produced.
    pub fn query_row_optional<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl FnOnce(&Row<'_>) -> DbResult<T>,
    ) -> DbResult<Option<T>> {
        let mut query = self.query(sql)?;
        query.bind_values(params)?;
        let mut rows = query.rows();
        match rows.next()? {
            Some(row) => mapper(&row).map(Some),
            None => Ok(None),
        }
    }

    /// Prepares a statement and collects every matching row.
    pub fn query_map<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl Fn(&Row<'_>) -> DbResult<T>,
    ) -> DbResult<Vec<T>> {
        let mut query = self.query(sql)?;
        query.bind_values(params)?;
        let mut rows = query.rows();
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(mapper(&row)?);
        }
        Ok(results)
    }

    // ── Transactions ────────────────────────────────────────────────────

    /// Begins a deferred transaction that rolls back on drop unless
    /// committed.
    pub fn transaction(&self) -> DbResult<Transaction<'_>> {
        Transaction::begin(self, TransactionBehavior::Deferred)
    }

    /// Begins an immediate transaction (acquires a RESERVED lock right
    /// away).
    pub fn transaction_immediate(&self) -> DbResult<Transaction<'_>> {
        Transaction::begin(self, TransactionBehavior::Immediate)
    }

    // ── Attached databases ──────────────────────────────────────────────

    /// Attaches the database file at `path` under the schema name
    /// `schema`.
    pub fn attach(&self, path: &Path, schema: &str) -> DbResult<()> {
        let file = Value::from(path.to_string_lossy().into_owned());
        let sql = format!(
            "ATTACH DATABASE {} AS {}",
            file.to_sql_literal(),
            quote_identifier(schema)
        );
        self.execute_batch(&sql).map_err(DbError::into_connection)
    }

    /// Detaches a previously attached database.
    pub fn detach(&self, schema: &str) -> DbResult<()> {
        let sql = format!("DETACH DATABASE {}", quote_identifier(schema));
        self.execute_batch(&sql).map_err(DbError::into_connection)
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// Returns the rowid of the most recent successful INSERT.
    #[must_use]
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.db) }
    }

    /// Returns the number of rows changed by the most recent statement.
    #[must_use]
    pub fn changes(&self) -> usize {
        usize::try_from(unsafe { ffi::sqlite3_changes(self.db) }).unwrap_or(0)
    }

    /// Returns the number of rows changed since the connection opened.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        usize::try_from(unsafe { ffi::sqlite3_total_changes(self.db) }).unwrap_or(0)
    }

    /// Numeric result code of the most recent failed engine call.
    #[must_use]
    pub fn last_error_code(&self) -> i32 {
        unsafe { ffi::sqlite3_errcode(self.db) }
    }

    /// Message text of the most recent failed engine call.
    #[must_use]
    pub fn last_error_message(&self) -> String {
        self.errmsg()
    }

    /// Engine-managed busy wait: blocked operations retry for up to `d`
    /// before surfacing `SQLITE_BUSY`.
    ///
    /// Replaces any handler registered via
    /// [`set_busy_handler`](Self::set_busy_handler).
    pub fn busy_timeout(&mut self, d: Duration) -> DbResult<()> {
        let ms = c_int::try_from(d.as_millis()).unwrap_or(c_int::MAX);
        let rc = unsafe { ffi::sqlite3_busy_timeout(self.db, ms) };
        if rc != ffi::SQLITE_OK {
            return Err(DbError::connection(rc, self.errmsg()));
        }
        self.hooks.busy = None;
        Ok(())
    }

    // ── Hooks ───────────────────────────────────────────────────────────
    //
    // Each registration replaces the previous closure of that kind. Hooks
    // run synchronously, re-entrantly, inside the engine call that triggers
    // them (step, COMMIT, prepare) and must not touch this connection.

    /// Installs a busy handler, invoked with the number of prior attempts
    /// whenever an operation would block on a lock. Return `true` to retry,
    /// `false` to give up and surface `SQLITE_BUSY`.
    ///
    /// Replaces any [`busy_timeout`](Self::busy_timeout).
    pub fn set_busy_handler<F>(&mut self, handler: F)
    where
        F: FnMut(i32) -> bool + Send + 'static,
    {
        let boxed: Box<hooks::BusyHandler> = Box::new(Box::new(handler));
        let ptr = &*boxed as *const hooks::BusyHandler as *mut c_void;
        unsafe {
            ffi::sqlite3_busy_handler(self.db, Some(hooks::busy_trampoline), ptr);
        }
        self.hooks.busy = Some(boxed);
    }

    /// Installs a commit hook, invoked immediately before a transaction
    /// commits. Returning `true` aborts the commit, turning it into a
    /// rollback.
    pub fn set_commit_hook<F>(&mut self, hook: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let boxed: Box<hooks::CommitHook> = Box::new(Box::new(hook));
        let ptr = &*boxed as *const hooks::CommitHook as *mut c_void;
        unsafe {
            ffi::sqlite3_commit_hook(self.db, Some(hooks::commit_trampoline), ptr);
        }
        self.hooks.commit = Some(boxed);
    }

    /// Installs a rollback hook, invoked after a transaction rolls back.
    pub fn set_rollback_hook<F>(&mut self, hook: F)
    where
        F: FnMut() + Send + 'static,
    {
        let boxed: Box<hooks::RollbackHook> = Box::new(Box::new(hook));
        let ptr = &*boxed as *const hooks::RollbackHook as *mut c_void;
        unsafe {
            ffi::sqlite3_rollback_hook(self.db, Some(hooks::rollback_trampoline), ptr);
        }
        self.hooks.rollback = Some(boxed);
    }

    /// Installs an update hook, invoked after each row-level
    /// insert/update/delete with the action, database name, table name, and
    /// rowid.
    pub fn set_update_hook<F>(&mut self, hook: F)
    where
        F: FnMut(UpdateAction, &str, &str, i64) + Send + 'static,
    {
        let boxed: Box<hooks::UpdateHook> = Box::new(Box::new(hook));
        let ptr = &*boxed as *const hooks::UpdateHook as *mut c_void;
        unsafe {
            ffi::sqlite3_update_hook(self.db, Some(hooks::update_trampoline), ptr);
        }
        self.hooks.update = Some(boxed);
    }

    /// Installs an authorizer, consulted during statement preparation for
    /// each access-controlled action. A [`Authorization::Deny`] makes the
    /// preparation fail with `SQLITE_AUTH`.
    pub fn set_authorizer<F>(&mut self, hook: F)
    where
        F: FnMut(&AuthAction<'_>) -> Authorization + Send + 'static,
    {
        let boxed: Box<hooks::Authorizer> = Box::new(Box::new(hook));
        let ptr = &*boxed as *const hooks::Authorizer as *mut c_void;
        unsafe {
            ffi::sqlite3_set_authorizer(self.db, Some(hooks::authorizer_trampoline), ptr);
        }
        self.hooks.authorizer = Some(boxed);
    }

    /// Unregisters every hook installed on this connection.
    pub fn clear_hooks(&mut self) {
        unsafe {
            ffi::sqlite3_busy_handler(self.db, None, std::ptr::null_mut());
            ffi::sqlite3_commit_hook(self.db, None, std::ptr::null_mut());
            ffi::sqlite3_rollback_hook(self.db, None, std::ptr::null_mut());
            ffi::sqlite3_update_hook(self.db, None, std::ptr::null_mut());
            ffi::sqlite3_set_authorizer(self.db, None, std::ptr::null_mut());
        }
        self.hooks = HookRegistry::default();
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn errmsg(&self) -> String {
        ffi::errmsg(self.db)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.db.is_null() {
            unsafe {
                ffi::sqlite3_close_v2(self.db);
            }
            self.db = std::ptr::null_mut();
            log::debug!("connection closed");
        }
    }
}

/// Replaces each `{}` in `sql` with the escaped literal of the matching
/// value; the placeholder and argument counts must agree.
fn format_sql(sql: &str, args: &[Value]) -> DbResult<String> {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    let mut used = 0;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        let Some(value) = args.get(used) else {
            return Err(DbError::bind(
                ffi::SQLITE_RANGE,
                format!("placeholder {} has no argument", used + 1),
            ));
        };
        out.push_str(&value.to_sql_literal());
        used += 1;
        rest = &rest[pos + 2..];
    }
    if used != args.len() {
        return Err(DbError::bind(
            ffi::SQLITE_RANGE,
            format!("{} arguments supplied for {used} placeholders", args.len()),
        ));
    }
    out.push_str(rest);
    Ok(out)
}

/// Double-quotes an identifier, doubling any embedded quotes.
fn quote_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
