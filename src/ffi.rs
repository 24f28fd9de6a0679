//! Raw engine surface.
//!
//! All C symbols come from `libsqlite3-sys` (compiled from the bundled
//! amalgamation). This is the only module that names them; the rest of the
//! crate goes through these re-exports and the [`errmsg`] helper.

use std::ffi::CStr;

pub(crate) use libsqlite3_sys::{
    sqlite3, sqlite3_bind_blob, sqlite3_bind_double, sqlite3_bind_int64,
    sqlite3_bind_null, sqlite3_bind_parameter_count, sqlite3_bind_parameter_index,
    sqlite3_bind_text, sqlite3_busy_handler, sqlite3_busy_timeout, sqlite3_changes,
    sqlite3_clear_bindings, sqlite3_column_blob,
    sqlite3_column_bytes, sqlite3_column_count, sqlite3_column_decltype,
    sqlite3_column_double, sqlite3_column_int, sqlite3_column_int64,
    sqlite3_column_name, sqlite3_column_text, sqlite3_column_type,
    sqlite3_commit_hook, sqlite3_data_count, sqlite3_errcode, sqlite3_errmsg,
    sqlite3_exec, sqlite3_finalize, sqlite3_free, sqlite3_int64,
    sqlite3_last_insert_rowid, sqlite3_open_v2, sqlite3_prepare_v2,
    sqlite3_reset, sqlite3_rollback_hook, sqlite3_set_authorizer, sqlite3_step,
    sqlite3_stmt, sqlite3_total_changes, sqlite3_update_hook, SQLITE_AUTH,
    SQLITE_BLOB, SQLITE_BUSY, SQLITE_DELETE, SQLITE_DENY, SQLITE_DONE,
    SQLITE_ERROR, SQLITE_FLOAT, SQLITE_IGNORE, SQLITE_INSERT, SQLITE_INTEGER,
    SQLITE_MISUSE, SQLITE_NULL, SQLITE_OK, SQLITE_OPEN_CREATE,
    SQLITE_OPEN_FULLMUTEX, SQLITE_OPEN_READONLY, SQLITE_OPEN_READWRITE,
    SQLITE_RANGE, SQLITE_READ, SQLITE_ROW, SQLITE_TEXT, SQLITE_TRANSIENT,
};

// `libsqlite3-sys` 0.30's pregenerated bindings omit `sqlite3_close_v2`, but
// the bundled amalgamation exports it. Declare the binding directly so the
// crate keeps the deferred-close destructor it relies on.
extern "C" {
    pub(crate) fn sqlite3_close_v2(db: *mut sqlite3) -> std::os::raw::c_int;
}

/// Reads `sqlite3_errmsg` for `db` into an owned string.
pub(crate) fn errmsg(db: *mut sqlite3) -> String {
    unsafe {
        let ptr = sqlite3_errmsg(db);
        if ptr.is_null() {
            "unknown error".to_string()
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }
}
