//! The shared lifecycle engine for prepared statements.
//!
//! [`StatementCore`] wraps one `sqlite3_stmt` handle and guards the
//! prepare → bind → step → reset/finalize cycle. It is not constructed
//! directly; [`Command`](crate::Command) and [`Query`](crate::Query) each own
//! one and deref to it.
//!
//! Two surfaces are exposed. The `*_code` primitives return the raw engine
//! result code without allocating, so callers that want to inspect codes can
//! do so cheaply. The checked wrappers ([`bind`](StatementCore::bind),
//! [`step`](StatementCore::step), ...) convert any unexpected code into a
//! typed [`DbError`] carrying the engine's code and message.

use std::ffi::{CStr, CString};
use std::os::raw::c_int;

use crate::error::{DbError, DbResult};
use crate::ffi;
use crate::value::Value;

/// Result of a successful [`step`](StatementCore::step) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A result row is available.
    Row,
    /// The statement has finished executing.
    Done,
}

/// Execution position of a prepared statement handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Ready to bind and step; either freshly prepared or reset.
    Prepared,
    /// The last step produced a row.
    OnRow,
    /// Execution has completed; stepping again stays here until reset.
    Done,
}

/// The lifecycle engine shared by [`Command`](crate::Command) and
/// [`Query`](crate::Query).
///
/// Owns the prepared-statement handle and finalizes it on drop, on every
/// exit path. The handle is null while unprepared or finalized; operations
/// in that state report `SQLITE_MISUSE` instead of touching the engine.
#[derive(Debug)]
pub struct StatementCore {
    db: *mut ffi::sqlite3,
    /// Raw handle. Null while unprepared or finalized.
    stmt: *mut ffi::sqlite3_stmt,
    state: State,
}

// Safety: the wrapper enforces single-owner semantics; the raw pointers are
// not shared across threads. Connection is not Sync, so statements built on
// it stay on one thread at a time.
unsafe impl Send for StatementCore {}

impl StatementCore {
    pub(crate) fn new(db: *mut ffi::sqlite3) -> Self {
        Self {
            db,
            stmt: std::ptr::null_mut(),
            state: State::Prepared,
        }
    }

    /// Compiles `sql`, finalizing any handle held so far. Returns the
    /// uncompiled tail of the input (text after the first statement).
    ///
    /// Whitespace- or comment-only input leaves the core unprepared without
    /// an error, matching the engine's contract.
    pub(crate) fn prepare(&mut self, sql: &str) -> DbResult<String> {
        self.finish();
        let c_sql = CString::new(sql)
            .map_err(|e| DbError::compile(ffi::SQLITE_ERROR, format!("nul in SQL: {e}")))?;
        let mut stmt: *mut ffi::sqlite3_stmt = std::ptr::null_mut();
        let mut tail: *const std::os::raw::c_char = std::ptr::null();
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(self.db, c_sql.as_ptr(), -1, &mut stmt, &mut tail)
        };
        if rc != ffi::SQLITE_OK {
            return Err(DbError::compile(rc, ffi::errmsg(self.db)));
        }
        let consumed = if tail.is_null() {
            sql.len()
        } else {
            usize::try_from(unsafe { tail.offset_from(c_sql.as_ptr()) }).unwrap_or(sql.len())
        };
        self.stmt = stmt;
        self.state = State::Prepared;
        Ok(sql.get(consumed..).unwrap_or_default().to_string())
    }

    /// True while a prepared handle is held.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        !self.stmt.is_null()
    }

    /// Number of parameter slots in the statement.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        if self.stmt.is_null() {
            return 0;
        }
        unsafe { ffi::sqlite3_bind_parameter_count(self.stmt) as usize }
    }

    // ── Raw result-code surface ─────────────────────────────────────────

    /// Binds `value` at 1-based `idx`, returning the raw engine code.
    ///
    /// Binding is only legal before the first step of an execution cycle or
    /// after a reset; otherwise `SQLITE_MISUSE` is returned without calling
    /// the engine.
    pub fn bind_code(&mut self, idx: usize, value: &Value) -> c_int {
        if self.stmt.is_null() || self.state != State::Prepared {
            return ffi::SQLITE_MISUSE;
        }
        let Ok(idx) = c_int::try_from(idx) else {
            return ffi::SQLITE_RANGE;
        };
        unsafe {
            match value {
                Value::Integer(v) => ffi::sqlite3_bind_int64(self.stmt, idx, *v),
                Value::Real(v) => ffi::sqlite3_bind_double(self.stmt, idx, *v),
                Value::Text(v) => ffi::sqlite3_bind_text(
                    self.stmt,
                    idx,
                    v.as_ptr().cast(),
                    v.len() as c_int,
                    ffi::SQLITE_TRANSIENT(),
                ),
                Value::Blob(v) => ffi::sqlite3_bind_blob(
                    self.stmt,
                    idx,
                    v.as_ptr().cast(),
                    v.len() as c_int,
                    ffi::SQLITE_TRANSIENT(),
                ),
                Value::Null => ffi::sqlite3_bind_null(self.stmt, idx),
            }
        }
    }

    /// Binds `value` to the parameter named `name` (including its `:`/`@`/`$`
    /// prefix), returning the raw engine code. An unknown name yields
    /// `SQLITE_RANGE`.
    pub fn bind_named_code(&mut self, name: &str, value: &Value) -> c_int {
        if self.stmt.is_null() {
            return ffi::SQLITE_MISUSE;
        }
        let Ok(c_name) = CString::new(name) else {
            return ffi::SQLITE_RANGE;
        };
        let idx = unsafe { ffi::sqlite3_bind_parameter_index(self.stmt, c_name.as_ptr()) };
        if idx == 0 {
            return ffi::SQLITE_RANGE;
        }
        self.bind_code(idx as usize, value)
    }

    /// Advances execution by one step, returning the raw engine code.
    ///
    /// Once the statement has completed, further calls return `SQLITE_DONE`
    /// without touching the engine until [`reset_code`](Self::reset_code) is
    /// called; this shields callers from the engine's implicit auto-reset.
    pub fn step_code(&mut self) -> c_int {
        if self.stmt.is_null() {
            return ffi::SQLITE_MISUSE;
        }
        if self.state == State::Done {
            return ffi::SQLITE_DONE;
        }
        let rc = unsafe { ffi::sqlite3_step(self.stmt) };
        match rc {
            ffi::SQLITE_ROW => self.state = State::OnRow,
            ffi::SQLITE_DONE => self.state = State::Done,
            _ => {}
        }
        rc
    }

    /// Returns the statement to the start of its execution cycle, retaining
    /// bindings. Never raises; safe to call in any state, with the engine's
    /// code reported via the return value.
    pub fn reset_code(&mut self) -> c_int {
        if self.stmt.is_null() {
            return ffi::SQLITE_OK;
        }
        self.state = State::Prepared;
        unsafe { ffi::sqlite3_reset(self.stmt) }
    }

    /// Clears all parameter bindings back to NULL, returning the raw engine
    /// code. Distinct from [`reset_code`](Self::reset_code), which retains
    /// them.
    pub fn clear_bindings(&mut self) -> c_int {
        if self.stmt.is_null() {
            return ffi::SQLITE_OK;
        }
        unsafe { ffi::sqlite3_clear_bindings(self.stmt) }
    }

    /// Releases the prepared-statement handle. Safe to call repeatedly; also
    /// runs on drop.
    pub fn finish(&mut self) -> c_int {
        if self.stmt.is_null() {
            return ffi::SQLITE_OK;
        }
        let rc = unsafe { ffi::sqlite3_finalize(self.stmt) };
        self.stmt = std::ptr::null_mut();
        rc
    }

    // ── Checked surface ─────────────────────────────────────────────────

    /// Binds `value` at 1-based `idx`, raising [`DbError::Bind`] on any
    /// non-success code.
    pub fn bind(&mut self, idx: usize, value: impl Into<Value>) -> DbResult<()> {
        let value = value.into();
        let rc = self.bind_code(idx, &value);
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(DbError::bind(rc, self.error_message(rc)))
        }
    }

    /// Binds `value` to the named parameter, raising [`DbError::Bind`] on
    /// any non-success code.
    pub fn bind_named(&mut self, name: &str, value: impl Into<Value>) -> DbResult<()> {
        let value = value.into();
        let rc = self.bind_named_code(name, &value);
        if rc == ffi::SQLITE_OK {
            return Ok(());
        }
        if rc == ffi::SQLITE_RANGE {
            return Err(DbError::bind(
                rc,
                format!("unknown or out-of-range parameter: {name}"),
            ));
        }
        Err(DbError::bind(rc, self.error_message(rc)))
    }

    /// Binds a slice of [`Value`]s to the statement parameters (1-indexed).
    pub fn bind_values(&mut self, values: &[Value]) -> DbResult<()> {
        for (i, val) in values.iter().enumerate() {
            let rc = self.bind_code(i + 1, val);
            if rc != ffi::SQLITE_OK {
                return Err(DbError::bind(rc, self.error_message(rc)));
            }
        }
        Ok(())
    }

    /// Executes a single step, raising [`DbError::Step`] for any code other
    /// than row-available or done.
    pub fn step(&mut self) -> DbResult<StepResult> {
        let rc = self.step_code();
        match rc {
            ffi::SQLITE_ROW => Ok(StepResult::Row),
            ffi::SQLITE_DONE => Ok(StepResult::Done),
            _ => Err(DbError::step(rc, self.error_message(rc))),
        }
    }

    // ── Column access (crate-internal; Row enforces positioning) ────────

    pub(crate) fn is_on_row(&self) -> bool {
        !self.stmt.is_null() && self.state == State::OnRow
    }

    pub(crate) fn column_count(&self) -> usize {
        if self.stmt.is_null() {
            return 0;
        }
        unsafe { ffi::sqlite3_column_count(self.stmt) as usize }
    }

    pub(crate) fn data_count(&self) -> usize {
        debug_assert!(self.is_on_row());
        unsafe { ffi::sqlite3_data_count(self.stmt) as usize }
    }

    pub(crate) fn column_type_code(&self, idx: usize) -> c_int {
        debug_assert!(self.is_on_row());
        unsafe { ffi::sqlite3_column_type(self.stmt, idx as c_int) }
    }

    pub(crate) fn column_i32(&self, idx: usize) -> i32 {
        debug_assert!(self.is_on_row());
        unsafe { ffi::sqlite3_column_int(self.stmt, idx as c_int) }
    }

    pub(crate) fn column_i64(&self, idx: usize) -> i64 {
        debug_assert!(self.is_on_row());
        unsafe { ffi::sqlite3_column_int64(self.stmt, idx as c_int) }
    }

    pub(crate) fn column_f64(&self, idx: usize) -> f64 {
        debug_assert!(self.is_on_row());
        unsafe { ffi::sqlite3_column_double(self.stmt, idx as c_int) }
    }

    /// Reads a column as UTF-8 text. Returns an empty string for NULL.
    pub(crate) fn column_text(&self, idx: usize) -> String {
        debug_assert!(self.is_on_row());
        unsafe {
            let ptr = ffi::sqlite3_column_text(self.stmt, idx as c_int);
            if ptr.is_null() {
                return String::new();
            }
            let len = ffi::sqlite3_column_bytes(self.stmt, idx as c_int);
            let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len as usize);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    /// Reads a column as a blob. Returns an empty `Vec` for NULL.
    pub(crate) fn column_blob(&self, idx: usize) -> Vec<u8> {
        debug_assert!(self.is_on_row());
        unsafe {
            let ptr = ffi::sqlite3_column_blob(self.stmt, idx as c_int);
            let len = ffi::sqlite3_column_bytes(self.stmt, idx as c_int);
            if ptr.is_null() || len <= 0 {
                return Vec::new();
            }
            std::slice::from_raw_parts(ptr.cast::<u8>(), len as usize).to_vec()
        }
    }

    pub(crate) fn column_bytes(&self, idx: usize) -> usize {
        debug_assert!(self.is_on_row());
        unsafe { ffi::sqlite3_column_bytes(self.stmt, idx as c_int) as usize }
    }

    pub(crate) fn column_name(&self, idx: usize) -> Option<String> {
        if self.stmt.is_null() {
            return None;
        }
        unsafe {
            let ptr = ffi::sqlite3_column_name(self.stmt, idx as c_int);
            if ptr.is_null() {
                None
            } else {
                Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
            }
        }
    }

    pub(crate) fn column_decltype(&self, idx: usize) -> Option<String> {
        if self.stmt.is_null() {
            return None;
        }
        unsafe {
            let ptr = ffi::sqlite3_column_decltype(self.stmt, idx as c_int);
            if ptr.is_null() {
                None
            } else {
                Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
            }
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn error_message(&self, rc: c_int) -> String {
        if self.stmt.is_null() {
            "statement is not prepared".to_string()
        } else if rc == ffi::SQLITE_MISUSE {
            "operation is not legal in the statement's current state".to_string()
        } else {
            ffi::errmsg(self.db)
        }
    }
}

impl Drop for StatementCore {
    fn drop(&mut self) {
        self.finish();
    }
}
