//! Connection-level callback hooks.
//!
//! The engine invokes every hook synchronously and re-entrantly, inside the
//! call that triggers it (a step, a COMMIT, a prepare). Hook closures must
//! therefore not assume a separate scheduling context, and must not touch
//! the connection they are registered on.
//!
//! Registered closures are boxed twice so that a stable thin pointer can
//! cross the C boundary as the engine's user-data argument; the outer boxes
//! live in [`HookRegistry`], owned by the connection.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

use crate::ffi;

/// Decision returned by an authorizer hook for one access-controlled
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// Allow the action.
    Allow,
    /// Reject the whole statement at prepare time.
    Deny,
    /// Allow the statement, but treat the denied value as NULL.
    Ignore,
}

impl Authorization {
    fn into_code(self) -> c_int {
        match self {
            Self::Allow => ffi::SQLITE_OK,
            Self::Deny => ffi::SQLITE_DENY,
            Self::Ignore => ffi::SQLITE_IGNORE,
        }
    }
}

/// Row mutation kind reported to the update hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

impl UpdateAction {
    fn from_code(code: c_int) -> Self {
        match code {
            ffi::SQLITE_INSERT => Self::Insert,
            ffi::SQLITE_DELETE => Self::Delete,
            _ => Self::Update,
        }
    }
}

/// One access-controlled action submitted to the authorizer during
/// statement preparation.
#[derive(Debug)]
pub struct AuthAction<'a> {
    /// Engine action code (`SQLITE_READ`, `SQLITE_INSERT`, ...).
    pub code: c_int,
    /// First action argument (e.g. the table name); meaning depends on
    /// `code`.
    pub arg1: Option<&'a str>,
    /// Second action argument (e.g. the column name).
    pub arg2: Option<&'a str>,
    /// Name of the database the action applies to (`main`, `temp`, ...).
    pub database: Option<&'a str>,
    /// Innermost trigger or view responsible for the access attempt, if
    /// any.
    pub accessor: Option<&'a str>,
}

pub(crate) type BusyHandler = Box<dyn FnMut(i32) -> bool + Send>;
pub(crate) type CommitHook = Box<dyn FnMut() -> bool + Send>;
pub(crate) type RollbackHook = Box<dyn FnMut() + Send>;
pub(crate) type UpdateHook = Box<dyn FnMut(UpdateAction, &str, &str, i64) + Send>;
pub(crate) type Authorizer = Box<dyn FnMut(&AuthAction<'_>) -> Authorization + Send>;

/// Hook closures currently registered on a connection.
#[derive(Default)]
pub(crate) struct HookRegistry {
    pub(crate) busy: Option<Box<BusyHandler>>,
    pub(crate) commit: Option<Box<CommitHook>>,
    pub(crate) rollback: Option<Box<RollbackHook>>,
    pub(crate) update: Option<Box<UpdateHook>>,
    pub(crate) authorizer: Option<Box<Authorizer>>,
}

unsafe fn opt_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        None
    } else {
        CStr::from_ptr(ptr).to_str().ok()
    }
}

pub(crate) unsafe extern "C" fn busy_trampoline(ctx: *mut c_void, count: c_int) -> c_int {
    let handler = &mut *ctx.cast::<BusyHandler>();
    c_int::from(handler(count))
}

pub(crate) unsafe extern "C" fn commit_trampoline(ctx: *mut c_void) -> c_int {
    let hook = &mut *ctx.cast::<CommitHook>();
    // Non-zero turns the commit into a rollback.
    c_int::from(hook())
}

pub(crate) unsafe extern "C" fn rollback_trampoline(ctx: *mut c_void) {
    let hook = &mut *ctx.cast::<RollbackHook>();
    hook();
}

pub(crate) unsafe extern "C" fn update_trampoline(
    ctx: *mut c_void,
    action: c_int,
    database: *const c_char,
    table: *const c_char,
    rowid: ffi::sqlite3_int64,
) {
    let hook = &mut *ctx.cast::<UpdateHook>();
    let database = opt_str(database).unwrap_or("");
    let table = opt_str(table).unwrap_or("");
    hook(UpdateAction::from_code(action), database, table, rowid);
}

pub(crate) unsafe extern "C" fn authorizer_trampoline(
    ctx: *mut c_void,
    code: c_int,
    arg1: *const c_char,
    arg2: *const c_char,
    database: *const c_char,
    accessor: *const c_char,
) -> c_int {
    let hook = &mut *ctx.cast::<Authorizer>();
    let action = AuthAction {
        code,
        arg1: opt_str(arg1),
        arg2: opt_str(arg2),
        database: opt_str(database),
        accessor: opt_str(accessor),
    };
    hook(&action).into_code()
}
