//! Typed, resource-safe access layer over the SQLite C API.
//!
//! The crate wraps the engine's handle/return-code interface in a small set
//! of owning types: [`Connection`] owns the session handle, [`Command`] and
//! [`Query`] each own one prepared statement and drive the
//! prepare → bind → step → reset/finalize lifecycle, [`Row`] lends typed
//! access to the current result row, and [`Transaction`] scopes a unit of
//! work with commit-or-rollback-on-drop semantics.
//!
//! The raw symbols come from `libsqlite3-sys` with the bundled amalgamation;
//! the `ffi` module is the only place that names them.
//!
//! ```no_run
//! use litebind::{params, Connection};
//!
//! # fn main() -> litebind::DbResult<()> {
//! let conn = Connection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT);")?;
//! conn.execute("INSERT INTO t (id, val) VALUES (?1, ?2)", params![1_i64, "hello"])?;
//! let val = conn.query_row("SELECT val FROM t WHERE id = ?1", params![1_i64], |row| {
//!     row.get::<String>(0)
//! })?;
//! assert_eq!(val, "hello");
//! # Ok(())
//! # }
//! ```

mod command;
mod connection;
pub mod error;
mod ffi;
mod hooks;
mod query;
mod row;
mod statement;
mod transaction;
pub mod value;

pub use command::{Binder, Command};
pub use connection::Connection;
pub use error::{DbError, DbResult};
pub use hooks::{AuthAction, Authorization, UpdateAction};
pub use query::{Query, Rows};
pub use row::{ColumnReader, FromColumn, FromColumns, Row};
pub use statement::{StatementCore, StepResult};
pub use transaction::{DropBehavior, Transaction, TransactionBehavior};
pub use value::{Value, ValueType};

#[cfg(test)]
mod tests;
