//! Read-intent statements and the row cursor.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::connection::Connection;
use crate::error::DbResult;
use crate::row::Row;
use crate::statement::{StatementCore, StepResult};

/// A prepared statement consumed through row iteration.
///
/// Created via [`Connection::query`]. Derefs to [`StatementCore`] for
/// binding and the raw result-code primitives. Finalized when dropped.
///
/// Iteration is single-pass and forward-only: there is exactly one live
/// cursor, and the only way to rewind is
/// [`reset_code`](StatementCore::reset_code), which starts a fresh pass with
/// the current bindings retained.
#[derive(Debug)]
pub struct Query<'conn> {
    core: StatementCore,
    _conn: PhantomData<&'conn Connection>,
}

impl<'conn> Query<'conn> {
    pub(crate) fn new(conn: &'conn Connection, sql: &str) -> DbResult<Self> {
        let mut core = StatementCore::new(conn.raw_db());
        core.prepare(sql)?;
        Ok(Self {
            core,
            _conn: PhantomData,
        })
    }

    /// Finalizes the current handle and compiles `sql` in its place.
    pub fn prepare(&mut self, sql: &str) -> DbResult<()> {
        self.core.prepare(sql)?;
        Ok(())
    }

    /// Number of columns the statement produces. Valid from prepare time.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.core.column_count()
    }

    /// Name of result column `idx`, or `None` when out of range. Valid from
    /// prepare time.
    #[must_use]
    pub fn column_name(&self, idx: usize) -> Option<String> {
        self.core.column_name(idx)
    }

    /// Declared type of result column `idx`; `None` for expressions and
    /// out-of-range indices. Valid from prepare time.
    #[must_use]
    pub fn column_decltype(&self, idx: usize) -> Option<String> {
        self.core.column_decltype(idx)
    }

    /// Starts (or continues) iteration over the result rows.
    pub fn rows(&mut self) -> Rows<'_> {
        Rows {
            core: &mut self.core,
        }
    }
}

impl Deref for Query<'_> {
    type Target = StatementCore;

    fn deref(&self) -> &StatementCore {
        &self.core
    }
}

impl DerefMut for Query<'_> {
    fn deref_mut(&mut self) -> &mut StatementCore {
        &mut self.core
    }
}

/// Forward-only cursor over a query's result rows.
///
/// Each [`next`](Self::next) steps the statement; a genuine engine error
/// raises [`DbError::Step`](crate::DbError::Step), while exhaustion keeps
/// yielding `Ok(None)` until the owning query is reset. The borrow on the
/// returned [`Row`] ends at the next `next` call, so a stale row view
/// cannot outlive its position.
pub struct Rows<'q> {
    core: &'q mut StatementCore,
}

impl Rows<'_> {
    /// Advances to the next row.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> DbResult<Option<Row<'_>>> {
        match self.core.step()? {
            StepResult::Row => Ok(Some(Row::new(self.core))),
            StepResult::Done => Ok(None),
        }
    }
}
