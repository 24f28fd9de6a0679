//! Transient views over the current result row and typed extraction.

use crate::error::{DbError, DbResult};
use crate::ffi;
use crate::statement::StatementCore;
use crate::value::{Value, ValueType};

/// A view over the row the owning query is currently positioned on.
///
/// Obtained from [`Rows::next`](crate::Rows::next). Borrow rules make it
/// impossible to hold a `Row` across the next step or reset, which is
/// exactly the validity window the engine gives column data.
pub struct Row<'s> {
    core: &'s StatementCore,
}

impl<'s> Row<'s> {
    pub(crate) fn new(core: &'s StatementCore) -> Self {
        Self { core }
    }

    /// Number of columns in this row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.core.data_count()
    }

    /// Storage class the engine reports for column `idx`.
    pub fn column_type(&self, idx: usize) -> DbResult<ValueType> {
        self.check_index(idx)?;
        Ok(ValueType::from_code(self.core.column_type_code(idx)))
    }

    /// Size in bytes of column `idx` read as text or blob.
    pub fn column_bytes(&self, idx: usize) -> DbResult<usize> {
        self.check_index(idx)?;
        Ok(self.core.column_bytes(idx))
    }

    /// Extracts column `idx` (0-based) as `T`, applying the engine's
    /// storage-class coercion.
    ///
    /// Coercion itself cannot fail; only an out-of-range index does.
    /// Requesting a non-`Option` text or blob from a NULL column yields the
    /// empty value.
    pub fn get<T: FromColumn>(&self, idx: usize) -> DbResult<T> {
        self.check_index(idx)?;
        Ok(T::from_column(self, idx))
    }

    /// The column's value in its reported storage class, without coercion.
    pub fn value(&self, idx: usize) -> DbResult<Value> {
        self.get(idx)
    }

    /// Fluent extraction stream starting at 0-based `start_index`; each
    /// [`read`](ColumnReader::read) advances by one column.
    #[must_use]
    pub fn getter(&self, start_index: usize) -> ColumnReader<'_, 's> {
        ColumnReader {
            row: self,
            idx: start_index,
        }
    }

    /// Extracts several typed columns from this row in one call:
    /// `let (id, name): (i64, String) = row.get_columns(&[0, 1])?;`
    pub fn get_columns<T: FromColumns>(&self, indices: &[usize]) -> DbResult<T> {
        T::from_columns(self, indices)
    }

    fn check_index(&self, idx: usize) -> DbResult<()> {
        let count = self.core.data_count();
        if idx >= count {
            return Err(DbError::step(
                ffi::SQLITE_RANGE,
                format!("column index {idx} out of range (row has {count} columns)"),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("columns", &self.column_count())
            .finish()
    }
}

/// Typed extraction from a result column.
///
/// Implemented for the closed set of semantic types the engine supports
/// (integers, float, text, blob, `Option` of each, and [`Value`] itself);
/// conversions follow the engine's documented storage-class coercion and
/// cannot fail.
pub trait FromColumn: Sized {
    /// Reads column `idx` of `row`. The index has already been range
    /// checked by the caller.
    fn from_column(row: &Row<'_>, idx: usize) -> Self;
}

impl FromColumn for i32 {
    fn from_column(row: &Row<'_>, idx: usize) -> Self {
        row.core.column_i32(idx)
    }
}

impl FromColumn for i64 {
    fn from_column(row: &Row<'_>, idx: usize) -> Self {
        row.core.column_i64(idx)
    }
}

impl FromColumn for f64 {
    fn from_column(row: &Row<'_>, idx: usize) -> Self {
        row.core.column_f64(idx)
    }
}

impl FromColumn for String {
    fn from_column(row: &Row<'_>, idx: usize) -> Self {
        row.core.column_text(idx)
    }
}

impl FromColumn for Vec<u8> {
    fn from_column(row: &Row<'_>, idx: usize) -> Self {
        row.core.column_blob(idx)
    }
}

impl FromColumn for Value {
    fn from_column(row: &Row<'_>, idx: usize) -> Self {
        match ValueType::from_code(row.core.column_type_code(idx)) {
            ValueType::Integer => Self::Integer(row.core.column_i64(idx)),
            ValueType::Real => Self::Real(row.core.column_f64(idx)),
            ValueType::Text => Self::Text(row.core.column_text(idx)),
            ValueType::Blob => Self::Blob(row.core.column_blob(idx)),
            ValueType::Null => Self::Null,
        }
    }
}

impl<T: FromColumn> FromColumn for Option<T> {
    fn from_column(row: &Row<'_>, idx: usize) -> Self {
        if row.core.column_type_code(idx) == ffi::SQLITE_NULL {
            None
        } else {
            Some(T::from_column(row, idx))
        }
    }
}

/// Extracts consecutive columns without respecifying indices.
#[derive(Debug)]
pub struct ColumnReader<'r, 's> {
    row: &'r Row<'s>,
    idx: usize,
}

impl ColumnReader<'_, '_> {
    /// Reads the column at the current index as `T` and advances.
    pub fn read<T: FromColumn>(&mut self) -> DbResult<T> {
        let value = self.row.get(self.idx)?;
        self.idx += 1;
        Ok(value)
    }
}

/// Tuple extraction used by [`Row::get_columns`].
pub trait FromColumns: Sized {
    /// Reads one column per tuple element, at the given indices.
    fn from_columns(row: &Row<'_>, indices: &[usize]) -> DbResult<Self>;
}

macro_rules! impl_from_columns {
    ($count:expr => $($t:ident $n:tt),+) => {
        impl<$($t: FromColumn),+> FromColumns for ($($t,)+) {
            fn from_columns(row: &Row<'_>, indices: &[usize]) -> DbResult<Self> {
                if indices.len() != $count {
                    return Err(DbError::step(
                        ffi::SQLITE_RANGE,
                        format!(
                            "expected {} column indices, got {}",
                            $count,
                            indices.len()
                        ),
                    ));
                }
                Ok(($(row.get::<$t>(indices[$n])?,)+))
            }
        }
    };
}

impl_from_columns!(1 => T0 0);
impl_from_columns!(2 => T0 0, T1 1);
impl_from_columns!(3 => T0 0, T1 1, T2 2);
impl_from_columns!(4 => T0 0, T1 1, T2 2, T3 3);
impl_from_columns!(5 => T0 0, T1 1, T2 2, T3 3, T4 4);
impl_from_columns!(6 => T0 0, T1 1, T2 2, T3 3, T4 4, T5 5);
impl_from_columns!(7 => T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6);
impl_from_columns!(8 => T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7);
