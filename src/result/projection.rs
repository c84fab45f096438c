use serde::Serialize;

use super::row::Row;

/// Turns a data row into whatever shape the caller wants back.
pub trait Projection {
    type Output: Serialize + Send;

    fn project(&self, row: Row) -> Self::Output;
}

/// Yields the first cell of each row as-is. Suits `SELECT <one column>` lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstColumn;

impl Projection for FirstColumn {
    type Output = Option<String>;

    fn project(&self, row: Row) -> Self::Output {
        row.into_values().into_iter().next().flatten()
    }
}

/// Yields every cell of each row, in column order. Absent cells and empty
/// strings both come back as `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullRow;

impl Projection for FullRow {
    type Output = Vec<Option<String>>;

    fn project(&self, row: Row) -> Self::Output {
        row.into_values()
            .into_iter()
            .map(|cell| cell.filter(|v| !v.is_empty()))
            .collect()
    }
}
