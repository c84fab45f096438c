use std::sync::Arc;

pub mod column;
pub mod named;
pub mod projection;
pub mod row;

use column::Column;
use projection::Projection;
use row::Row;

/// Rows exactly as the service hands them over: the first row holds the
/// column names, the rest is data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResultSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawResultSet {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }
}

/// The data rows of a finished query. The header row is already gone.
#[derive(Debug, Clone)]
pub struct ResultSet {
    columns: Arc<[Column]>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn from_raw(raw: RawResultSet) -> Self {
        let columns: Arc<[Column]> = raw.columns.into();
        let rows = raw
            .rows
            .into_iter()
            .skip(1)
            .enumerate()
            .map(|(idx, values)| Row::new(columns.clone(), values, idx))
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn project<P: Projection>(self, projection: &P) -> Vec<P::Output> {
        self.rows
            .into_iter()
            .map(|row| projection.project(row))
            .collect()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::projection::{FirstColumn, FullRow};

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(String::from)).collect()
    }

    #[test]
    fn header_row_is_dropped() {
        let raw = RawResultSet::new(
            vec![Column::new("referencia", "varchar")],
            vec![
                cells(&[Some("referencia")]),
                cells(&[Some("REF-1")]),
                cells(&[Some("REF-2")]),
            ],
        );

        let set = ResultSet::from_raw(raw);
        assert_eq!(set.len(), 2);
        assert_eq!(set.rows()[0].idx, 0);
        assert_eq!(set.rows()[1].get(0), Some("REF-2"));
        assert_eq!(
            set.project(&FirstColumn),
            vec![Some("REF-1".to_string()), Some("REF-2".to_string())]
        );
    }

    #[test]
    fn header_only_and_empty_sets_have_no_rows() {
        let header_only = RawResultSet::new(vec![], vec![cells(&[Some("x")])]);
        assert!(ResultSet::from_raw(header_only).is_empty());

        assert!(ResultSet::from_raw(RawResultSet::default()).is_empty());
    }

    #[test]
    fn full_row_projection_keeps_nulls() {
        let raw = RawResultSet::new(
            vec![Column::new("a", "varchar"), Column::new("b", "varchar"), Column::new("c", "varchar")],
            vec![cells(&[Some("a"), Some("b"), Some("c")]), cells(&[Some("1"), Some("2"), None])],
        );

        let rows = ResultSet::from_raw(raw).project(&FullRow);
        assert_eq!(rows, vec![vec![Some("1".to_string()), Some("2".to_string()), None]]);
    }
}
