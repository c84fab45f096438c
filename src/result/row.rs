use std::{fmt::Debug, sync::Arc};

use super::column::Column;

/// A single data row in a [`ResultSet`](`crate::result::ResultSet`)
#[derive(Clone)]
pub struct Row {
    /// The service returns every value as a string, `None` when the cell is absent.
    values: Vec<Option<String>>,
    columns: Arc<[Column]>,
    pub idx: usize,
}

impl Row {
    pub fn new(columns: Arc<[Column]>, values: Vec<Option<String>>, idx: usize) -> Self {
        Self {
            values,
            columns,
            idx,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw cell at `idx`. Out of range and absent cells are both `None`.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        self.get(idx)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Option<String>> {
        self.values
    }
}

impl Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {} {{\n", self.idx)?;
        for (idx, item) in self.values.iter().enumerate() {
            let name = self
                .columns
                .get(idx)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            write!(f, "  {}: {}\n", name, item.as_deref().unwrap_or("None"))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        let cols: Arc<[Column]> = vec![Column::new("pedido", "bigint"), Column::new("estado", "varchar")].into();
        Row::new(cols, vec![Some("17".into()), None], 0)
    }

    #[test]
    fn lookups() {
        let row = row();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get(0), Some("17"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(5), None);
        assert_eq!(row.get_by_name("pedido"), Some("17"));
        assert_eq!(row.get_by_name("missing"), None);
    }

    #[test]
    fn debug_names_columns() {
        let printed = format!("{:?}", row());
        assert!(printed.contains("pedido: 17"));
        assert!(printed.contains("estado: None"));
    }
}
