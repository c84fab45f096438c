use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
/// Describes a column in a [`ResultSet`](`crate::result::ResultSet`), as reported by
/// the service's result metadata.
pub struct Column {
    pub name: String,

    /// Engine type name, e.g. `varchar`, `bigint`, `date`.
    #[serde(rename = "Type", default)]
    pub col_type: String,

    #[serde(default)]
    pub precision: Option<i64>,
    #[serde(default)]
    pub scale: Option<i64>,

    /// `NOT_NULL`, `NULLABLE` or `UNKNOWN`.
    #[serde(default)]
    pub nullable: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, col_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            col_type: col_type.into(),
            precision: None,
            scale: None,
            nullable: None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.as_deref() != Some("NOT_NULL")
    }
}
