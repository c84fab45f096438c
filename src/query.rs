use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A single statement to run, and where to run it.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    #[builder(setter(into))]
    pub(crate) sql: String,

    #[builder(setter(into))]
    pub(crate) database: String,

    /// S3 prefix the service writes its output files to, e.g. `s3://bucket/athena/`.
    #[builder(setter(into))]
    pub(crate) output_location: String,

    /// Values for `?` placeholders in `sql`, in order. Each one must already be a
    /// SQL literal (`'text'`, `42`, `DATE '2024-01-01'`).
    #[builder(setter(into), default)]
    pub(crate) execution_parameters: Vec<String>,
}

impl QueryRequest {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn output_location(&self) -> &str {
        &self.output_location
    }

    pub fn execution_parameters(&self) -> &[String] {
        &self.execution_parameters
    }
}

/// Database and output location shared by every query a caller sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTarget {
    pub database: String,
    pub output_location: String,
}

impl QueryTarget {
    pub fn new(database: impl Into<String>, output_location: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            output_location: output_location.into(),
        }
    }

    pub fn request(&self, sql: impl Into<String>) -> QueryRequest {
        QueryRequest {
            sql: sql.into(),
            database: self.database.clone(),
            output_location: self.output_location.clone(),
            execution_parameters: Vec::new(),
        }
    }
}
