use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{AthenaError, query::QueryRequest, result::RawResultSet};

pub mod athena;
pub(crate) mod response;

/// The three calls an asynchronous query engine has to offer for
/// [`QueryExecutor`](`crate::QueryExecutor`) to drive it: submit, poll, fetch.
pub trait QueryService {
    /// Starts the query. Returns as soon as the service has accepted it.
    fn submit(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<QueryHandle, AthenaError>> + Send;

    /// Point in time status of a submitted query.
    fn get_status(
        &self,
        handle: &QueryHandle,
    ) -> impl Future<Output = Result<QueryStatus, AthenaError>> + Send;

    /// Every row of a finished query, header row first.
    fn get_results(
        &self,
        handle: &QueryHandle,
    ) -> impl Future<Output = Result<RawResultSet, AthenaError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryHandle(String);

impl QueryHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for QueryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// A state this crate does not know about. Treated as still in flight.
    Unknown(String),
}

impl QueryStatus {
    pub fn from_state(state: &str) -> Self {
        match state {
            "QUEUED" => QueryStatus::Queued,
            "RUNNING" => QueryStatus::Running,
            "SUCCEEDED" => QueryStatus::Succeeded,
            "FAILED" => QueryStatus::Failed,
            "CANCELLED" => QueryStatus::Cancelled,
            other => QueryStatus::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            QueryStatus::Queued => "QUEUED",
            QueryStatus::Running => "RUNNING",
            QueryStatus::Succeeded => "SUCCEEDED",
            QueryStatus::Failed => "FAILED",
            QueryStatus::Cancelled => "CANCELLED",
            QueryStatus::Unknown(state) => state.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueryStatus::Succeeded | QueryStatus::Failed | QueryStatus::Cancelled
        )
    }
}

impl Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
