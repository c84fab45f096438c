use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    AthenaError,
    errors::{ErrorKind, error},
    query::QueryRequest,
    result::{ResultSet, named::NamedResults, projection::Projection},
    service::{QueryService, QueryStatus},
};

#[cfg(test)]
#[path = "./executor_test.rs"]
mod executor_test;

/// How long to wait for a submitted query: at most `max_attempts` status
/// checks, `poll_interval_ms` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
}

impl PollPolicy {
    /// Small lookup queries (distinct values for a form).
    pub const LOOKUP: PollPolicy = PollPolicy::new(15, 1000);

    /// Full dataset extraction.
    pub const EXTRACT: PollPolicy = PollPolicy::new(5, 1000);

    pub const fn new(max_attempts: u32, poll_interval_ms: u64) -> Self {
        Self {
            max_attempts,
            poll_interval_ms,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Worst case time spent waiting between polls.
    pub fn max_wait(&self) -> Duration {
        self.poll_interval() * self.max_attempts.saturating_sub(1)
    }
}

/// Runs queries end to end against a [`QueryService`]: submit, poll until the
/// query settles, fetch and normalize the rows.
pub struct QueryExecutor<S: QueryService> {
    service: S,
}

impl<S: QueryService> QueryExecutor<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Runs `request` and projects every data row with `projection`.
    pub async fn execute<P: Projection>(
        &self,
        request: &QueryRequest,
        policy: &PollPolicy,
        projection: &P,
    ) -> Result<Vec<P::Output>, AthenaError> {
        let results = self.execute_raw(request, policy).await?;
        Ok(results.project(projection))
    }

    /// Runs `request` and returns its rows without the header row.
    ///
    /// Fails with [`ErrorKind::Submission`] if the service does not accept the
    /// query, [`ErrorKind::Terminal`] as soon as it reports `FAILED` or
    /// `CANCELLED`, and [`ErrorKind::Timeout`] once `policy.max_attempts` status
    /// checks have passed without a terminal state.
    pub async fn execute_raw(
        &self,
        request: &QueryRequest,
        policy: &PollPolicy,
    ) -> Result<ResultSet, AthenaError> {
        let handle = self
            .service
            .submit(request)
            .await
            .map_err(|e| e.with_kind(ErrorKind::Submission))?;

        info!(
            query_id = %handle,
            database = request.database(),
            max_wait = ?policy.max_wait(),
            "query submitted"
        );

        for attempt in 1..=policy.max_attempts {
            let status = self.service.get_status(&handle).await?;

            match status {
                QueryStatus::Succeeded => {
                    let raw = self.service.get_results(&handle).await?;
                    let results = ResultSet::from_raw(raw);
                    info!(query_id = %handle, attempt, rows = results.len(), "query succeeded");
                    return Ok(results);
                }
                QueryStatus::Failed | QueryStatus::Cancelled => {
                    warn!(query_id = %handle, attempt, status = %status, "query did not succeed");
                    return Err(error!(
                        kind = ErrorKind::Terminal(status.clone()),
                        format!("query {status}")
                    ));
                }
                QueryStatus::Unknown(ref state) => {
                    warn!(query_id = %handle, attempt, state = %state, "unrecognized query state, polling again");
                }
                QueryStatus::Queued | QueryStatus::Running => {
                    debug!(query_id = %handle, attempt, status = %status, "query still in flight");
                }
            }

            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.poll_interval()).await;
            }
        }

        warn!(query_id = %handle, attempts = policy.max_attempts, "gave up waiting for query");
        Err(error!(
            kind = ErrorKind::Timeout,
            format!(
                "timed out waiting for query {handle} after {} status checks",
                policy.max_attempts
            )
        ))
    }

    /// Runs each named query in turn with the same policy and projection.
    /// The first failure aborts the batch; nothing is returned for the queries
    /// that already finished.
    pub async fn execute_batch<P, I, N>(
        &self,
        queries: I,
        policy: &PollPolicy,
        projection: &P,
    ) -> Result<NamedResults<P::Output>, AthenaError>
    where
        P: Projection,
        I: IntoIterator<Item = (N, QueryRequest)>,
        N: Into<String>,
    {
        let mut results = NamedResults::new();

        for (name, request) in queries {
            let name = name.into();
            debug!(query = %name, "running batch query");
            let rows = self.execute(&request, policy, projection).await?;
            results.insert(name, rows);
        }

        Ok(results)
    }
}
