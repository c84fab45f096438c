//! Scripted [`QueryService`] used by the executor and handler tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use tokio::time::Instant;

use crate::{
    AthenaError,
    errors::ErrorKind,
    query::QueryRequest,
    result::{RawResultSet, column::Column},
    service::{QueryHandle, QueryService, QueryStatus},
};

/// How one submitted query behaves.
#[derive(Clone, Default)]
pub(crate) struct Script {
    pub reject_submit: bool,
    pub fail_results: bool,
    pub statuses: VecDeque<QueryStatus>,
    pub results: RawResultSet,
}

impl Script {
    pub fn succeeding(running_polls: usize, results: RawResultSet) -> Self {
        let mut statuses: VecDeque<QueryStatus> =
            std::iter::repeat_n(QueryStatus::Running, running_polls).collect();
        statuses.push_back(QueryStatus::Succeeded);
        Self {
            statuses,
            results,
            ..Default::default()
        }
    }

    pub fn with_statuses(statuses: impl IntoIterator<Item = QueryStatus>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Succeeds on the first poll, then fails to hand over its rows.
    pub fn failing_results() -> Self {
        Self {
            fail_results: true,
            ..Self::succeeding(0, RawResultSet::default())
        }
    }

    pub fn rejected() -> Self {
        Self {
            reject_submit: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Submit(String),
    Status(String),
    Results(String),
}

#[derive(Default)]
struct State {
    scripts: VecDeque<Script>,
    running: Vec<Script>,
    calls: Vec<(Instant, Call)>,
}

/// Each `submit` takes the next script; status polls then walk that script's
/// statuses, repeating the last one once they run out.
#[derive(Clone, Default)]
pub(crate) struct FakeService {
    state: Arc<Mutex<State>>,
}

impl FakeService {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        let state = State {
            scripts: scripts.into_iter().collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn status_poll_times(&self) -> Vec<Instant> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(_, c)| matches!(c, Call::Status(_)))
            .map(|(at, _)| *at)
            .collect()
    }

    pub fn status_polls(&self) -> usize {
        self.status_poll_times().len()
    }

    pub fn submitted_sql(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Submit(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }
}

fn script_index(handle: &QueryHandle) -> usize {
    handle
        .as_str()
        .trim_start_matches("query-")
        .parse()
        .expect("fake handle")
}

impl QueryService for FakeService {
    async fn submit(&self, request: &QueryRequest) -> Result<QueryHandle, AthenaError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push((Instant::now(), Call::Submit(request.sql().to_string())));

        let script = state.scripts.pop_front().unwrap_or_default();
        if script.reject_submit {
            return Err(AthenaError::from_kind(
                ErrorKind::Transport,
                "InvalidRequestException: line 1:8: mismatched input",
            ));
        }

        state.running.push(script);
        Ok(QueryHandle::new(format!("query-{}", state.running.len() - 1)))
    }

    async fn get_status(&self, handle: &QueryHandle) -> Result<QueryStatus, AthenaError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push((Instant::now(), Call::Status(handle.to_string())));

        let script = &mut state.running[script_index(handle)];
        let status = if script.statuses.len() > 1 {
            script.statuses.pop_front()
        } else {
            script.statuses.front().cloned()
        };

        status.ok_or_else(|| AthenaError::from_kind(ErrorKind::Transport, "no status scripted"))
    }

    async fn get_results(&self, handle: &QueryHandle) -> Result<RawResultSet, AthenaError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push((Instant::now(), Call::Results(handle.to_string())));

        let script = &state.running[script_index(handle)];
        if script.fail_results {
            return Err(AthenaError::from_kind(
                ErrorKind::Transport,
                "GetQueryResults failed with InternalServerException: try again",
            ));
        }

        Ok(script.results.clone())
    }
}

/// A raw result with a header row followed by `rows`.
pub(crate) fn raw_rows(header: &[&str], rows: &[&[Option<&str>]]) -> RawResultSet {
    let columns = header
        .iter()
        .map(|name| Column::new(*name, "varchar"))
        .collect();

    let mut all = vec![header.iter().map(|h| Some(h.to_string())).collect()];
    all.extend(
        rows.iter()
            .map(|row| row.iter().map(|c| c.map(String::from)).collect()),
    );

    RawResultSet::new(columns, all)
}
