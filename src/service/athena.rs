use async_stream::try_stream;
use futures_util::{TryStreamExt, stream::BoxStream};
use tracing::{debug, warn};

use crate::{
    AthenaError,
    connection::Connection,
    error,
    http::{self, client::AthenaHttpClient},
    query::QueryRequest,
    result::RawResultSet,
    service::{
        QueryHandle, QueryService, QueryStatus,
        response::{
            GetQueryExecutionInput, GetQueryExecutionOutput, GetQueryResultsInput,
            GetQueryResultsOutput, QueryExecutionContext, ResultConfiguration,
            StartQueryExecutionInput, StartQueryExecutionOutput,
        },
    },
    this_errors,
};

static START_QUERY_EXECUTION: &str = "StartQueryExecution";
static GET_QUERY_EXECUTION: &str = "GetQueryExecution";
static GET_QUERY_RESULTS: &str = "GetQueryResults";

/// [`QueryService`] backed by the Amazon Athena API.
#[derive(Clone)]
pub struct AthenaQueryService<C: AthenaHttpClient> {
    conn: Connection<C>,
}

impl<C: AthenaHttpClient> AthenaQueryService<C> {
    pub(crate) fn new(conn: Connection<C>) -> Self {
        Self { conn }
    }

    /// Streams the result pages of a finished query, following `NextToken`.
    /// Only the first page carries the header row.
    pub fn result_pages(
        &self,
        handle: &QueryHandle,
    ) -> BoxStream<'static, Result<RawResultSet, AthenaError>> {
        let conn = self.conn.clone();
        let query_id = handle.as_str().to_string();

        let stream = try_stream! {
            let page_size = conn.get_opts().page_size;
            let mut next_token: Option<String> = None;
            let mut page_no = 0usize;

            loop {
                let input = GetQueryResultsInput {
                    query_execution_id: &query_id,
                    next_token: next_token.as_deref(),
                    max_results: page_size,
                };

                let request = http::RequestBuilder::default()
                    .connection(conn.clone())
                    .operation(GET_QUERY_RESULTS)
                    .build()
                    .map_err(|e| error!("failed to build get results request", e))?;

                let output = request.post::<_, GetQueryResultsOutput>(&input).await?;
                page_no += 1;
                debug!(query_id = %query_id, page_no, rows = output.result_set.rows.len(), "fetched result page");

                next_token = output.next_token;
                let result_set = output.result_set;
                yield RawResultSet::new(
                    result_set.result_set_metadata.column_info,
                    result_set.rows.into_iter().map(|r| r.into_values()).collect(),
                );

                if next_token.is_none() {
                    break;
                }
            }
        };

        Box::pin(stream)
    }
}

impl<C: AthenaHttpClient> QueryService for AthenaQueryService<C> {
    async fn submit(&self, request: &QueryRequest) -> Result<QueryHandle, AthenaError> {
        let opts = self.conn.get_opts();

        let input = StartQueryExecutionInput {
            query_string: request.sql(),
            query_execution_context: QueryExecutionContext {
                database: request.database(),
            },
            result_configuration: ResultConfiguration {
                output_location: request.output_location(),
            },
            client_request_token: uuid::Uuid::new_v4().to_string(),
            work_group: opts.work_group.as_deref(),
            execution_parameters: request.execution_parameters(),
        };

        let http_request = this_errors!(
            "failed to build start query request",
            http::RequestBuilder::default()
                .connection(self.conn.clone())
                .operation(START_QUERY_EXECUTION)
                .build()
        );

        let output = http_request
            .post::<_, StartQueryExecutionOutput>(&input)
            .await?;

        Ok(QueryHandle::new(output.query_execution_id))
    }

    async fn get_status(&self, handle: &QueryHandle) -> Result<QueryStatus, AthenaError> {
        let input = GetQueryExecutionInput {
            query_execution_id: handle.as_str(),
        };

        let http_request = this_errors!(
            "failed to build query status request",
            http::RequestBuilder::default()
                .connection(self.conn.clone())
                .operation(GET_QUERY_EXECUTION)
                .build()
        );

        let output = http_request
            .post::<_, GetQueryExecutionOutput>(&input)
            .await?;

        let status = output.query_execution.status;
        let state = QueryStatus::from_state(&status.state);

        if matches!(state, QueryStatus::Failed | QueryStatus::Cancelled) {
            warn!(
                query_id = %handle,
                state = %state,
                reason = status.state_change_reason.as_deref().unwrap_or("none given"),
                "athena reported a terminal failure"
            );
        }

        Ok(state)
    }

    async fn get_results(&self, handle: &QueryHandle) -> Result<RawResultSet, AthenaError> {
        let mut pages = self.result_pages(handle);
        let mut collected = RawResultSet::default();

        while let Some(page) = pages.try_next().await? {
            if collected.columns.is_empty() {
                collected.columns = page.columns;
            }
            collected.rows.extend(page.rows);
        }

        Ok(collected)
    }
}
