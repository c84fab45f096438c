//! Request handlers for the dashboard API, in the event-in / response-out
//! shape of a serverless function. The HTTP server and any function runtime
//! adapt to these types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AthenaError,
    errors::{ErrorKind, error},
    executor::{PollPolicy, QueryExecutor},
    pedidos::{
        DashboardSummary, Pedido, PedidoField, PedidoFilter,
        queries::{self, DateWindow},
    },
    query::QueryTarget,
    result::{named::NamedResults, projection::{FirstColumn, FullRow}},
    service::QueryService,
};

#[cfg(test)]
#[path = "./functions_test.rs"]
mod functions_test;

static CONTENT_TYPE: &str = "application/json";

/// Incoming request. Only the query string is looked at.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl FunctionEvent {
    pub fn from_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            query_string_parameters: Some(
                params
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// Positive integer parameter; absent, zero or unparsable reads as `None`.
    fn positive(&self, name: &str) -> Option<u64> {
        self.param(name)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    fn json<T: Serialize>(status_code: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self {
                status_code,
                headers: HashMap::from([("Content-Type".to_string(), CONTENT_TYPE.to_string())]),
                body,
            },
            Err(e) => Self::error(&format!("failed to serialise response: {e}")),
        }
    }

    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::json(200, body)
    }

    pub fn error(message: &str) -> Self {
        Self {
            status_code: 500,
            headers: HashMap::from([("Content-Type".to_string(), CONTENT_TYPE.to_string())]),
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }

    fn from_result<T: Serialize>(operation: &str, result: Result<T, AthenaError>) -> Self {
        match result {
            Ok(body) => Self::ok(&body),
            Err(err) => {
                tracing::error!(operation, error = ?err, "request failed");
                Self::error(err.message())
            }
        }
    }
}

/// Where queries run and how long each kind may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub target: QueryTarget,
    pub options_policy: PollPolicy,
    pub dataset_policy: PollPolicy,
    pub default_limit: u32,
    pub default_base_date: String,
    pub default_days_back: i64,
}

impl ApiSettings {
    pub fn new(target: QueryTarget) -> Self {
        Self {
            target,
            options_policy: PollPolicy::LOOKUP,
            dataset_policy: PollPolicy::EXTRACT,
            default_limit: queries::DEFAULT_LIMIT,
            default_base_date: queries::DEFAULT_BASE_DATE.to_string(),
            default_days_back: queries::DEFAULT_DAYS_BACK as i64,
        }
    }
}

/// The dashboard's three endpoints over any [`QueryService`].
pub struct PedidosApi<S: QueryService> {
    executor: QueryExecutor<S>,
    settings: ApiSettings,
}

impl<S: QueryService> PedidosApi<S> {
    pub fn new(service: S, settings: ApiSettings) -> Self {
        Self {
            executor: QueryExecutor::new(service),
            settings,
        }
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Distinct values for each form select: `{"referencia": [...], ...}`.
    /// `limit` caps every list.
    pub async fn form_options(&self, event: &FunctionEvent) -> FunctionResponse {
        FunctionResponse::from_result("form_options", self.load_form_options(event).await)
    }

    /// Every order in the requested date window: `{"data": [[...], ...]}`.
    pub async fn dataset(&self, event: &FunctionEvent) -> FunctionResponse {
        FunctionResponse::from_result("dataset", self.load_dataset(event).await)
    }

    /// Chart aggregates over the requested date window, optionally narrowed
    /// by field filters such as `Maquina=M1`.
    pub async fn summary(&self, event: &FunctionEvent) -> FunctionResponse {
        FunctionResponse::from_result("summary", self.load_summary(event).await)
    }

    async fn load_form_options(
        &self,
        event: &FunctionEvent,
    ) -> Result<NamedResults<Option<String>>, AthenaError> {
        let limit = event
            .positive("limit")
            .unwrap_or(u64::from(self.settings.default_limit));
        info!(limit, "loading form options");

        self.executor
            .execute_batch(
                queries::form_option_queries(&self.settings.target, limit),
                &self.settings.options_policy,
                &FirstColumn,
            )
            .await
    }

    async fn load_dataset(
        &self,
        event: &FunctionEvent,
    ) -> Result<NamedResults<Vec<Option<String>>>, AthenaError> {
        let window = self.date_window(event)?;
        let limit = event.positive("limit");
        info!(window = ?window, limit = ?limit, "loading dataset");

        self.executor
            .execute_batch(
                [(
                    "data",
                    queries::dataset_query(&self.settings.target, &window, limit),
                )],
                &self.settings.dataset_policy,
                &FullRow,
            )
            .await
    }

    async fn load_summary(&self, event: &FunctionEvent) -> Result<DashboardSummary, AthenaError> {
        let window = self.date_window(event)?;
        let limit = event.positive("limit");
        let filter = field_filter(event);

        let rows = self
            .executor
            .execute(
                &queries::dataset_query(&self.settings.target, &window, limit),
                &self.settings.dataset_policy,
                &FullRow,
            )
            .await?;

        let pedidos = Pedido::from_rows(&rows)?;
        info!(window = ?window, pedidos = pedidos.len(), "building summary");

        Ok(DashboardSummary::build(&pedidos, &filter))
    }

    fn date_window(&self, event: &FunctionEvent) -> Result<DateWindow, AthenaError> {
        let base_date = event
            .param("baseDate")
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or(self.settings.default_base_date.as_str());
        let base = queries::parse_base_date(base_date)?;

        let days_back = event
            .param("daysBack")
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|d| *d != 0)
            .unwrap_or(self.settings.default_days_back);

        DateWindow::from_params(base, days_back)
    }
}

/// Query parameters named after a pedido field, e.g. `Estado=Terminado`.
fn field_filter(event: &FunctionEvent) -> PedidoFilter {
    let Some(params) = &event.query_string_parameters else {
        return PedidoFilter::new();
    };

    let mut fields: Vec<(PedidoField, &str)> = params
        .iter()
        .filter_map(|(name, value)| Some((name.parse::<PedidoField>().ok()?, value.as_str())))
        .collect();
    fields.sort_by_key(|(field, _)| field.name());

    fields
        .into_iter()
        .fold(PedidoFilter::new(), |filter, (field, value)| filter.with(field, value))
}

/// Validates settings before a server starts taking requests.
pub fn check_settings(settings: &ApiSettings) -> Result<(), AthenaError> {
    queries::parse_base_date(&settings.default_base_date)?;

    if settings.default_days_back < queries::ALL_BEFORE {
        return Err(error!(
            kind = ErrorKind::Config,
            format!(
                "default days back must be -1 or above, got {}",
                settings.default_days_back
            )
        ));
    }
    if settings.default_limit == 0 {
        return Err(error!(kind = ErrorKind::Config, "default limit must be positive"));
    }
    if settings.target.database.is_empty() || settings.target.output_location.is_empty() {
        return Err(error!(
            kind = ErrorKind::Config,
            "database and output location are required"
        ));
    }

    Ok(())
}
