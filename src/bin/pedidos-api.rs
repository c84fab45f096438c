//! HTTP front for the pedidos dashboard.
//!
//! Reads `.env`, then the YAML file named by `PEDIDOS_CONFIG` (if any), then
//! environment overrides. AWS credentials come from the usual `AWS_*`
//! variables.

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use pedidos_athena::{
    AthenaQueryService, AwsCredentials,
    config::Config,
    functions::{FunctionEvent, FunctionResponse, PedidosApi, check_settings},
    logging,
};
use tracing::info;

type Api = PedidosApi<AthenaQueryService<reqwest::Client>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = match std::env::var("PEDIDOS_CONFIG") {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::from_env()?,
    };
    logging::init(&config.logging);

    let settings = config.api_settings();
    check_settings(&settings)?;

    let credentials = AwsCredentials::from_env()?;
    let service = config.connection_opts(credentials)?.connect();
    let api: Arc<Api> = Arc::new(PedidosApi::new(service, settings));

    let app = Router::new()
        .route("/options", get(form_options))
        .route("/pedidos", get(dataset))
        .route("/pedidos/summary", get(summary))
        .route("/health", get(health_check))
        .with_state(api);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        %addr,
        region = %config.athena.region,
        database = %config.athena.database,
        "pedidos api listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

async fn form_options(
    State(api): State<Arc<Api>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    into_response(api.form_options(&FunctionEvent::from_params(params)).await)
}

async fn dataset(
    State(api): State<Arc<Api>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    into_response(api.dataset(&FunctionEvent::from_params(params)).await)
}

async fn summary(
    State(api): State<Arc<Api>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    into_response(api.summary(&FunctionEvent::from_params(params)).await)
}

async fn health_check() -> &'static str {
    "OK"
}

fn into_response(function: FunctionResponse) -> Response {
    let status =
        StatusCode::from_u16(function.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, function.body).into_response();

    for (name, value) in function.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            response.headers_mut().insert(name, value);
        }
    }

    response
}
