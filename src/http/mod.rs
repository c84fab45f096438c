use std::collections::HashMap;

use chrono::Utc;
use derive_builder::Builder;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    AthenaError,
    auth::sigv4::{self, SigningParams},
    connection::Connection,
    error,
    errors::ErrorKind,
    http::client::AthenaHttpClient,
    this_errors,
};

pub mod client;
pub(crate) mod url;

static SERVICE_NAME: &str = "athena";
static TARGET_PREFIX: &str = "AmazonAthena";
static CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Error envelope of the AWS JSON protocol.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(rename = "__type")]
    pub(crate) error_type: String,

    #[serde(alias = "Message", default)]
    pub(crate) message: Option<String>,
}

impl ErrorResponse {
    /// `com.amazonaws.athena#InvalidRequestException:http://...` -> `InvalidRequestException`
    pub(crate) fn short_type(&self) -> &str {
        let without_suffix = self.error_type.split(':').next().unwrap_or_default();
        without_suffix.rsplit('#').next().unwrap_or(without_suffix)
    }
}

/// One signed call to an Athena operation, e.g. `StartQueryExecution`.
#[derive(Builder)]
pub(crate) struct Request<C: AthenaHttpClient> {
    connection: Connection<C>,

    #[builder(setter(into))]
    operation: String,

    #[builder(setter(into), default = HashMap::new())]
    headers: HashMap<String, String>,
}

impl<C: AthenaHttpClient> Request<C> {
    pub async fn post<B: Serialize, T: DeserializeOwned>(self, body: &B) -> Result<T, AthenaError> {
        let opts = self.connection.get_opts();
        let url = url::construct_endpoint(&opts.region, opts.endpoint.as_deref());
        let (host, path) = url::split_host_and_path(&url)
            .ok_or(error!("endpoint is not an absolute url"))?;

        let body_bytes = this_errors!(
            "failed to serialise body as json",
            serde_json::to_vec(body)
        );

        let mut headers = self.headers;
        headers.insert("content-type".into(), CONTENT_TYPE.into());
        headers.insert(
            "x-amz-target".into(),
            format!("{TARGET_PREFIX}.{}", self.operation),
        );

        sigv4::sign(
            &SigningParams {
                credentials: &opts.credentials,
                region: &opts.region,
                service: SERVICE_NAME,
                time: Utc::now(),
            },
            "POST",
            host,
            path,
            &mut headers,
            &body_bytes,
        )?;

        tracing::trace!(operation = %self.operation, "sending athena request");

        let resp = self
            .connection
            .get_client()
            .post(url.as_str(), body_bytes, headers)
            .await?;

        if !resp.is_success() {
            let message = match serde_json::from_slice::<ErrorResponse>(&resp.body) {
                Ok(err) => format!(
                    "{} failed with {}: {}",
                    self.operation,
                    err.short_type(),
                    err.message.as_deref().unwrap_or("no message")
                ),
                Err(_) => format!(
                    "{} failed with http status {}",
                    self.operation, resp.status
                ),
            };

            return Err(error!(kind = ErrorKind::Transport, message));
        }

        let resp_as_json = serde_json::from_slice::<T>(&resp.body).map_err(|e| {
            error!("failed to parse response as json", e).with_kind(ErrorKind::Decode)
        })?;

        Ok(resp_as_json)
    }
}
