use std::collections::HashMap;

use crate::AthenaError;
use core::future::Future;

/// Status code and body of a finished HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used to reach the query service. Implemented for
/// `reqwest::Client` behind the `reqwest` feature; bring your own otherwise.
pub trait AthenaHttpClient: Clone + Send + Sync + 'static {
    fn new() -> Self;

    fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: HashMap<String, String>,
    ) -> impl Future<Output = Result<HttpResponse, AthenaError>> + Send;
}

#[cfg(feature = "reqwest")]
impl AthenaHttpClient for reqwest::Client {
    fn new() -> Self {
        reqwest::Client::builder()
            .gzip(true)
            .referer(false)
            .build()
            .unwrap_or_default()
    }

    fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: HashMap<String, String>,
    ) -> impl Future<Output = Result<HttpResponse, AthenaError>> {
        use crate::{error, this_errors};

        async move {
            use reqwest::header::HeaderMap;

            let url = this_errors!("failed to parse url", reqwest::Url::parse(url));

            let headers = this_errors!(
                "failed to convert headers",
                headers
                    .iter()
                    .map(|(k, v)| {
                        Ok((
                            reqwest::header::HeaderName::from_bytes(k.as_bytes())
                                .map_err(|e| error!(e))?,
                            reqwest::header::HeaderValue::from_str(v.as_str())
                                .map_err(|e| error!(e))?,
                        ))
                    })
                    .collect::<Result<
                        Vec<(reqwest::header::HeaderName, reqwest::header::HeaderValue)>,
                        AthenaError,
                    >>()
            );

            let resp = this_errors!(
                "failed to send post request",
                self.post(url)
                    .body(body)
                    .headers(HeaderMap::from_iter(headers))
                    .send()
                    .await
            );

            let status = resp.status().as_u16();
            let bytes = this_errors!("failed to get response bytes", resp.bytes().await);

            tracing::trace!(status, len = bytes.len(), "athena response received");

            Ok(HttpResponse {
                status,
                body: bytes.to_vec(),
            })
        }
    }
}
