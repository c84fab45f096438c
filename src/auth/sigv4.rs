use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::AwsCredentials;
use crate::{AthenaError, http::url::encode_path, this_errors};

static ALGORITHM: &str = "AWS4-HMAC-SHA256";

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; 32], AthenaError> {
    let mut mac = this_errors!(
        "failed to create hmac from key",
        Hmac::<Sha256>::new_from_slice(key)
    );
    mac.update(message);

    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<[u8; 32], AthenaError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

pub(crate) struct SigningParams<'a> {
    pub credentials: &'a AwsCredentials,
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
}

/// Signs a request with AWS Signature Version 4.
///
/// Adds `host`, `x-amz-date` and, for temporary credentials,
/// `x-amz-security-token` to `headers`, then inserts the `authorization` header.
/// Every header present in `headers` is signed.
// https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html
pub(crate) fn sign(
    params: &SigningParams<'_>,
    method: &str,
    host: &str,
    path: &str,
    headers: &mut HashMap<String, String>,
    payload: &[u8],
) -> Result<(), AthenaError> {
    let amz_date = params.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date = params.time.format("%Y%m%d").to_string();

    headers.insert("host".into(), host.into());
    headers.insert("x-amz-date".into(), amz_date.clone());
    if let Some(token) = params.credentials.session_token.as_deref() {
        headers.insert("x-amz-security-token".into(), token.into());
    }

    let canonical: BTreeMap<String, String> = headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let signed_headers = canonical
        .keys()
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(";");
    let canonical_headers: String = canonical
        .iter()
        .map(|(k, v)| format!("{k}:{v}\n"))
        .collect();
    let payload_hash = hex::encode(Sha256::digest(payload));

    let canonical_request = format!(
        "{method}\n{}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        encode_path(path)
    );

    let scope = format!(
        "{date}/{}/{}/aws4_request",
        params.region, params.service
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let key = signing_key(
        &params.credentials.secret_access_key,
        &date,
        params.region,
        params.service,
    )?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    headers.insert(
        "authorization".into(),
        format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            params.credentials.access_key_id
        ),
    );

    Ok(())
}
