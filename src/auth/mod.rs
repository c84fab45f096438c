use std::fmt::Debug;

use crate::{AthenaError, errors::ErrorKind, error};

pub(crate) mod sigv4;

/// Static AWS credentials used to sign every request.
#[derive(Clone)]
pub struct AwsCredentials {
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: String,
    pub(crate) session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }

    /// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
    /// `AWS_SESSION_TOKEN`.
    pub fn from_env() -> Result<Self, AthenaError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AthenaError> {
        let access_key_id = lookup("AWS_ACCESS_KEY_ID")
            .filter(|v| !v.is_empty())
            .ok_or(error!(kind = ErrorKind::Config, "AWS_ACCESS_KEY_ID is not set"))?;
        let secret_access_key = lookup("AWS_SECRET_ACCESS_KEY")
            .filter(|v| !v.is_empty())
            .ok_or(error!(kind = ErrorKind::Config, "AWS_SECRET_ACCESS_KEY is not set"))?;
        let session_token = lookup("AWS_SESSION_TOKEN").filter(|v| !v.is_empty());

        Ok(Self::new(access_key_id, secret_access_key, session_token))
    }
}

impl Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn reads_credentials_from_lookup() {
        let env = HashMap::from([
            ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", ""),
        ]);

        let creds = AwsCredentials::from_lookup(|k| env.get(k).map(|v| v.to_string()))
            .expect("credentials should load");
        assert_eq!(creds.access_key_id, "AKIDEXAMPLE");
        assert_eq!(creds.session_token, None);
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let err = AwsCredentials::from_lookup(|k| {
            (k == "AWS_ACCESS_KEY_ID").then(|| "AKIDEXAMPLE".to_string())
        })
        .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Config);
    }

    #[test]
    fn debug_hides_secrets() {
        let creds = AwsCredentials::new("AKIDEXAMPLE", "very-secret", Some("token".into()));
        let printed = format!("{:?}", creds);
        assert!(printed.contains("AKIDEXAMPLE"));
        assert!(!printed.contains("very-secret"));
        assert!(!printed.contains("\"token\""));
    }
}
