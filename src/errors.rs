use std::error::Error;
use std::fmt::{Debug, Display};

use crate::service::QueryStatus;

/// Category of an [`AthenaError`]: rejected submission, terminal query state,
/// exhausted poll budget, transport, decoding or configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service refused the submission, or the submit call never reached it.
    Submission,
    /// The query reached `FAILED` or `CANCELLED`.
    Terminal(QueryStatus),
    /// The attempt budget ran out while the query was still running.
    Timeout,
    /// Any other failure talking to the service.
    Transport,
    /// A payload or row could not be decoded.
    Decode,
    /// Invalid configuration or request parameters.
    Config,
}

#[derive(Clone)]
pub struct AthenaError {
    kind: ErrorKind,
    trace: String,
    message: String,
    underlying_error: Option<String>,
}

impl AthenaError {
    pub(crate) fn new(trace: String, message: String, underlying: Option<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            trace,
            message,
            underlying_error: underlying,
        }
    }

    /// Builds an error from outside the crate, e.g. in a custom
    /// [`QueryService`](`crate::QueryService`) implementation.
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            trace: String::new(),
            message: message.into(),
            underlying_error: None,
        }
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The human readable part, without trace or type information.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ErrorKind::Terminal(_))
    }
}

impl Error for AthenaError {}

impl Display for AthenaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let error_name = self.underlying_error.as_deref().unwrap_or("AthenaError");
        write!(f, "[{}] ({}): {}", error_name, self.trace, self.message)
    }
}

impl Debug for AthenaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let error_name = self.underlying_error.as_deref().unwrap_or("AthenaError");
        write!(
            f,
            "[{}] {:?} ({}): {}",
            error_name, self.kind, self.trace, self.message
        )
    }
}

macro_rules! this_errors {
    ($msg:literal, $val:expr) => {
        $val.map_err(|e| $crate::error!($msg, e))?
    };
}

macro_rules! error {
    (kind = $kind:expr, $msg:expr) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let fun_name = &name[..name.len() - 3];
        $crate::errors::AthenaError::new(fun_name.into(), ($msg).to_string(), None)
            .with_kind($kind)
    }};
    ($val:literal) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let fun_name = &name[..name.len() - 3];
        $crate::errors::AthenaError::new(fun_name.into(), $val.into(), None)
    }};
    ($err:expr) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let err = $err;
        let name = type_name_of(f);
        let error_type_name = type_name_of(&err);
        let fun_name = &name[..name.len() - 3];
        let error_name = error_type_name.split("::").last().map(|x| x.to_string());
        let error_msg = format!("{:?}", err);

        $crate::errors::AthenaError::new(fun_name.into(), error_msg, error_name)
    }};
    ($val:literal, $err:expr) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let err = $err;
        let name = type_name_of(f);
        let error_type_name = type_name_of(&err);
        let fun_name = &name[..name.len() - 3];
        let error_name = error_type_name.split("::").last().map(|x| x.to_string());
        let final_msg = format!("{} - {:?}", $val, err);
        $crate::errors::AthenaError::new(fun_name.into(), final_msg, error_name)
    }};
}

pub(crate) use error;
pub(crate) use this_errors;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_port(raw: &str) -> Result<u16, AthenaError> {
        let port = this_errors!("failed to parse port", raw.parse::<u16>());
        Ok(port)
    }

    #[test]
    fn kind_defaults_to_transport() {
        let err = error!("connection reset");
        assert_eq!(err.kind(), &ErrorKind::Transport);
        assert_eq!(err.message(), "connection reset");
    }

    #[test]
    fn kind_arm_sets_kind_and_trace() {
        let err = error!(kind = ErrorKind::Timeout, format!("gave up after {} polls", 3));
        assert!(err.is_timeout());
        assert!(!err.is_terminal());
        assert_eq!(err.message(), "gave up after 3 polls");
        assert!(err.to_string().contains("kind_arm_sets_kind_and_trace"));
    }

    #[test]
    fn this_errors_wraps_underlying_type() {
        let err = parse_port("not-a-port").unwrap_err();
        assert!(err.message().starts_with("failed to parse port"));
        assert!(err.to_string().starts_with("[ParseIntError]"));
    }

    #[test]
    fn terminal_kind_carries_status() {
        let err = AthenaError::from_kind(ErrorKind::Terminal(QueryStatus::Cancelled), "query CANCELLED");
        assert!(err.is_terminal());
        assert_eq!(err.kind(), &ErrorKind::Terminal(QueryStatus::Cancelled));
    }
}
