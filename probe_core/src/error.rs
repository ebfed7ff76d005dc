//! Error types shared by probes, collaborators and sinks

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeError>;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("{kind}: {message}")]
    Transport { kind: &'static str, message: String },

    #[error("Process lookup failed: {0}")]
    ProcessLookup(String),

    #[error("Metrics unavailable: {0}")]
    Metrics(String),

    #[error("Invalid probe: {0}")]
    InvalidProbe(String),

    #[error("Report delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_builder() {
            "InvalidUrl"
        } else if err.is_timeout() {
            "Timeout"
        } else if err.is_connect() {
            "ConnectError"
        } else if err.is_body() || err.is_decode() {
            "BodyError"
        } else if err.is_redirect() {
            "RedirectError"
        } else {
            "RequestError"
        };

        ProbeError::Transport {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for ProbeError {
    fn from(err: regex::Error) -> Self {
        ProbeError::InvalidProbe(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_includes_kind() {
        let err = ProbeError::Transport {
            kind: "ConnectError",
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "ConnectError: connection refused");
    }

    #[test]
    fn test_regex_error_becomes_invalid_probe() {
        let err: ProbeError = regex::Regex::new("(unclosed").unwrap_err().into();
        assert!(matches!(err, ProbeError::InvalidProbe(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "pgrep missing");
        let err: ProbeError = io.into();
        assert!(err.to_string().contains("pgrep missing"));
    }
}
