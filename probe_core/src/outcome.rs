//! Classified result of a single probe run

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    /// Never empty; build through [`Outcome::from_reasons`] or [`Outcome::failed`].
    Failed(Vec<String>),
    Crashed(String),
    TimedOut,
}

impl Outcome {
    /// A failure with a single reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Outcome::Failed(vec![reason.into()])
    }

    /// `Success` when no reasons were collected, `Failed` otherwise.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            Outcome::Success
        } else {
            Outcome::Failed(reasons)
        }
    }

    pub fn crashed(description: impl Into<String>) -> Self {
        Outcome::Crashed(description.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Outcome::Failed(reasons) => reasons,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failed(_) => write!(f, "failed"),
            Outcome::Crashed(_) => write!(f, "crashed"),
            Outcome::TimedOut => write!(f, "timed out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Success.to_string(), "success");
        assert_eq!(Outcome::failed("boom").to_string(), "failed");
        assert_eq!(Outcome::crashed("boom").to_string(), "crashed");
        assert_eq!(Outcome::TimedOut.to_string(), "timed out");
    }

    #[test]
    fn test_from_reasons_never_builds_empty_failure() {
        assert_eq!(Outcome::from_reasons(Vec::new()), Outcome::Success);

        let outcome = Outcome::from_reasons(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(outcome.reasons(), &["a".to_string(), "b".to_string()]);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(Outcome::failed("No process called nginx")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["detail"][0], "No process called nginx");

        let json = serde_json::to_value(Outcome::TimedOut).unwrap();
        assert_eq!(json["status"], "timed_out");
    }
}
