use crate::error::ProbeError;
use crate::monitoring::ProcessLookup;
use crate::probes::{Probe, DEFAULT_TIMEOUT};
use crate::{Outcome, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Passes when at least one running process matches the pattern.
pub struct ProcessProbe {
    pattern: String,
    timeout: Duration,
    lookup: Arc<dyn ProcessLookup>,
}

impl ProcessProbe {
    pub fn new(pattern: impl Into<String>, lookup: Arc<dyn ProcessLookup>) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(ProbeError::InvalidProbe(
                "process pattern cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            pattern,
            timeout: DEFAULT_TIMEOUT,
            lookup,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Probe for ProcessProbe {
    fn name(&self) -> &str {
        &self.pattern
    }

    fn kind(&self) -> &'static str {
        "process"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self) -> Result<Outcome> {
        let pids = self.lookup.find(&self.pattern).await?;
        if pids.is_empty() {
            return Ok(Outcome::failed(format!("No process called {}", self.pattern)));
        }

        debug!("Process {} running as {:?}", self.pattern, pids);
        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedLookup(Vec<u32>);

    #[async_trait]
    impl ProcessLookup for FixedLookup {
        async fn find(&self, _pattern: &str) -> Result<Vec<u32>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenLookup;

    #[async_trait]
    impl ProcessLookup for BrokenLookup {
        async fn find(&self, _pattern: &str) -> Result<Vec<u32>> {
            Err(ProbeError::ProcessLookup("pgrep exited with Some(2)".to_string()))
        }
    }

    #[tokio::test]
    async fn test_no_matching_process_fails_with_name() {
        let probe = ProcessProbe::new("nginx", Arc::new(FixedLookup(Vec::new()))).unwrap();
        assert_eq!(
            probe.run().await.unwrap(),
            Outcome::failed("No process called nginx")
        );
    }

    #[tokio::test]
    async fn test_matching_process_succeeds() {
        let probe = ProcessProbe::new("nginx", Arc::new(FixedLookup(vec![1234]))).unwrap();
        assert_eq!(probe.run().await.unwrap(), Outcome::Success);
        assert_eq!(probe.name(), "nginx");
        assert_eq!(probe.kind(), "process");
    }

    #[tokio::test]
    async fn test_lookup_error_propagates() {
        let probe = ProcessProbe::new("nginx", Arc::new(BrokenLookup)).unwrap();
        assert!(probe.run().await.is_err());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(ProcessProbe::new("  ", Arc::new(FixedLookup(Vec::new()))).is_err());
    }
}
