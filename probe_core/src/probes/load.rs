use crate::error::ProbeError;
use crate::monitoring::LoadSource;
use crate::probes::{Probe, DEFAULT_TIMEOUT};
use crate::{Outcome, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fails when the one-minute load average exceeds `max_load`.
pub struct LoadProbe {
    name: String,
    max_load: f64,
    timeout: Duration,
    source: Arc<dyn LoadSource>,
}

impl LoadProbe {
    pub fn new(max_load: f64, source: Arc<dyn LoadSource>) -> Result<Self> {
        if !max_load.is_finite() || max_load < 0.0 {
            return Err(ProbeError::InvalidProbe(format!(
                "load threshold must be a non-negative number, got {}",
                max_load
            )));
        }

        Ok(Self {
            name: format!("load average (max {:.2})", max_load),
            max_load,
            timeout: DEFAULT_TIMEOUT,
            source,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Probe for LoadProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "load"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self) -> Result<Outcome> {
        // LoadSource is synchronous and may block on the OS
        let source = Arc::clone(&self.source);
        let load = match tokio::task::spawn_blocking(move || source.one_minute()).await {
            Ok(reading) => reading?,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(ProbeError::Metrics(format!("load reading aborted: {}", e))),
        };
        debug!("One-minute load {:.2}, threshold {:.2}", load, self.max_load);

        if load > self.max_load {
            return Ok(Outcome::failed(format!(
                "Load too high: {:.2} > {:.2}",
                load, self.max_load
            )));
        }

        Ok(Outcome::Success)
    }
}
