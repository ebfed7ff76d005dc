use crate::probes::Probe;
use crate::reporting::Reporter;
use crate::runner::executor::execute;
use crate::runner::report::{Report, ReportFormat};
use crate::{Outcome, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Drives the probe list in order and collects every non-successful outcome.
#[derive(Default)]
pub struct Runner {
    probes: Vec<Arc<dyn Probe>>,
}

impl Runner {
    pub fn new() -> Self {
        Self { probes: Vec::new() }
    }

    pub fn add_probe<P: Probe + 'static>(self, probe: P) -> Self {
        self.add_shared(Arc::new(probe))
    }

    pub fn add_shared(mut self, probe: Arc<dyn Probe>) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub async fn run(&self) -> Report {
        let mut report = Report::new();

        info!("Running {} probes", self.probes.len());

        for probe in &self.probes {
            let start = Instant::now();
            let outcome = execute(Arc::clone(probe)).await;
            let elapsed = start.elapsed();

            match &outcome {
                Outcome::Success => {
                    info!("Probe '{}' passed in {:?}", probe.name(), elapsed);
                }
                Outcome::Failed(reasons) => {
                    warn!(
                        "Probe '{}' failed in {:?}: {}",
                        probe.name(),
                        elapsed,
                        reasons.join("; ")
                    );
                }
                Outcome::TimedOut => {
                    warn!("Probe '{}' timed out after {:?}", probe.name(), probe.timeout());
                }
                Outcome::Crashed(e) => {
                    error!(
                        "Probe '{}' ({}) crashed in {:?}: {}",
                        probe.name(),
                        probe.kind(),
                        elapsed,
                        e
                    );
                }
            }

            report.record(probe.name(), probe.kind(), probe.timeout(), outcome);
        }

        info!(
            "Run completed - {} of {} probes need attention",
            report.len(),
            self.probes.len()
        );
        report
    }

    /// Runs every probe and hands the rendered report to `reporter` unless it is empty.
    pub async fn run_and_report(
        &self,
        reporter: &dyn Reporter,
        format: ReportFormat,
    ) -> Result<Report> {
        let report = self.run().await;

        if report.is_empty() {
            info!("All probes passed, nothing to report");
            return Ok(report);
        }

        let rendered = report.render(format)?;
        reporter.deliver(&rendered).await?;
        Ok(report)
    }
}
