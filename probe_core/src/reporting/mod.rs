//! Delivery of a finished report

use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{error, info};

/// Called at most once per run, and only with a non-empty report.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn deliver(&self, report: &str) -> Result<()>;
}

/// Prints the report; cron mails whatever lands on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutReporter;

#[async_trait]
impl Reporter for StdoutReporter {
    async fn deliver(&self, report: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(report.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Pipes the report into an external command such as `mail -s <subject> <to>`.
#[derive(Debug, Clone)]
pub struct CommandReporter {
    program: String,
    args: Vec<String>,
}

impl CommandReporter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// First element is the program, the rest its arguments.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        match argv.split_first() {
            Some((program, args)) if !program.is_empty() => {
                Ok(Self::new(program.clone(), args.to_vec()))
            }
            _ => Err(ProbeError::Delivery("mail command is empty".to_string())),
        }
    }
}

#[async_trait]
impl Reporter for CommandReporter {
    async fn deliver(&self, report: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProbeError::Delivery(format!("cannot start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let written = async {
                stdin.write_all(report.as_bytes()).await?;
                stdin.write_all(b"\n").await
            }
            .await;

            // a command that exits without reading is judged by its exit status below
            if let Err(e) = written {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(ProbeError::Delivery(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!("Report handed to {}", self.program);
        Ok(())
    }
}

/// Delivers to every sink even if one fails; the first error is returned.
#[derive(Default)]
pub struct FanoutReporter {
    sinks: Vec<Box<dyn Reporter>>,
}

impl FanoutReporter {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink<R: Reporter + 'static>(mut self, sink: R) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl Reporter for FanoutReporter {
    async fn deliver(&self, report: &str) -> Result<()> {
        let mut first_error = None;

        for sink in &self.sinks {
            if let Err(e) = sink.deliver(report).await {
                error!("Report delivery failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl Reporter for Recording {
        async fn deliver(&self, report: &str) -> Result<()> {
            self.0.lock().unwrap().push(report.to_string());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Reporter for Failing {
        async fn deliver(&self, _report: &str) -> Result<()> {
            Err(ProbeError::Delivery("smtp down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_command_reporter_pipes_report_to_stdin() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("mail.txt");
        let reporter = CommandReporter::new(
            "sh",
            vec![
                "-c".to_string(),
                "cat > \"$0\"".to_string(),
                target.to_string_lossy().to_string(),
            ],
        );

        reporter.deliver("No process called nginx").await.unwrap();

        let written = std::fs::read_to_string(&target).unwrap();
        assert_eq!(written, "No process called nginx\n");
    }

    #[tokio::test]
    async fn test_command_reporter_non_zero_exit_is_error() {
        let reporter = CommandReporter::new("false", Vec::new());
        let err = reporter.deliver("report").await.unwrap_err();
        assert!(matches!(err, ProbeError::Delivery(_)));
    }

    #[tokio::test]
    async fn test_command_reporter_missing_program() {
        let reporter = CommandReporter::new("/nonexistent/mailer", Vec::new());
        assert!(reporter.deliver("report").await.is_err());
    }

    #[test]
    fn test_from_argv() {
        assert!(CommandReporter::from_argv(&[]).is_err());
        assert!(CommandReporter::from_argv(&[String::new()]).is_err());

        let reporter = CommandReporter::from_argv(&[
            "mail".to_string(),
            "-s".to_string(),
            "probes".to_string(),
        ])
        .unwrap();
        assert_eq!(reporter.program, "mail");
        assert_eq!(reporter.args, vec!["-s", "probes"]);
    }

    #[tokio::test]
    async fn test_fanout_attempts_every_sink() {
        let first = Recording::default();
        let last = Recording::default();
        let fanout = FanoutReporter::new()
            .add_sink(first.clone())
            .add_sink(Failing)
            .add_sink(last.clone());

        assert_eq!(fanout.len(), 3);
        let result = fanout.deliver("Load too high: 3.00 > 2.00").await;

        assert!(result.is_err());
        assert_eq!(first.0.lock().unwrap().len(), 1);
        assert_eq!(last.0.lock().unwrap()[0], "Load too high: 3.00 > 2.00");
    }
}
