use crate::monitoring::ProcessLookupKind;
use crate::reporting::{CommandReporter, FanoutReporter, StdoutReporter};
use crate::runner::ReportFormat;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Runner settings. The probe list itself is built in code.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    pub probes: ProbeDefaults,
    pub report: ReportConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeDefaults {
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub stdout: bool,
    /// Program and arguments receiving the report on stdin.
    pub mail_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LookupConfig {
    pub process: ProcessLookupKind,
}

impl Default for ProbeDefaults {
    fn default() -> Self {
        Self { timeout_seconds: 5 }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            stdout: true,
            mail_command: None,
        }
    }
}

impl ProbeDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ReportConfig {
    pub fn reporter(&self) -> crate::Result<FanoutReporter> {
        let mut reporter = FanoutReporter::new();

        if self.stdout {
            reporter = reporter.add_sink(StdoutReporter);
        }

        if let Some(argv) = &self.mail_command {
            reporter = reporter.add_sink(CommandReporter::from_argv(argv)?);
        }

        Ok(reporter)
    }
}

impl RunnerConfig {
    /// Defaults, then `probekit.toml` if present, then `PROBEKIT_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&RunnerConfig::default())?);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None if Path::new("probekit.toml").exists() => {
                builder = builder.add_source(File::with_name("probekit"));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("PROBEKIT")
                .prefix_separator("_")
                .separator("__")
                .list_separator(" ")
                .with_list_parse_key("report.mail_command")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let runner_config: RunnerConfig = config.try_deserialize()?;

        runner_config.validate()?;

        Ok(runner_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probes.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Probe timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(argv) = &self.report.mail_command {
            if argv.first().map_or(true, |program| program.is_empty()) {
                return Err(ConfigError::Message(
                    "Mail command cannot be empty".to_string(),
                ));
            }
        }

        if !self.report.stdout && self.report.mail_command.is_none() {
            return Err(ConfigError::Message(
                "At least one report sink must be enabled".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file() -> NamedTempFile {
        tempfile::Builder::new().suffix(".toml").tempfile().unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.probes.timeout_seconds, 5);
        assert_eq!(config.probes.timeout(), Duration::from_secs(5));
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(config.report.stdout);
        assert!(config.report.mail_command.is_none());
        assert_eq!(config.lookup.process, ProcessLookupKind::Pgrep);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RunnerConfig::default();
        config.probes.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config = RunnerConfig::default();
        config.report.mail_command = Some(Vec::new());
        assert!(config.validate().is_err());

        config = RunnerConfig::default();
        config.report.stdout = false;
        assert!(config.validate().is_err());

        config.report.mail_command = Some(vec!["mail".to_string(), "root".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reporter_sinks() {
        let mut config = RunnerConfig::default();
        assert_eq!(config.report.reporter().unwrap().len(), 1);

        config.report.mail_command = Some(vec!["mail".to_string(), "root".to_string()]);
        assert_eq!(config.report.reporter().unwrap().len(), 2);

        config.report.stdout = false;
        assert_eq!(config.report.reporter().unwrap().len(), 1);
    }

    #[test]
    fn test_file_and_environment_layers() {
        let mut file = toml_file();
        writeln!(
            file,
            r#"
[probes]
timeout_seconds = 9

[report]
format = "json"
mail_command = ["mail", "-s", "probe failures", "ops@example.org"]

[lookup]
process = "sysinfo"
"#
        )
        .unwrap();

        let config =
            RunnerConfig::load_from(Some(file.path())).expect("Should load file configuration");
        assert_eq!(config.probes.timeout_seconds, 9);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.lookup.process, ProcessLookupKind::Sysinfo);
        assert_eq!(
            config.report.mail_command.as_deref().map(|argv| argv.len()),
            Some(4)
        );

        std::env::set_var("PROBEKIT_PROBES__TIMEOUT_SECONDS", "11");
        let config = RunnerConfig::load_from(Some(file.path()));
        std::env::remove_var("PROBEKIT_PROBES__TIMEOUT_SECONDS");

        assert_eq!(config.expect("Should load layered configuration").probes.timeout_seconds, 11);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = toml_file();
        writeln!(file, "[report]\nstdout = false").unwrap();

        assert!(RunnerConfig::load_from(Some(file.path())).is_err());
    }
}
