pub mod settings;

pub use settings::{LookupConfig, ProbeDefaults, ReportConfig, RunnerConfig};
