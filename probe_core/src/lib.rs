//! Core library of the probe runner: probe kinds, their collaborators, the
//! timeout-bounded executor and the run coordinator that builds one report.

pub mod config;
pub mod error;
pub mod monitoring;
pub mod outcome;
pub mod probes;
pub mod reporting;
pub mod runner;

pub use config::RunnerConfig;
pub use error::{ProbeError, Result};
pub use monitoring::{
    process_lookup, HttpFetcher, HttpResponse, LoadSource, PgrepLookup, ProcessLookup,
    ProcessLookupKind, ReqwestFetcher, SysinfoLoadSource, SysinfoProcessLookup, TlsVerification,
};
pub use outcome::Outcome;
pub use probes::{HttpProbe, LoadProbe, Probe, ProcessProbe, DEFAULT_TIMEOUT};
pub use reporting::{CommandReporter, FanoutReporter, Reporter, StdoutReporter};
pub use runner::{Report, ReportEntry, ReportFormat, Runner};
