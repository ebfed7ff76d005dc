//! Probe capability and the concrete check kinds

pub mod http;
pub mod load;
pub mod process;

use crate::{Outcome, Result};
use std::time::Duration;

pub use http::HttpProbe;
pub use load::LoadProbe;
pub use process::ProcessProbe;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A single configured check.
///
/// `run` reports conditions the probe anticipates as [`Outcome::Failed`].
/// Returning `Err` means the probe hit something it did not expect; the
/// executor turns that into [`Outcome::Crashed`] tagged with [`Probe::kind`].
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    /// Identifier used in report paragraphs, stable across runs.
    fn name(&self) -> &str;

    fn kind(&self) -> &'static str;

    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    async fn run(&self) -> Result<Outcome>;
}
