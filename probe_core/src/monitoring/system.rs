//! System load readings

use crate::error::{ProbeError, Result};
use sysinfo::System;
use tracing::debug;

pub trait LoadSource: Send + Sync {
    /// Current one-minute load average.
    fn one_minute(&self) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoLoadSource;

impl LoadSource for SysinfoLoadSource {
    fn one_minute(&self) -> Result<f64> {
        let load_average = System::load_average();
        if !load_average.one.is_finite() {
            return Err(ProbeError::Metrics(format!(
                "load average is not a number: {}",
                load_average.one
            )));
        }

        debug!(
            "Load average: {:.2} {:.2} {:.2}",
            load_average.one, load_average.five, load_average.fifteen
        );
        Ok(load_average.one)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysinfo_load_is_non_negative() {
        let load = SysinfoLoadSource.one_minute().unwrap();
        assert!(load >= 0.0);
    }
}
