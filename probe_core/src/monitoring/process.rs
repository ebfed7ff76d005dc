//! Process lookup by name pattern

use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sysinfo::System;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessLookupKind {
    #[default]
    Pgrep,
    Sysinfo,
}

#[async_trait]
pub trait ProcessLookup: Send + Sync {
    /// Identifiers of every running process matching `pattern`, possibly empty.
    async fn find(&self, pattern: &str) -> Result<Vec<u32>>;
}

pub fn process_lookup(kind: ProcessLookupKind) -> Arc<dyn ProcessLookup> {
    match kind {
        ProcessLookupKind::Pgrep => Arc::new(PgrepLookup::default()),
        ProcessLookupKind::Sysinfo => Arc::new(SysinfoProcessLookup),
    }
}

/// Runs `pgrep <pattern>` without a shell, so the pattern is passed verbatim.
#[derive(Debug, Clone)]
pub struct PgrepLookup {
    program: String,
}

impl PgrepLookup {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PgrepLookup {
    fn default() -> Self {
        Self::new("pgrep")
    }
}

#[async_trait]
impl ProcessLookup for PgrepLookup {
    async fn find(&self, pattern: &str) -> Result<Vec<u32>> {
        let output = Command::new(&self.program)
            .arg("--")
            .arg(pattern)
            .output()
            .await
            .map_err(|e| ProbeError::ProcessLookup(format!("cannot run {}: {}", self.program, e)))?;

        // pgrep: 0 = matches, 1 = no match, anything else is a usage or system error
        match output.status.code() {
            Some(0) | Some(1) => {}
            code => {
                return Err(ProbeError::ProcessLookup(format!(
                    "{} exited with {:?}: {}",
                    self.program,
                    code,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
        }

        let pids = parse_pids(&String::from_utf8_lossy(&output.stdout))?;
        debug!("pgrep {:?} matched {} processes", pattern, pids.len());
        Ok(pids)
    }
}

fn parse_pids(stdout: &str) -> Result<Vec<u32>> {
    stdout
        .split_whitespace()
        .map(|pid| {
            pid.parse::<u32>()
                .map_err(|_| ProbeError::ProcessLookup(format!("unexpected pgrep output: {}", pid)))
        })
        .collect()
}

/// Matches the pattern as a regex against process names from the process table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoProcessLookup;

#[async_trait]
impl ProcessLookup for SysinfoProcessLookup {
    async fn find(&self, pattern: &str) -> Result<Vec<u32>> {
        let matcher = Regex::new(pattern)?;

        // Scanning /proc blocks, keep it off the async workers
        let pids = tokio::task::spawn_blocking(move || {
            let mut system = System::new();
            system.refresh_processes();

            let mut pids: Vec<u32> = system
                .processes()
                .iter()
                .filter(|(_, process)| matcher.is_match(process.name()))
                .map(|(pid, _)| pid.as_u32())
                .collect();
            pids.sort_unstable();
            pids
        })
        .await
        .map_err(|e| ProbeError::ProcessLookup(format!("process table scan failed: {}", e)))?;

        debug!(
            "process table has {} entries matching {:?}",
            pids.len(),
            pattern
        );
        Ok(pids)
    }
}
