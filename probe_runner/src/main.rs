//! Entry point: runs the probe list once and reports failures on stdout or by mail

use anyhow::Result;
use probe_core::{
    process_lookup, HttpFetcher, HttpProbe, LoadProbe, LoadSource, ProcessProbe, ReqwestFetcher,
    Runner, RunnerConfig, SysinfoLoadSource,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run());

    // A timed-out check may still hold a blocking thread; don't wait for it
    runtime.shutdown_background();
    result
}

async fn run() -> Result<()> {
    let config = RunnerConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Default probe timeout: {:?}", config.probes.timeout());

    let runner = build_runner(&config)?;
    let reporter = config
        .report
        .reporter()
        .map_err(|e| anyhow::anyhow!("Failed to set up report delivery: {}", e))?;

    let report = runner
        .run_and_report(&reporter, config.report.format)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deliver report: {}", e))?;

    info!("{} of {} probes reported problems", report.len(), runner.len());
    Ok(())
}

/// The checks to run. Edit this list to change what gets probed.
fn build_runner(config: &RunnerConfig) -> Result<Runner> {
    let timeout = config.probes.timeout();
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new()?);
    let lookup = process_lookup(config.lookup.process);
    let load: Arc<dyn LoadSource> = Arc::new(SysinfoLoadSource);

    let runner = Runner::new()
        .add_probe(ProcessProbe::new("bash", lookup)?.with_timeout(timeout))
        .add_probe(
            HttpProbe::new("http://google.fr/", fetcher.clone())
                .expect_status(301)
                .expect_body("<body")?
                .with_timeout(timeout),
        )
        .add_probe(HttpProbe::new("https://twitter.com/", fetcher).with_timeout(timeout))
        .add_probe(LoadProbe::new(8.0, load)?.with_timeout(timeout));

    info!("Configured {} probes", runner.len());
    Ok(runner)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let default_level = if cfg!(debug_assertions) {
                "debug"
            } else {
                "warn"
            };

            format!(
                "{}={},probe_core={}",
                env!("CARGO_CRATE_NAME").replace('-', "_"),
                default_level,
                default_level
            ).into()
        });

    // stdout carries the report
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }
}
