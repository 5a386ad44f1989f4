mod cli;
mod config;
mod error;
mod host;
mod icmp;
mod output;
mod pinger;
mod probe;
mod stats;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config::Config;
use pinger::Pinger;
use probe::{Probe, ProbeRunner};
use stats::RunStats;
use std::io::Write;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = run(Pinger::default(), &cli.args, &mut std::io::stdout()).await {
        eprintln!("{} {}", "Error:".red(), e);
        process::exit(1);
    }
}

async fn run<P: Probe>(probe: P, args: &[String], console: &mut impl Write) -> Result<()> {
    let config = Config::from_args(args)?;
    log::debug!("{:?}", config);
    log::info!("formats: {}", config.formats);

    if config.formats.is_empty() {
        log::warn!("no known output format selected, nothing will be reported");
    }

    let runner = ProbeRunner::new(probe)
        .with_initial_delay(Duration::from_millis(config.delay_ms))
        .with_parallelism(config.parallel);

    let result = runner
        .run(
            &config.endpoints,
            Duration::from_millis(config.timeout_ms),
            config.attempts,
        )
        .await?;

    for endpoint in result.iter() {
        for attempt in &endpoint.attempts {
            log::trace!(
                "{}: {} rtt={} {}",
                endpoint.endpoint,
                attempt.resolved_address,
                attempt.round_trip_millis(),
                attempt.failure_reason().unwrap_or("")
            );
        }
    }

    let stats = RunStats::from_result(&result);
    log::info!(
        "probed {} endpoint(s), {} with failures",
        stats.endpoints.len(),
        stats.endpoints.iter().filter(|s| s.has_failures()).count()
    );

    output::write_reports(&stats, config.formats, &config.output_name, console)?;

    Ok(())
}
