use std::sync::Arc;

use clap::Parser;
use radio_watchdog::{
    clock::SystemClock,
    config::{Config, read_config_file},
    monitors::MonitorCycle,
};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Run one health check of the configured streams and exit.
#[derive(Debug, Clone, Parser)]
struct Args {
    /// JSON config file (defaults to the environment / .env)
    #[arg(short)]
    file: Option<String>,
}

// the binary shares its crate name, and so its target, with the library
fn log_filter() -> filter::Targets {
    filter::Targets::new().with_targets(vec![("radio_watchdog", LevelFilter::INFO)])
}

fn init() {
    dotenv::dotenv().ok();

    let filter = log_filter();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    info!("started with args: {args:?}");

    let config = match &args.file {
        Some(file) => read_config_file(file)?,
        None => Config::from_env()?,
    };

    let cycle = MonitorCycle::from_config(&config, Arc::new(SystemClock));
    let report = cycle.run().await;

    let failing = report.statuses.iter().filter(|(_, status)| !status.is_ok()).count();
    if failing > 0 {
        error!("{failing} channel(s) unhealthy");
    }
    info!(
        "cycle finished: {} channel(s) checked in {:?}",
        report.statuses.len(),
        report.mode
    );

    Ok(())
}
