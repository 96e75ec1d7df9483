mod pump;

use anyhow::{Context, ensure};
use cadence_config::PumpConfig;
use pump::Plan;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            PumpConfig::load(&path).with_context(|| format!("failed to load config {path}"))?
        }
        None => PumpConfig::default(),
    };
    init_tracing(&config.log_level);

    let plan = Plan::from_config(&config)?;
    let report = pump::run(&plan)?;

    ensure!(
        report.checksum == pump::expected_checksum(report.items),
        "checksum mismatch: got {}",
        report.checksum
    );
    info!(
        items = report.items,
        elapsed = ?report.elapsed,
        items_per_sec = report.items_per_sec() as u64,
        "stream complete"
    );
    Ok(())
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();
}
