//! Sharding Inspect - Main entry point

use anyhow::Context;
use sharding_core::InspectConfig;
use sharding_inspect::Inspector;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = InspectConfig::from_env();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    let path = config.rule_config_path.clone();
    let inspector = Inspector::new(config);
    let summary = inspector
        .inspect()
        .with_context(|| format!("Failed to inspect {}", path.display()))?;

    summary.log();
    info!(
        tables = summary.tables.len(),
        master_slave_groups = summary.master_slave_groups.len(),
        "Sharding rule is valid"
    );

    Ok(())
}
