use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Per-statement sqlx logging is noisy at INFO; it is capped at WARN.
const QUIET_SQLX: &str = "sqlx::query=warn";

/// `level` is already resolved from LOG_LEVEL, then RUST_LOG, by settings,
/// so the environment is not read again here.
pub(crate) fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(level))
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("{level},{QUIET_SQLX}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_SQLX}")))
}
