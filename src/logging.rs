use crate::types::{RecError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `tracing` subscriber filtered by `level`, e.g.
/// `"recgraph=trace"` or `"warn"`.
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level).map_err(|_| RecError::Invalid("invalid log filter"))?,
        )
        .with_target(true)
        .try_init()
        .map_err(|_| RecError::Invalid("logging already initialized"))
}
