use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// Install the global subscriber. `RUST_LOG` wins over the default level.
/// Logs go to stderr so the shell's own output on stdout stays readable.
pub fn init_logging(verbose: bool) -> Result<(), AppError> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("frontend={}", default_level)))
        .map_err(|e| AppError::Config(format!("Failed to create log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).compact())
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to install logger: {}", e)))?;

    Ok(())
}
