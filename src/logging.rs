use crate::config::{LogFormat, LoggingConfig};
use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Output always goes to stderr: stdout
/// carries the IPC responses. `RUST_LOG`, when set, wins over the
/// configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid log level '{}'", config.level))?,
    };

    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .try_init()?,
    }

    Ok(())
}
