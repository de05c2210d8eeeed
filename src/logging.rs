use anyhow::{bail, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Environment, Settings};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// JSON lines in production, human-readable output elsewhere.
    pub fn for_env(env: &Environment) -> Self {
        match env {
            Environment::Prod => Self::Json,
            Environment::Staging => Self::Compact,
            Environment::Dev => Self::Pretty,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => bail!("unknown LOG_FORMAT {other:?}; expected json, pretty or compact"),
        }
    }
}

/// Directives used when `RUST_LOG` is unset. Propagation decisions are logged
/// at debug, so only dev and staging show them by default.
fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "trace_propagation=debug,tower_http=debug,info",
        Environment::Staging => "trace_propagation=debug,info",
        Environment::Prod => "trace_propagation=info,warn",
    }
}

pub fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&settings.env)));

    let source_location = settings.env.is_dev();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(source_location)
        .with_line_number(source_location);

    let registry = tracing_subscriber::registry().with(filter);
    match settings.log_format {
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
        LogFormat::Pretty => registry.with(fmt_layer.pretty()).init(),
        LogFormat::Compact => registry.with(fmt_layer.compact()).init(),
    }

    tracing::info!(
        env = ?settings.env,
        format = ?settings.log_format,
        "Logging initialized"
    );
}
