//! Log subscriber setup

use crate::config::EntdefConfig;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Directive used when neither `ENTDEF_LOG` nor `RUST_LOG` is set
fn fallback_directive(config: &EntdefConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config.log_level.clone()
    }
}

/// Install the compact stderr subscriber.
///
/// `ENTDEF_LOG` wins over `RUST_LOG`; without either, `--verbose` selects
/// debug output and otherwise the configured level applies.
pub fn init(config: &EntdefConfig, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("ENTDEF_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(fallback_directive(config, verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}
