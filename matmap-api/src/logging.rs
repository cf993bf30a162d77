//! Tracing setup
//!
//! The subscriber is installed before configuration is read so that config
//! loading can log. Its filter starts from `RUST_LOG` (or `info`) and is
//! swapped for the configured `[logging] level` once the config is known.
//! An explicit `RUST_LOG` always wins over the config file.

use tracing::Subscriber;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Handle for replacing the filter of the installed subscriber
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter for a configured level or directive
pub fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{},tower_http=info", level))
}

/// Filter used until the config file has been read
pub fn startup_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for("info"))
}

/// Install the global subscriber
pub fn init() -> FilterHandle {
    let (filter, handle) = reload::Layer::new(startup_filter());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    handle
}

/// Apply the configured level unless `RUST_LOG` is set
///
/// Returns whether the filter was replaced.
pub fn apply_config_level<S>(
    handle: &reload::Handle<EnvFilter, S>,
    level: &str,
) -> Result<bool, reload::Error>
where
    S: Subscriber,
{
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(false);
    }

    handle.reload(filter_for(level))?;
    Ok(true)
}
