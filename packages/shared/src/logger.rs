//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise the given binary, the server library
/// and `tower_http` log at `default_level`.
///
/// # Arguments
///
/// * `bin_name` - Name of the running binary (usually `env!("CARGO_BIN_NAME")`)
/// * `default_level` - Level used when `RUST_LOG` is not set (e.g. `"info"`)
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let crate_name = bin_name.replace('-', "_");
        format!(
            "{crate_name}={level},chatrelay_server={level},tower_http={level}",
            level = default_level
        )
        .into()
    });

    // try_init so that tests and embedded servers can call this more than once
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
