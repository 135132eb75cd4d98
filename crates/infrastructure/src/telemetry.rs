//! Tracing setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::settings::Settings;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` always wins; otherwise the development-logging toggle picks
/// between debug-level riptide events and an info-level baseline. Safe to
/// call more than once.
pub fn init_tracing(settings: &Settings) {
    let fallback = if settings.dev_logging {
        "riptide=debug,info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
