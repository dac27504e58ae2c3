//! Logging setup.
//!
//! Modules import the macros through [`prelude`] so the logging backend
//! can change in one place.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "rigwatch=info";

/// Install the global subscriber.
///
/// Under systemd (`JOURNAL_STREAM` set) events go to the journal, which
/// adds its own timestamps. Everywhere else they are written to stderr
/// with local-time stamps.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let journald = if std::env::var_os("JOURNAL_STREAM").is_some() {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer),
            Err(e) => {
                eprintln!("journald unavailable, logging to stderr: {e}");
                None
            }
        }
    } else {
        None
    };

    let stderr = journald.is_none().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(fmt::time::LocalTime::rfc_3339())
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(journald)
        .with(stderr)
        .init();
}
