//! Log output for the `vigenere` binary.
//!
//! The CLI prints reports, keys and plaintext on stdout, so every log line
//! goes to stderr. `--verbose` lowers the default level to `DEBUG`, which
//! surfaces the per-pattern-length and per-candidate scoring events from
//! [`crate::kasiski`]; `--json-logs` switches the stderr lines to JSON for
//! the `patterns.extracted` / `kasiski.ranked` / `key.recovered` events
//! emitted through [`crate::obs`]. A `RUST_LOG` directive wins over both.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber. Only the first call in a process takes
/// effect; later calls are no-ops, which lets tests call it freely.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let json_layer = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .ok();
}
