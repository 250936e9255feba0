use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global tracing subscriber. Safe to call multiple times —
/// only the first call has effect (tests may race to initialize).
///
/// Reads `RUST_LOG` for filtering; defaults to `info` for this crate and
/// `warn` elsewhere.
pub fn init_telemetry() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,server=info,sqlx=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
