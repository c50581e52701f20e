//! Tracing setup for tests

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Installs a test-friendly tracing subscriber once per process
///
/// The filter comes from `RUST_LOG`, defaulting to `warn` overall and
/// `debug` for the party crates. Output goes through the test writer so it
/// is captured unless `--nocapture` is passed.
pub fn init_test_tracing() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,domain_party=debug,infra_db=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
