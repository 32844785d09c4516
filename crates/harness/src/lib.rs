pub mod builders;
pub mod fixtures;
pub mod store;

pub use store::{FileStore, MemoryStore};

use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber honouring `RUST_LOG`. Safe to call from
/// every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
