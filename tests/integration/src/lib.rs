//! Integration tests against a live Pusher REST API.
//!
//! These tests need real application credentials in `PUSHER_APP_ID`,
//! `PUSHER_KEY` and `PUSHER_SECRET` (plus optional `PUSHER_HOST`,
//! `PUSHER_SCHEME` and `PUSHER_PORT`). They are marked `#[ignore]` so they
//! don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p pusher-integration -- --ignored
//! ```

use std::sync::Once;

use pusher_client::Pusher;
use pusher_core::PusherConfig;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Create a client configured from the environment.
///
/// # Panics
///
/// Panics if the Pusher credentials are not set.
#[must_use]
pub fn live_client() -> Pusher {
    init_tracing();

    let config = PusherConfig::from_env()
        .unwrap_or_else(|e| panic!("Pusher credentials must be set in the environment: {e}"));
    Pusher::new(config).unwrap_or_else(|e| panic!("failed to create client: {e}"))
}

/// Generate a unique channel name for a test.
#[must_use]
pub fn test_channel_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

mod test_channels;
mod test_trigger;
