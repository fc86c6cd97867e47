//! Log setup on top of `tracing`.
//!
//! Level filtering comes from `RUST_LOG` (default `info`), so diagnostics can
//! be turned up per module, e.g. `RUST_LOG=steel_landed_cost=debug`.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
