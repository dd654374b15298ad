//! Tracing subscriber setup.
//!
//! Installed only in debug mode (`DINCHARYA_DEBUG` or `RUST_LOG` set), which
//! is also when the `msg_*` macros route through `tracing`. Without either
//! variable, nothing is installed and user output stays plain.

use super::messages::macros::is_debug_mode;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "dincharya=debug";

pub fn init() {
    if !is_debug_mode() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}
