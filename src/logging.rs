// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Logging setup.
//!
//! The library only emits `tracing` events. Binaries and tests that want to
//! see them call [`init`], which installs a stderr subscriber filtered by
//! `RUST_LOG` (default `warn`). Calling it more than once is harmless.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
