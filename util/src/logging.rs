// Copyright (C) Microsoft Corporation. All rights reserved.

//! Install a `tracing` subscriber for a binary's `main()`. The teacher's
//! own `util::logging::Logging` is a bare `println!` wrapper; the rest
//! of the teacher workspace (the `eg` crate) already logs through
//! `tracing`, so the binaries here install a real subscriber instead of
//! reimplementing the teacher's ad hoc logger.

use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber. `RUST_LOG`, if set,
/// always wins; otherwise falls back to `default_filter` (the
/// binary's `--log-filter` argument). Safe to call once per process; a
/// second call is a harmless no-op (its error is ignored).
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
