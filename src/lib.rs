#![doc(test(attr(deny(warnings))))]

//! Expense Core offers typed expense and budget primitives, pure aggregation
//! and budget evaluation services, a snapshot-based store backend, and the
//! stateless API proxy service behind the market-data widgets.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod proxy;
pub mod store;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Core tracing initialized.");
    });
}
