//! Observability for the Larek storefront.
//!
//! Logging goes through `tracing`; this crate only installs the subscriber.

mod logging;

pub use logging::*;
