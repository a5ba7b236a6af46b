//! Configuration types
//!
//! Control thresholds and duty-cycle limits. Nothing here is persisted; the
//! firmware bakes its values in at build time.

pub mod types;

pub use types::*;
