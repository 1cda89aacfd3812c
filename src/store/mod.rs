//! Pin persistence plumbing.
//!
//! This module contains the store side of the engine:
//! - Background refresh with stale-response protection
//! - A deterministic synthetic pin source for demos and tests

mod pin_store;
mod sample;

pub use pin_store::{PinStore, RefreshOutcome};
pub use sample::SamplePinSource;
