//! Daily verification quotas
//!
//! This module provides admission control for batch verification:
//! - Per-caller daily ceilings
//! - Sliding 24h windows anchored at first use
//! - Atomic reserve-before-work accounting

pub mod store;
pub mod tracker;
pub mod types;

pub use store::{CounterStore, MemoryCounterStore};
pub use tracker::QuotaTracker;
pub use types::{QuotaDecision, ReserveOutcome, UsageWindow};
