//! Counter storage behind the quota tracker

use super::types::{ReserveOutcome, UsageWindow};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Caller-scoped usage counters
///
/// `try_reserve` is the whole contract: the read, the ceiling check and the
/// increment happen as one indivisible step, so concurrent reservations for
/// the same key can never jointly overshoot the ceiling.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically reserve `count` units against `ceiling` for `key`
    ///
    /// A new window gets a fresh expiry `window_secs` from now; an increment
    /// to an existing window keeps its original expiry.
    async fn try_reserve(
        &self,
        key: &str,
        count: u32,
        ceiling: u32,
        window_secs: u64,
    ) -> Result<ReserveOutcome>;

    /// Current window for `key`, if one is still active
    async fn peek(&self, key: &str) -> Result<Option<UsageWindow>>;
}

/// In-process counter store
pub struct MemoryCounterStore {
    windows: RwLock<HashMap<String, UsageWindow>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn try_reserve(
        &self,
        key: &str,
        count: u32,
        ceiling: u32,
        window_secs: u64,
    ) -> Result<ReserveOutcome> {
        let now = Utc::now();
        let mut windows = self.windows.write().await;

        // Lazy expiry: a lapsed window is the same as no window
        if windows.get(key).map_or(false, |w| w.expires_at <= now) {
            windows.remove(key);
        }

        match windows.get_mut(key) {
            Some(window) => {
                let remaining = ceiling.saturating_sub(window.used);
                if count > remaining {
                    return Ok(ReserveOutcome::Exceeded {
                        existing: Some(window.used),
                    });
                }
                window.used += count;
                Ok(ReserveOutcome::Reserved(window.clone()))
            }
            None => {
                if count > ceiling {
                    return Ok(ReserveOutcome::Exceeded { existing: None });
                }
                let window = UsageWindow {
                    used: count,
                    expires_at: now + chrono::Duration::seconds(window_secs as i64),
                };
                windows.insert(key.to_string(), window.clone());
                Ok(ReserveOutcome::Reserved(window))
            }
        }
    }

    async fn peek(&self, key: &str) -> Result<Option<UsageWindow>> {
        let now = Utc::now();
        let windows = self.windows.read().await;
        Ok(windows
            .get(key)
            .filter(|window| window.expires_at > now)
            .cloned())
    }
}
