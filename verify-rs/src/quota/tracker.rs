//! Quota admission control

use super::store::CounterStore;
use super::types::{QuotaDecision, ReserveOutcome, UsageWindow};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Sliding-window quota tracker
///
/// Availability beats metering accuracy here: when the counter store fails,
/// reservations are admitted, reads report a full quota, and the failure is
/// logged. Identity checks fail closed; metering does not.
pub struct QuotaTracker {
    store: Arc<dyn CounterStore>,
    ceiling: u32,
    window_secs: u64,
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn CounterStore>, ceiling: u32, window_secs: u64) -> Self {
        Self {
            store,
            ceiling,
            window_secs,
        }
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Minutes until a freshly created window lapses
    pub fn window_minutes(&self) -> u64 {
        self.window_secs / 60
    }

    fn key(caller_id: &str) -> String {
        format!("api_usage:{}", caller_id)
    }

    /// Atomically admit and debit `count` verifications for `caller_id`
    pub async fn check_and_reserve(&self, caller_id: &str, count: u32) -> QuotaDecision {
        let key = Self::key(caller_id);

        match self
            .store
            .try_reserve(&key, count, self.ceiling, self.window_secs)
            .await
        {
            Ok(ReserveOutcome::Reserved(window)) => {
                info!(
                    "Updated usage for caller {}: {}/{}",
                    caller_id, window.used, self.ceiling
                );
                QuotaDecision {
                    admitted: true,
                    remaining: self.ceiling.saturating_sub(window.used),
                    reason: None,
                }
            }
            Ok(ReserveOutcome::Exceeded {
                existing: Some(used),
            }) => QuotaDecision {
                admitted: false,
                remaining: self.ceiling.saturating_sub(used),
                reason: Some("Daily email verification limit exceeded".to_string()),
            },
            Ok(ReserveOutcome::Exceeded { existing: None }) => QuotaDecision {
                admitted: false,
                remaining: self.ceiling,
                reason: Some("Requested emails exceed daily limit".to_string()),
            },
            Err(e) => {
                warn!("Error tracking usage for caller {}: {}", caller_id, e);
                QuotaDecision {
                    admitted: true,
                    remaining: self.ceiling,
                    reason: Some(format!("Error tracking usage: {}", e)),
                }
            }
        }
    }

    /// Remaining quota and window reset time for `caller_id`
    pub async fn remaining(&self, caller_id: &str) -> (u32, Option<DateTime<Utc>>) {
        let key = Self::key(caller_id);

        match self.store.peek(&key).await {
            Ok(Some(UsageWindow { used, expires_at })) => {
                (self.ceiling.saturating_sub(used), Some(expires_at))
            }
            Ok(None) => (self.ceiling, None),
            Err(e) => {
                warn!("Error getting remaining quota for caller {}: {}", caller_id, e);
                (self.ceiling, None)
            }
        }
    }
}
