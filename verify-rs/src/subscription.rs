//! Subscription entitlement checks
//!
//! Billing lives in a separate web app; this client asks it whether a
//! caller's subscription is active before any verification work runs.

use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Response shape of the billing app's check endpoint
#[derive(Debug, Deserialize)]
struct SubscriptionStatus {
    #[serde(rename = "hasSubscription", default)]
    has_subscription: bool,
}

/// HTTP client for the billing app's subscription API
#[derive(Clone)]
pub struct SubscriptionClient {
    client: reqwest::Client,
    base_url: String,
}

impl SubscriptionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether `caller_id` holds an active subscription
    ///
    /// Fails closed: transport errors, non-2xx statuses and malformed
    /// bodies all read as not subscribed.
    pub async fn has_active_subscription(&self, caller_id: &str) -> bool {
        let url = format!("{}/api/check-subscription/{}", self.base_url, caller_id);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error checking subscription for {}: {}", caller_id, e);
                return false;
            }
        };

        if !response.status().is_success() {
            warn!(
                "Subscription check for {} failed with status {}",
                caller_id,
                response.status()
            );
            return false;
        }

        match response.json::<SubscriptionStatus>().await {
            Ok(status) => {
                debug!(
                    "Subscription status for {}: active={}",
                    caller_id, status.has_subscription
                );
                status.has_subscription
            }
            Err(e) => {
                warn!("Malformed subscription response for {}: {}", caller_id, e);
                false
            }
        }
    }
}
