//! API request handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::VerifyError;
use crate::quota::QuotaTracker;
use crate::security::ApiKeyStore;
use crate::subscription::SubscriptionClient;
use crate::verifier::{BatchVerifier, VerificationResult};

/// Shared application state
pub struct AppState {
    pub api_keys: ApiKeyStore,
    pub subscription: SubscriptionClient,
    pub quota: QuotaTracker,
    pub batch: BatchVerifier,
}

/// Authenticated caller, resolved from the API key by the auth middleware
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

/// Verification request body
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub emails: Option<Vec<String>>,
}

/// Verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub results: Vec<VerificationResult>,
    pub execution_time: String,
    pub usage: UsageSummary,
}

/// Quota snapshot attached to each verification response
#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub remaining_quota: u32,
    pub reset_at: Option<String>,
}

/// Usage endpoint response
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub user_id: String,
    pub daily_limit: u32,
    pub remaining_quota: u32,
    pub used_quota: u32,
    pub reset_at: Option<String>,
    pub reset_in_minutes: u64,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

/// POST /email_verification - Verify a batch of email addresses
pub async fn verify_emails(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    body: Option<Json<VerifyRequest>>,
) -> Response {
    let started = Instant::now();
    let emails = body.and_then(|Json(req)| req.emails).unwrap_or_default();

    match run_verification(&state, &caller.0, &emails, started).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn run_verification(
    state: &AppState,
    caller_id: &str,
    emails: &[String],
    started: Instant,
) -> crate::Result<VerifyResponse> {
    if !state.subscription.has_active_subscription(caller_id).await {
        warn!("Subscription check failed for caller {}", caller_id);
        return Err(VerifyError::SubscriptionRequired(caller_id.to_string()));
    }

    if emails.is_empty() {
        return Err(VerifyError::InvalidInput(
            "No email addresses provided".to_string(),
        ));
    }

    // Oversized batches are refused before any quota is debited
    state.batch.check_batch_size(emails.len())?;

    let decision = state
        .quota
        .check_and_reserve(caller_id, emails.len() as u32)
        .await;
    if !decision.admitted {
        warn!(
            "Rate limit exceeded for caller {}: {}",
            caller_id,
            decision.reason.as_deref().unwrap_or("limit exceeded")
        );
        return Err(VerifyError::QuotaExceeded {
            reason: decision
                .reason
                .unwrap_or_else(|| "Daily email verification limit exceeded".to_string()),
            remaining: decision.remaining,
            reset_in_minutes: state.quota.window_minutes(),
        });
    }

    let results = state.batch.verify_batch(emails).await?;

    let elapsed = started.elapsed().as_secs_f64();
    info!("Email verification completed in {:.2} seconds", elapsed);

    let (remaining_quota, reset_at) = state.quota.remaining(caller_id).await;

    Ok(VerifyResponse {
        results,
        execution_time: format!("{:.2} seconds", elapsed),
        usage: UsageSummary {
            remaining_quota,
            reset_at: reset_at.map(format_reset),
        },
    })
}

/// GET /api/usage - Current quota standing for the caller
pub async fn usage(State(state): State<Arc<AppState>>, caller: CallerId) -> Response {
    let (remaining_quota, reset_at) = state.quota.remaining(&caller.0).await;
    let daily_limit = state.quota.ceiling();

    let response = UsageResponse {
        user_id: caller.0,
        daily_limit,
        remaining_quota,
        used_quota: daily_limit.saturating_sub(remaining_quota),
        reset_in_minutes: if reset_at.is_some() {
            state.quota.window_minutes()
        } else {
            0
        },
        reset_at: reset_at.map(format_reset),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /health - Liveness check, no authentication
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// Map a verification error onto the wire
fn error_response(err: &VerifyError) -> Response {
    match err {
        VerifyError::SubscriptionRequired(_) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "error": "Subscription required",
                "message": "Your subscription is not active. Please renew your subscription to continue using this service.",
            })),
        )
            .into_response(),
        VerifyError::InvalidInput(msg) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": msg })),
        )
            .into_response(),
        VerifyError::BatchTooLarge { count, max } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(serde_json::json!({
                "error": "Request entity too large",
                "message": format!(
                    "Maximum of {} emails allowed per request. You sent {} emails.",
                    max, count
                ),
                "max_emails_per_request": max,
            })),
        )
            .into_response(),
        VerifyError::QuotaExceeded {
            reason,
            remaining,
            reset_in_minutes,
        } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "Rate limit exceeded",
                "message": reason,
                "remaining_quota": remaining,
                "reset_in_minutes": reset_in_minutes,
            })),
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "An unexpected error occurred during email verification",
                "details": err.to_string(),
            })),
        )
            .into_response(),
    }
}

fn format_reset(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}
