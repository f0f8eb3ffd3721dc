//! API Server - HTTP server for the verification REST API

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::api::handlers::{self, ApiError, AppState, CallerId};

const API_KEY_HEADER: &str = "x-api-key";

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(state: Arc<AppState>, addr: String) -> Self {
        Self { state, addr }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        // CORS configuration
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        // Public routes (no auth required)
        let public_routes = Router::new().route("/health", get(handlers::health));

        // Protected routes (API key required)
        let protected_routes = Router::new()
            .route("/email_verification", post(handlers::verify_emails))
            .route("/api/usage", get(handlers::usage))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware,
            ));

        public_routes
            .merge(protected_routes)
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Start the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        info!("Starting API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

/// Authentication middleware - resolves the X-API-Key header to a caller
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|k| !k.is_empty())
        .map(str::to_owned);

    let Some(api_key) = api_key else {
        warn!("Missing X-API-Key header");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("API key is missing")),
        )
            .into_response();
    };

    match state.api_keys.lookup_caller(&api_key).await {
        Ok(Some(user_id)) => {
            // Store caller identity in request extensions for handlers
            req.extensions_mut().insert(CallerId(user_id));
            next.run(req).await
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("Invalid API key")),
        )
            .into_response(),
        Err(e) => {
            warn!("Error validating API key: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiError::new(&format!("Error validating API key: {}", e))),
            )
                .into_response()
        }
    }
}

/// Extract CallerId from request (for handlers)
#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CallerId>().cloned().ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("Not authenticated")),
        ))
    }
}
