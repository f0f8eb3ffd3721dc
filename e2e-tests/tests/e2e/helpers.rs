//! In-process test environment
//!
//! Boots the whole verification service on an ephemeral port with its
//! external dependencies faked on loopback: a scripted SMTP host standing in
//! for every mail exchanger, a stub DNS table, and a stub billing app. Tests
//! talk plain HTTP to the real router, so everything from auth middleware to
//! SMTP probing runs exactly as in production.

use async_trait::async_trait;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use verify_rs::api::handlers::AppState;
use verify_rs::api::ApiServer;
use verify_rs::error::{Result, VerifyError};
use verify_rs::quota::{MemoryCounterStore, QuotaTracker};
use verify_rs::resolver::{MxLookup, MxResolver};
use verify_rs::security::ApiKeyStore;
use verify_rs::smtp::SmtpProber;
use verify_rs::subscription::SubscriptionClient;
use verify_rs::verifier::{BatchVerifier, EmailVerifier};

/// Points every domain at the loopback mail host; `*.nxdomain` fails
struct LoopbackMx;

#[async_trait]
impl MxLookup for LoopbackMx {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<(u16, String)>> {
        if domain.ends_with(".nxdomain") {
            return Err(VerifyError::DnsLookup(format!("{}: no records", domain)));
        }
        Ok(vec![(10, "127.0.0.1".to_string())])
    }
}

/// RCPT policy of the e2e mail host: `open.test` accepts any recipient,
/// every other domain only knows `known@`
pub fn default_policy(recipient: &str) -> bool {
    recipient.ends_with("@open.test") || recipient.starts_with("known@")
}

/// Scripted SMTP host answering every probe according to `accept`
pub async fn mail_host(accept: fn(&str) -> bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut reader = BufReader::new(reader);
                if writer.write_all(b"220 mx.test ESMTP\r\n").await.is_err() {
                    return;
                }

                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                    let reply: &[u8] = if line.starts_with("RCPT TO:<") {
                        let recipient = line
                            .trim_start_matches("RCPT TO:<")
                            .split('>')
                            .next()
                            .unwrap_or("");
                        if accept(recipient) {
                            b"250 2.1.5 Ok\r\n"
                        } else {
                            b"550 5.1.1 User unknown\r\n"
                        }
                    } else {
                        b"250 Ok\r\n"
                    };
                    if writer.write_all(reply).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    addr
}

/// Stub billing app answering every subscription check with `subscribed`
async fn billing_app(subscribed: bool) -> String {
    let router = Router::new().route(
        "/api/check-subscription/:user_id",
        get(move || async move { Json(serde_json::json!({ "hasSubscription": subscribed })) }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A running service instance plus a provisioned API key
pub struct TestService {
    pub base_url: String,
    pub api_key: String,
    pub caller_id: String,
    client: reqwest::Client,
}

impl TestService {
    /// Full stack with production-like limits
    pub async fn start() -> Self {
        Self::start_with(10_000, 500, true).await
    }

    /// Full stack with custom quota ceiling, batch cap and subscription state
    pub async fn start_with(daily_limit: u32, max_batch: usize, subscribed: bool) -> Self {
        let mail_addr = mail_host(default_policy).await;
        let billing_url = billing_app(subscribed).await;

        let caller_id = "e2e-caller".to_string();
        let api_keys = ApiKeyStore::new("sqlite::memory:").await.unwrap();
        let api_key = api_keys.add_key(&caller_id, "e2e").await.unwrap();

        let subscription = SubscriptionClient::new(&billing_url, Duration::from_secs(2)).unwrap();
        let quota = QuotaTracker::new(
            Arc::new(MemoryCounterStore::new()),
            daily_limit,
            24 * 60 * 60,
        );

        let resolver = Arc::new(MxResolver::new(
            Arc::new(LoopbackMx),
            64,
            Duration::from_secs(5),
        ));
        let prober = SmtpProber::new(
            mail_addr.port(),
            Duration::from_secs(5),
            "probe@sender.test".to_string(),
            "verifier.test".to_string(),
        );
        let batch = BatchVerifier::new(
            Arc::new(EmailVerifier::new(resolver, prober)),
            10,
            max_batch,
            Duration::from_secs(20),
        );

        let state = Arc::new(AppState {
            api_keys,
            subscription,
            quota,
            batch,
        });

        let router = ApiServer::new(state, "127.0.0.1:0".to_string()).router();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            api_key,
            caller_id,
            client: reqwest::Client::new(),
        }
    }

    /// POST /email_verification with the provisioned key
    pub async fn verify(&self, emails: &[&str]) -> reqwest::Response {
        self.post_json(serde_json::json!({ "emails": emails })).await
    }

    /// POST an arbitrary JSON body to /email_verification
    pub async fn post_json(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/email_verification", self.base_url))
            .header("X-API-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// GET /api/usage with the provisioned key
    pub async fn usage(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/api/usage", self.base_url))
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .unwrap()
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
