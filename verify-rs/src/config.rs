use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub verifier: VerifierConfig,
    pub quota: QuotaConfig,
    pub credentials: CredentialsConfig,
    pub subscription: SubscriptionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifierConfig {
    /// Port probed on resolved mail-exchange hosts
    pub smtp_port: u16,
    /// Deadline for one full probe exchange, in seconds
    pub smtp_timeout_secs: u64,
    /// Deadline for one MX lookup, in seconds
    pub dns_timeout_secs: u64,
    /// Sender address presented in MAIL FROM
    pub mail_from: String,
    /// Name presented in EHLO
    pub helo_domain: String,
    /// Concurrent verifications across all requests
    pub worker_threads: usize,
    /// Wall-clock budget for one batch, in seconds
    pub batch_timeout_secs: u64,
    /// Maximum addresses accepted per request
    pub max_emails_per_request: usize,
    /// Cached MX entries before eviction kicks in
    pub mx_cache_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotaConfig {
    pub daily_limit: u32,
    pub window_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::VerifyError::Config(e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| crate::error::VerifyError::Config(e.to_string()))
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "0.0.0.0:5000".to_string(),
            },
            verifier: VerifierConfig {
                smtp_port: 25,
                smtp_timeout_secs: 60,
                dns_timeout_secs: 60,
                mail_from: "radam@paidclient.com".to_string(),
                helo_domain: "verifier.local".to_string(),
                worker_threads: 50,
                batch_timeout_secs: 20,
                max_emails_per_request: 500,
                mx_cache_size: 1024,
            },
            quota: QuotaConfig {
                daily_limit: 10_000,
                window_secs: 24 * 60 * 60,
            },
            credentials: CredentialsConfig {
                database_url: "sqlite://keys.db".to_string(),
            },
            subscription: SubscriptionConfig {
                base_url: "http://localhost:3000".to_string(),
                timeout_secs: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
