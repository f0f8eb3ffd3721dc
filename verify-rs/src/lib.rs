//! verify-rs: SMTP email verification service
//!
//! A batch email verification API that checks deliverability by talking to
//! each recipient domain's live mail exchangers, without ever sending mail.
//!
//! # Features
//!
//! - **SMTP Probing**: RCPT-level mailbox checks over port 25 (RFC 5321)
//! - **Catch-all Detection**: Flags domains that accept any recipient
//! - **Performance**: Async/await with Tokio, bounded worker pool, MX caching
//! - **Quotas**: Per-caller sliding-window daily limits
//! - **Access Control**: API keys in sqlite plus subscription checks
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use verify_rs::config::Config;
//! use verify_rs::resolver::{DnsMx, MxResolver};
//! use verify_rs::smtp::SmtpProber;
//! use verify_rs::verifier::{BatchVerifier, EmailVerifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     let resolver = Arc::new(MxResolver::new(
//!         Arc::new(DnsMx::new()),
//!         config.verifier.mx_cache_size,
//!         Duration::from_secs(config.verifier.dns_timeout_secs),
//!     ));
//!     let prober = SmtpProber::new(
//!         config.verifier.smtp_port,
//!         Duration::from_secs(config.verifier.smtp_timeout_secs),
//!         config.verifier.mail_from.clone(),
//!         config.verifier.helo_domain.clone(),
//!     );
//!
//!     let batch = BatchVerifier::new(
//!         Arc::new(EmailVerifier::new(resolver, prober)),
//!         config.verifier.worker_threads,
//!         config.verifier.max_emails_per_request,
//!         Duration::from_secs(config.verifier.batch_timeout_secs),
//!     );
//!
//!     let input = vec!["someone@example.com".to_string()];
//!     for result in batch.verify_batch(&input).await? {
//!         println!("{}: {:?}", result.email, result.category);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`resolver`]: Cached MX resolution
//! - [`smtp`]: SMTP probe sessions
//! - [`verifier`]: Classification pipeline and batch orchestration
//! - [`quota`]: Per-caller usage tracking
//! - [`security`]: API key storage
//! - [`subscription`]: Billing entitlement checks
//! - [`api`]: REST surface

pub mod api;
pub mod config;
pub mod error;
pub mod quota;
pub mod resolver;
pub mod security;
pub mod smtp;
pub mod subscription;
pub mod verifier;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, VerifyError};
