use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use verify_rs::api::handlers::AppState;
use verify_rs::api::ApiServer;
use verify_rs::config::Config;
use verify_rs::quota::{MemoryCounterStore, QuotaTracker};
use verify_rs::resolver::{DnsMx, MxResolver};
use verify_rs::security::ApiKeyStore;
use verify_rs::smtp::SmtpProber;
use verify_rs::subscription::SubscriptionClient;
use verify_rs::verifier::{BatchVerifier, EmailVerifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config_path = "config.toml";
    let (config, from_file) = if std::path::Path::new(config_path).exists() {
        (Config::from_file(config_path)?, true)
    } else {
        (Config::default(), false)
    };

    // Initialize logging
    let level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level);
    match config.logging.format.as_str() {
        "pretty" => tracing::subscriber::set_global_default(subscriber.pretty().finish()),
        _ => tracing::subscriber::set_global_default(subscriber.finish()),
    }
    .expect("Failed to set tracing subscriber");

    info!("Starting verify-rs server");
    if from_file {
        info!("Configuration loaded from {}", config_path);
    } else {
        info!("No config file found, using defaults");
    }
    info!("  API listening on: {}", config.server.listen_addr);
    info!("  SMTP probe port: {}", config.verifier.smtp_port);
    info!("  Worker pool size: {}", config.verifier.worker_threads);
    info!("  Max batch size: {}", config.verifier.max_emails_per_request);
    info!("  Daily quota: {}", config.quota.daily_limit);

    // Credential store
    let api_keys = ApiKeyStore::new(&config.credentials.database_url).await?;

    // Billing app client
    let subscription = SubscriptionClient::new(
        &config.subscription.base_url,
        Duration::from_secs(config.subscription.timeout_secs),
    )?;

    // Usage tracking
    let quota = QuotaTracker::new(
        Arc::new(MemoryCounterStore::new()),
        config.quota.daily_limit,
        config.quota.window_secs,
    );

    // Verification pipeline
    let resolver = Arc::new(MxResolver::new(
        Arc::new(DnsMx::new()),
        config.verifier.mx_cache_size,
        Duration::from_secs(config.verifier.dns_timeout_secs),
    ));
    let prober = SmtpProber::new(
        config.verifier.smtp_port,
        Duration::from_secs(config.verifier.smtp_timeout_secs),
        config.verifier.mail_from.clone(),
        config.verifier.helo_domain.clone(),
    );
    let batch = BatchVerifier::new(
        Arc::new(EmailVerifier::new(resolver, prober)),
        config.verifier.worker_threads,
        config.verifier.max_emails_per_request,
        Duration::from_secs(config.verifier.batch_timeout_secs),
    );

    let state = Arc::new(AppState {
        api_keys,
        subscription,
        quota,
        batch,
    });

    let server = ApiServer::new(state, config.server.listen_addr.clone());
    server.run().await?;

    Ok(())
}
