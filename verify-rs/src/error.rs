use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SMTP protocol error: {0}")]
    SmtpProtocol(String),

    #[error("DNS lookup failed: {0}")]
    DnsLookup(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Subscription required: {0}")]
    SubscriptionRequired(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Batch of {count} addresses exceeds the limit of {max}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Quota exceeded: {reason}")]
    QuotaExceeded {
        reason: String,
        remaining: u32,
        reset_in_minutes: u64,
    },
}

pub type Result<T> = std::result::Result<T, VerifyError>;
