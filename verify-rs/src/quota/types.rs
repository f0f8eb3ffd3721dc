use chrono::{DateTime, Utc};

/// One caller's usage inside the current window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageWindow {
    pub used: u32,
    /// When the window lapses; fixed at creation, never moved by increments
    pub expires_at: DateTime<Utc>,
}

/// Result of an atomic reservation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Usage updated; carries the window after the reservation
    Reserved(UsageWindow),
    /// The ceiling would be crossed; state was left untouched
    Exceeded {
        /// Usage already recorded, if a window existed at all
        existing: Option<u32>,
    },
}

/// Admission decision handed to the service layer
#[derive(Debug, Clone)]
pub struct QuotaDecision {
    pub admitted: bool,
    pub remaining: u32,
    pub reason: Option<String>,
}
