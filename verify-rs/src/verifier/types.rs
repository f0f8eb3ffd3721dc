use serde::{Deserialize, Serialize};

/// Final judgment for an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Good,
    Bad,
    Risky,
}

/// Whether the mailbox accepted the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    Valid,
    Invalid,
    Unknown,
}

/// Whether the domain accepts mail for any local part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatchAll {
    Yes,
    No,
    Unknown,
}

/// One verified address
///
/// Built once per address per request and never mutated afterwards. The
/// variant names above are the wire values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub email: String,
    pub category: Category,
    pub valid: Validity,
    pub catch_all: CatchAll,
}

impl VerificationResult {
    /// Result for an address whose verification never finished
    pub fn indeterminate(email: &str) -> Self {
        Self {
            email: email.to_string(),
            category: Category::Risky,
            valid: Validity::Unknown,
            catch_all: CatchAll::Unknown,
        }
    }

    /// Result for an address whose domain has no usable mail exchanger
    pub fn no_mail_host(email: &str) -> Self {
        Self {
            email: email.to_string(),
            category: Category::Bad,
            valid: Validity::Invalid,
            catch_all: CatchAll::Unknown,
        }
    }
}
