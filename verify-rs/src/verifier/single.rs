//! Single-address verification pipeline
//!
//! State machine per address: resolve the domain's MX host, probe the
//! recipient, check for catch-all on accepted addresses, classify. Every
//! terminal state yields exactly one result; nothing escapes past `verify`.

use crate::resolver::MxResolver;
use crate::smtp::{ProbeOutcome, SmtpProber};
use crate::verifier::catch_all::is_catch_all;
use crate::verifier::classify::classify;
use crate::verifier::types::{CatchAll, Validity, VerificationResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Verifier for one address at a time
pub struct EmailVerifier {
    resolver: Arc<MxResolver>,
    prober: SmtpProber,
}

impl EmailVerifier {
    pub fn new(resolver: Arc<MxResolver>, prober: SmtpProber) -> Self {
        Self { resolver, prober }
    }

    /// Verify one address, always yielding exactly one result
    ///
    /// DNS and SMTP failures downgrade to a Bad or Risky classification for
    /// this address; they never abort the surrounding batch.
    pub async fn verify(&self, email: &str) -> VerificationResult {
        debug!("Verifying {}", email);

        // Everything after the last @ is the domain, byte for byte
        let domain = email.rsplit('@').next().unwrap_or(email);

        let Some(host) = self.resolver.resolve(domain).await else {
            return VerificationResult::no_mail_host(email);
        };

        let outcome = self.prober.probe(&host, email).await;

        let (valid, error) = match &outcome {
            ProbeOutcome::Accepted => (true, None),
            ProbeOutcome::Rejected(reason) => (false, Some(reason.as_str())),
            ProbeOutcome::Errored(reason) => (false, Some(reason.as_str())),
        };

        if let Some(reason) = error {
            info!("Email validation error for {}: {}", email, reason);
        }

        // Catch-all only matters once the real address was accepted; probing
        // it on a rejection would double the cost for nothing
        let catch_all = if valid {
            is_catch_all(&self.prober, &host, domain).await
        } else {
            false
        };

        VerificationResult {
            email: email.to_string(),
            category: classify(valid, catch_all, error),
            valid: if valid {
                Validity::Valid
            } else {
                Validity::Invalid
            },
            catch_all: if catch_all { CatchAll::Yes } else { CatchAll::No },
        }
    }
}
