//! Catch-all domain detection

use crate::smtp::{ProbeOutcome, SmtpProber};
use rand::Rng;
use tracing::debug;

const LOCAL_PART_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const LOCAL_PART_LEN: usize = 10;

/// Random local part that is almost certainly unassigned
pub fn random_local_part() -> String {
    let mut rng = rand::thread_rng();
    (0..LOCAL_PART_LEN)
        .map(|_| LOCAL_PART_CHARS[rng.gen_range(0..LOCAL_PART_CHARS.len())] as char)
        .collect()
}

/// Whether `domain` accepts mail for any local part
///
/// Probes a synthetic address against the host that already accepted the
/// real one. Anything but an accept reads as "not catch-all".
pub async fn is_catch_all(prober: &SmtpProber, host: &str, domain: &str) -> bool {
    let random_address = format!("{}@{}", random_local_part(), domain);
    debug!("Catch-all check for {} using {}", domain, random_address);

    matches!(
        prober.probe(host, &random_address).await,
        ProbeOutcome::Accepted
    )
}
