//! Batch orchestration
//!
//! Fans a list of addresses across a bounded worker pool shared by every
//! request, reassembles results in input order, and cuts the whole batch
//! off at a wall-clock budget.

use crate::error::{Result, VerifyError};
use crate::verifier::single::EmailVerifier;
use crate::verifier::types::VerificationResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// One-address verification, as the orchestrator sees it
#[async_trait]
pub trait VerifyOne: Send + Sync {
    async fn verify(&self, email: &str) -> VerificationResult;
}

#[async_trait]
impl VerifyOne for EmailVerifier {
    async fn verify(&self, email: &str) -> VerificationResult {
        self.verify(email).await
    }
}

/// Orchestrator over the shared worker pool
pub struct BatchVerifier {
    verifier: Arc<dyn VerifyOne>,
    workers: Arc<Semaphore>,
    max_batch: usize,
    budget: Duration,
}

impl BatchVerifier {
    /// Create an orchestrator with `workers` concurrent verifications across
    /// all requests, `max_batch` addresses per request and a per-batch
    /// wall-clock `budget`
    pub fn new(
        verifier: Arc<dyn VerifyOne>,
        workers: usize,
        max_batch: usize,
        budget: Duration,
    ) -> Self {
        Self {
            verifier,
            workers: Arc::new(Semaphore::new(workers)),
            max_batch,
            budget,
        }
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    /// Reject a batch that exceeds the per-request cap
    pub fn check_batch_size(&self, count: usize) -> Result<()> {
        if count > self.max_batch {
            return Err(VerifyError::BatchTooLarge {
                count,
                max: self.max_batch,
            });
        }
        Ok(())
    }

    /// Verify a batch, preserving input order
    ///
    /// Output length always equals input length: a panicked task yields an
    /// indeterminate placeholder, and so does any work still running when
    /// the budget expires. Tasks cut off by the budget are aborted rather
    /// than left holding pool permits.
    pub async fn verify_batch(&self, emails: &[String]) -> Result<Vec<VerificationResult>> {
        self.check_batch_size(emails.len())?;

        let started = Instant::now();
        let deadline = started + self.budget;

        let handles: Vec<_> = emails
            .iter()
            .map(|email| {
                let verifier = Arc::clone(&self.verifier);
                let workers = Arc::clone(&self.workers);
                let email = email.clone();
                tokio::spawn(async move {
                    let _permit = match workers.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return VerificationResult::indeterminate(&email),
                    };
                    verifier.verify(&email).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        let mut cut_off = 0usize;

        for (email, mut handle) in emails.iter().zip(handles) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, &mut handle).await {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(e)) => {
                    warn!("Verification task for {} failed: {}", email, e);
                    results.push(VerificationResult::indeterminate(email));
                }
                Err(_) => {
                    // Budget exhausted; kill the task but keep its result if
                    // it finished in the meantime
                    handle.abort();
                    match handle.await {
                        Ok(result) => results.push(result),
                        Err(_) => {
                            cut_off += 1;
                            results.push(VerificationResult::indeterminate(email));
                        }
                    }
                }
            }
        }

        if cut_off > 0 {
            warn!(
                "Batch budget of {}s exhausted, {} of {} verifications unfinished",
                self.budget.as_secs(),
                cut_off,
                emails.len()
            );
        }

        info!(
            "Verified {} addresses in {:.2} seconds",
            emails.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(results)
    }
}
