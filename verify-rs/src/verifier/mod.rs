//! Email verification engine
//!
//! - [`types`]: result records and their wire categories
//! - [`classify`]: category decision table
//! - [`catch_all`]: catch-all domain detection
//! - [`single`]: one-address pipeline
//! - [`batch`]: batch orchestration over the shared worker pool

pub mod batch;
pub mod catch_all;
pub mod classify;
pub mod single;
pub mod types;

pub use batch::{BatchVerifier, VerifyOne};
pub use classify::classify;
pub use single::EmailVerifier;
pub use types::{CatchAll, Category, Validity, VerificationResult};
