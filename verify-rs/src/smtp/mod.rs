//! SMTP probing (RFC 5321 client side)
//!
//! - [`prober`]: disposable RCPT TO probe sessions
//! - [`response`]: server reply parsing

pub mod prober;
pub mod response;

pub use prober::{ProbeOutcome, SmtpProber};
pub use response::SmtpReply;
