//! REST API module for verify-rs
//!
//! Provides the HTTP surface for batch email verification

pub mod handlers;
pub mod server;

pub use server::ApiServer;
