//! Middleware for PinStock API
//!
//! This module provides middleware for request tracing and caller extraction.

pub mod auth;
mod tracing;

pub use auth::{Caller, ProviderCaller};
pub use tracing::request_tracing;
