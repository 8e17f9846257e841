//! HTTP request handlers

pub mod accounts;
pub mod funding;
pub mod health;
pub mod inventory;
pub mod reservation;
pub mod settlement;

pub use crate::middleware::{Caller, ProviderCaller};
