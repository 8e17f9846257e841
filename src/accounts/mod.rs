//! Account lookup and deactivation.

mod service;

pub use service::AccountService;
