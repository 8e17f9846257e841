//! Wallet funding: provider-to-seller transfers, reversals and the
//! per-seller transfer lock.

mod model;
mod service;

pub use model::{
    FundRequest, FundResponse, ListTransactionsQuery, ResetFundingRequest, ReversalResponse,
};
pub use service::FundingService;
