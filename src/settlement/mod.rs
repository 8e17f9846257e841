//! Purchase settlement domain
//!
//! Contains models and the workflow that turns a hold into a payment.

mod model;
mod service;

pub use model::{ListPaymentsQuery, PaymentItem, SettleRequest, SettleResponse};
pub use service::SettlementService;
