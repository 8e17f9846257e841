//! Authentication module for PinStock
//!
//! Token issuance lives in an external identity service; this module holds
//! the verification side: JWT decoding plus the claims structure the caller
//! extractor consumes.

mod jwt;

pub use jwt::{account_id_from_claims, generate_token, verify_token, Claims, JwtError};
