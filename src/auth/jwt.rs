//! JWT token verification
//!
//! Tokens are issued by the identity collaborator; this module verifies them
//! and can mint tokens for tooling and tests. Claims carry the account id,
//! role and the device the token was issued to.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Account;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token decoding failed: {0}")]
    DecodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Account role
    pub role: String,
    /// Device the token was issued to
    pub device: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Generate a token for an account
///
/// # Arguments
/// * `account` - The account the token identifies
/// * `device` - Device identifier the token is bound to
/// * `secret` - JWT signing secret
/// * `ttl_seconds` - Token time-to-live in seconds
pub fn generate_token(
    account: &Account,
    device: &str,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(ttl_seconds);

    let claims = Claims {
        sub: account.id.to_string(),
        role: account.role.as_str().to_string(),
        device: device.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::EncodingFailed(e.to_string()))
}

/// Verify and decode a JWT token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        if e.to_string().contains("ExpiredSignature") {
            JwtError::TokenExpired
        } else {
            JwtError::DecodingFailed(e.to_string())
        }
    })?;

    Ok(token_data.claims)
}

/// Extract account ID from claims
pub fn account_id_from_claims(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountRole;
    use chrono::Utc;

    fn create_test_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "seller-01".to_string(),
            display_name: "Seller One".to_string(),
            role: AccountRole::Seller,
            provider_id: Some(Uuid::new_v4()),
            agent_id: None,
            active: true,
            wallet_amount: 1000,
            payment_amount: 0,
            device: Some("pos-1".to_string()),
            hold_id: None,
            hold_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_and_verify_token() {
        let account = create_test_account();
        let secret = "test-secret-key";

        let token = generate_token(&account, "pos-1", secret, 900).unwrap();
        assert!(!token.is_empty());

        let claims = verify_token(&token, secret).unwrap();
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.role, "seller");
        assert_eq!(claims.device, "pos-1");
        assert_eq!(account_id_from_claims(&claims).unwrap(), account.id);
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_token("invalid.token.here", "test-secret-key");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let account = create_test_account();
        let token = generate_token(&account, "pos-1", "secret1", 900).unwrap();
        let result = verify_token(&token, "secret2");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token() {
        let account = create_test_account();
        let secret = "test-secret-key";

        // Past expiry beyond the default leeway
        let token = generate_token(&account, "pos-1", secret, -3600).unwrap();
        match verify_token(&token, secret) {
            Err(JwtError::TokenExpired) => {}
            other => panic!("expected TokenExpired, got {:?}", other),
        }
    }
}
