//! Authentication middleware
//!
//! Middleware for JWT token verification and caller extraction. The token
//! identifies an account row; the account must be active and the token must
//! have been issued to the account's current device.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{account_id_from_claims, verify_token, JwtError};
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Account, AccountRole};

/// Caller context extracted from a verified bearer token
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(caller: Caller) -> impl IntoResponse {
///     format!("Hello, account {}", caller.account_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller {
    pub account_id: Uuid,
    pub role: AccountRole,
    pub provider_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    PgPool: FromRef<S>,
    Arc<Config>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::Unauthorized(
                        "Authorization header with Bearer token required".to_string(),
                    )
                    .into_response()
                })?;

        let config = Arc::<Config>::from_ref(state);

        // Verify the token
        let claims = verify_token(bearer.token(), &config.jwt_secret).map_err(|e| {
            let message = match e {
                JwtError::TokenExpired => "Token has expired",
                _ => "Invalid token",
            };
            ApiError::Unauthorized(message.to_string()).into_response()
        })?;

        let account_id = account_id_from_claims(&claims).map_err(|_| {
            ApiError::Unauthorized("Invalid account ID in token".to_string()).into_response()
        })?;

        // Load the account backing this token
        let pool = PgPool::from_ref(state);
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(&pool)
            .await
            .map_err(|e| ApiError::from(e).into_response())?
            .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()).into_response())?;

        if !account.active {
            return Err(ApiError::AccountInactive.into_response());
        }

        // Single active device: a token minted for an older device is dead
        match account.device.as_deref() {
            Some(device) if device == claims.device => {}
            _ => {
                return Err(ApiError::Unauthorized(
                    "Token does not match the active device".to_string(),
                )
                .into_response());
            }
        }

        Ok(Caller {
            account_id: account.id,
            role: account.role,
            provider_id: account.provider_id,
            agent_id: account.agent_id,
        })
    }
}

/// Caller restricted to provider or admin accounts
pub struct ProviderCaller(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for ProviderCaller
where
    PgPool: FromRef<S>,
    Arc<Config>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;

        if !matches!(caller.role, AccountRole::Provider | AccountRole::Admin) {
            return Err(
                ApiError::Forbidden("Provider access required".to_string()).into_response()
            );
        }

        Ok(ProviderCaller(caller))
    }
}

