//! Data models for PinStock backend

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Account model — one row per admin, provider, agent or seller
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: AccountRole,
    /// Owning provider for sellers and agents
    pub provider_id: Option<Uuid>,
    /// Optional middle tier between provider and seller
    pub agent_id: Option<Uuid>,
    pub active: bool,
    /// Balance in integer currency units
    pub wallet_amount: i64,
    /// Cumulative spend in integer currency units
    pub payment_amount: i64,
    /// Single active login device
    pub device: Option<String>,
    /// Funding lock token; non-null while a wallet transfer is in flight
    pub hold_id: Option<String>,
    pub hold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Tenant that owns this account's purchases: providers are their own
    /// tenant, sellers and agents belong to their provider.
    pub fn owning_provider(&self) -> Option<Uuid> {
        match self.role {
            AccountRole::Provider => Some(self.id),
            _ => self.provider_id,
        }
    }
}

/// Account roles
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Seller,
    Provider,
    Agent,
    Admin,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Seller => "seller",
            AccountRole::Provider => "provider",
            AccountRole::Agent => "agent",
            AccountRole::Admin => "admin",
        }
    }
}

/// Account response (sanitized for API)
#[derive(Debug, Serialize, Clone)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: AccountRole,
    pub provider_id: Option<Uuid>,
    pub active: bool,
    pub wallet_amount: i64,
    pub payment_amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            display_name: account.display_name,
            role: account.role,
            provider_id: account.provider_id,
            active: account.active,
            wallet_amount: account.wallet_amount,
            payment_amount: account.payment_amount,
            created_at: account.created_at,
        }
    }
}

/// Catalog plan (card product)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Plan {
    pub id: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Import batch of stock units for one plan
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Archive {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Provider-scoped price for a plan
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct CustomPrice {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub plan_id: Uuid,
    pub archive_id: Uuid,
    /// What the seller's customer pays
    pub price: i64,
    /// What the seller is charged
    pub seller_price: i64,
    /// Provider's own cost
    pub company_price: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// One prepaid card
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct StockUnit {
    pub id: Uuid,
    pub serial: String,
    /// Secret delivered to the buyer at settlement
    pub code: String,
    pub status: StockStatus,
    pub hold_id: Option<String>,
    pub hold_at: Option<DateTime<Utc>>,
    pub sold_at: Option<DateTime<Utc>>,
    pub provider_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub plan_id: Uuid,
    pub archive_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Stock unit lifecycle
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "stock_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Ready,
    Hold,
    Sold,
}

/// Immutable sale record
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub provider_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub plan_id: Uuid,
    pub unit_price: i64,
    pub cost_price: i64,
    pub quantity: i32,
    /// Snapshot of the delivered serial/code pairs
    pub items: serde_json::Value,
    pub note: Option<String>,
    /// Set once when the buyer activates the card; the only later mutation
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Wallet funding event
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub provider_id: Uuid,
    pub amount: i64,
    pub source: FundingSource,
    pub kind: TransactionKind,
    /// Lock token that serialized this transfer
    pub hold_id: String,
    pub created_at: DateTime<Utc>,
}

/// Where funded money comes from
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "funding_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FundingSource {
    Provider,
    Admin,
}

/// Transfer classification
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "transaction_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Funding,
    Refund,
}

/// Generate an opaque hold token: a random UUID without hyphens.
///
/// Stamped on stock rows at reservation and on the seller row while a
/// wallet transfer is in flight; never stored as its own entity.
pub fn new_hold_token() -> String {
    Uuid::new_v4().simple().to_string()
}
