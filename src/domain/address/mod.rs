//! Whitelisted address domain: verified addresses, wire types, conversion.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trail action whose date becomes [`WhitelistedAddress::created_at`].
pub const CREATED_TRAIL_ACTION: &str = "created";

/// A whitelisted address whose payload passed integrity verification.
///
/// Security fields come only from the signed payload and are `None` when the
/// payload does not carry them. `status`, `rule` and `created_at` are
/// informational and come from the unsigned response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistedAddress {
    pub id: String,
    /// Hash the approvals were verified against (live or legacy).
    pub verified_hash: String,
    pub blockchain: Option<String>,
    pub network: Option<String>,
    pub address: Option<String>,
    pub memo: Option<String>,
    pub label: Option<String>,
    pub customer_id: Option<String>,
    pub address_type: Option<String>,
    pub exchange_account_id: Option<String>,
    pub contract_type: Option<String>,
    pub linked_internal_addresses: Vec<LinkedAddress>,
    pub status: Option<String>,
    pub rule: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Internal address linked to a whitelisted address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAddress {
    pub id: Option<String>,
    pub address: Option<String>,
    pub label: Option<String>,
}
