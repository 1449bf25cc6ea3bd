//! Whitelisted asset domain: verified contract addresses, wire types, conversion.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use serde::{Deserialize, Serialize};

/// A whitelisted asset whose payload passed integrity verification.
///
/// Every field except `id` comes from the signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistedAsset {
    pub id: String,
    pub verified_hash: String,
    pub blockchain: Option<String>,
    pub network: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub contract_address: Option<String>,
    pub decimals: Option<u32>,
    pub token_id: Option<String>,
    pub kind_type: Option<String>,
    pub is_nft: Option<bool>,
}
