//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: Verified domain types
//! - `wire.rs`: Raw serde structs matching API responses and signed payloads
//! - `convert.rs`: Conversions from wire types
//! - `client.rs`: Sub-client with HTTP methods (feature `http`)

pub mod address;
pub mod asset;
pub mod request;
