//! Authentication of outbound requests.
//!
//! Every request to the custody API carries a TPV1 `Authorization` header: an
//! HMAC-SHA256 over a canonical message built from the API key, a fresh nonce,
//! the current time in milliseconds and the request itself. The API secret
//! never leaves [`RequestSigner`] and can be wiped with [`RequestSigner::close`].

pub mod signer;

pub use signer::{canonical_message, RequestParts, RequestSigner, TPV1_HEADER_PREFIX};
