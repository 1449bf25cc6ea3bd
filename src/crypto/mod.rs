//! Cryptographic primitives: hashing, constant-time comparison, P-256 keys and
//! ECDSA signatures in the raw `r‖s` wire format.

pub mod constant_time;
pub mod ecdsa;
pub mod hashing;
pub mod keys;

pub use constant_time::{ct_eq_bytes, ct_eq_str};
pub use ecdsa::{der_to_raw, raw_to_der, sign, verify};
pub use hashing::{hmac_sha256_base64, sha256, sha256_hex};
pub use keys::{PrivateKeyMaterial, PublicKeyMaterial};
