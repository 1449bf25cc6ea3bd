//! Integrity of administrative data: threshold signatures, legacy hashes,
//! signed envelopes and the whitelist verification state machine.

pub mod envelope;
pub mod legacy;
pub mod threshold;
pub mod whitelist;

pub use envelope::{SignatureRecord, SignedEnvelope, Trail};
pub use legacy::{compute_address_legacy_hashes, compute_asset_legacy_hashes};
pub use threshold::{check_hashes_signature, count_valid, sign_hashes, verify_threshold};
pub use whitelist::{verify_address_with, verify_asset_with, WhitelistIntegrityVerifier};
