//! SuperAdmin verification of governance rules.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::crypto::keys::PublicKeyMaterial;
use crate::error::{ConfigError, IntegrityError, SdkError};
use crate::governance::decode::RulesContainerDecoder;
use crate::governance::wire::GovernanceRules;
use crate::governance::VerifiedRulesContainer;
use crate::integrity::threshold::verify_threshold;

/// Verify `rules` against the configured SuperAdmin keys and decode the container.
///
/// The container bytes must carry valid signatures from at least
/// `min_valid_signatures` distinct SuperAdmin keys; only then are they decoded.
pub fn verify_governance_rules(
    rules: &GovernanceRules,
    super_admin_keys: &[PublicKeyMaterial],
    min_valid_signatures: usize,
    decoder: &dyn RulesContainerDecoder,
) -> Result<VerifiedRulesContainer, SdkError> {
    if super_admin_keys.is_empty() {
        return Err(ConfigError::MissingSuperAdminKeys.into());
    }
    if min_valid_signatures == 0 {
        return Err(ConfigError::InvalidMinValidSignatures(min_valid_signatures).into());
    }
    if rules.rules_container.trim().is_empty() {
        return Err(IntegrityError::RulesContainerMissing.into());
    }

    let container_bytes = BASE64
        .decode(rules.rules_container.trim())
        .map_err(|e| IntegrityError::MalformedRulesContainer(format!("invalid base64: {e}")))?;

    let signatures: Vec<&str> = rules
        .rules_signatures
        .iter()
        .map(|s| s.signature.as_str())
        .collect();

    let valid = match verify_threshold(
        &container_bytes,
        &signatures,
        super_admin_keys,
        min_valid_signatures,
    ) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(
                step = "container_verify",
                signatures = signatures.len(),
                required = min_valid_signatures,
                "governance rules rejected"
            );
            return Err(e.into());
        }
    };

    let container = decoder.decode(&container_bytes)?;
    tracing::debug!(valid_signatures = valid, "governance rules verified");
    Ok(VerifiedRulesContainer::new(container, valid))
}
