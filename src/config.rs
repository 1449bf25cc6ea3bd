//! Trust configuration: SuperAdmin keys, signature threshold, rules cache TTL.

use std::sync::Arc;
use std::time::Duration;

use crate::crypto::keys::PublicKeyMaterial;
use crate::error::ConfigError;
use crate::governance::DEFAULT_RULES_CACHE_TTL;

/// Default number of SuperAdmin signatures a rules container needs.
pub const DEFAULT_MIN_VALID_SIGNATURES: usize = 1;

/// Validated trust anchor settings.
#[derive(Debug, Clone)]
pub struct TrustConfig {
    super_admin_keys: Arc<[PublicKeyMaterial]>,
    min_valid_signatures: usize,
    rules_cache_ttl: Duration,
}

impl TrustConfig {
    pub fn new(
        super_admin_keys: Vec<PublicKeyMaterial>,
        min_valid_signatures: usize,
    ) -> Result<Self, ConfigError> {
        if min_valid_signatures == 0 {
            return Err(ConfigError::InvalidMinValidSignatures(min_valid_signatures));
        }
        if super_admin_keys.is_empty() {
            return Err(ConfigError::MissingSuperAdminKeys);
        }
        if min_valid_signatures > super_admin_keys.len() {
            return Err(ConfigError::ThresholdExceedsKeys {
                min: min_valid_signatures,
                keys: super_admin_keys.len(),
            });
        }
        Ok(Self {
            super_admin_keys: super_admin_keys.into(),
            min_valid_signatures,
            rules_cache_ttl: DEFAULT_RULES_CACHE_TTL,
        })
    }

    /// Decode SuperAdmin keys from PEM (or base64 of PEM/DER) strings.
    /// Any key that is not P-256 fails the whole configuration.
    pub fn from_pem_keys<S: AsRef<str>>(
        pems: &[S],
        min_valid_signatures: usize,
    ) -> Result<Self, ConfigError> {
        let keys = pems
            .iter()
            .map(|pem| PublicKeyMaterial::parse(pem.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keys, min_valid_signatures)
    }

    pub fn with_rules_cache_ttl(mut self, ttl: Duration) -> Result<Self, ConfigError> {
        if ttl.is_zero() {
            return Err(ConfigError::InvalidCacheTtl);
        }
        self.rules_cache_ttl = ttl;
        Ok(self)
    }

    pub fn super_admin_keys(&self) -> &[PublicKeyMaterial] {
        &self.super_admin_keys
    }

    pub(crate) fn shared_keys(&self) -> Arc<[PublicKeyMaterial]> {
        Arc::clone(&self.super_admin_keys)
    }

    pub fn min_valid_signatures(&self) -> usize {
        self.min_valid_signatures
    }

    pub fn rules_cache_ttl(&self) -> Duration {
        self.rules_cache_ttl
    }
}
