//! Whitelist integrity verification.
//!
//! Each entry runs through the same states, and the first failing state rejects it:
//!
//! 1. `HashCheck`: the payload hashes (live, then legacy variants) to the envelope hash.
//! 2. `ContainerVerify`: a SuperAdmin-verified rules container is available.
//! 3. `HashCoverage`: some signature record lists the envelope hash.
//! 4. `SignatureThresholds`: the envelope's own approvals satisfy the governance rule
//!    for the payload's blockchain and network.
//! 5. `ParsePayload`: the domain object is built from the signed payload only.
//! 6. Addresses only: unsigned metadata (status, rule, creation date) is attached.
//!
//! Bulk verification is strict: the first rejected entry fails the whole list.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::crypto::ct_eq_str;
use crate::domain::address::wire::{AddressPayload, WhitelistedAddressDto};
use crate::domain::address::WhitelistedAddress;
use crate::domain::asset::wire::{AssetPayload, WhitelistedAssetDto};
use crate::domain::asset::WhitelistedAsset;
use crate::error::{IntegrityError, SdkError, WhitelistError};
use crate::governance::{
    DecodedRulesContainer, RulesContainerCache, SequentialThresholds, VerifiedRulesContainer,
    WhitelistingRule,
};
use crate::integrity::envelope::SignedEnvelope;
use crate::integrity::legacy::{address_hash_candidates, asset_hash_candidates};
use crate::integrity::threshold::check_hashes_signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Address,
    Asset,
}

impl EntityKind {
    fn as_str(self) -> &'static str {
        match self {
            EntityKind::Address => "address",
            EntityKind::Asset => "asset",
        }
    }

    fn hash_candidates(self, payload: &str) -> Vec<String> {
        match self {
            EntityKind::Address => address_hash_candidates(payload),
            EntityKind::Asset => asset_hash_candidates(payload),
        }
    }

    fn rule<'a>(
        self,
        container: &'a DecodedRulesContainer,
        blockchain: &str,
        network: Option<&str>,
    ) -> Option<&'a WhitelistingRule> {
        match self {
            EntityKind::Address => container.address_rule(blockchain, network),
            EntityKind::Asset => container.contract_rule(blockchain, network),
        }
    }
}

/// Verifies whitelisted addresses and assets against the cached rules container.
#[derive(Debug, Clone)]
pub struct WhitelistIntegrityVerifier {
    rules: Arc<RulesContainerCache>,
}

impl WhitelistIntegrityVerifier {
    pub fn new(rules: Arc<RulesContainerCache>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &Arc<RulesContainerCache> {
        &self.rules
    }

    pub async fn verify_address(
        &self,
        dto: &WhitelistedAddressDto,
    ) -> Result<WhitelistedAddress, SdkError> {
        let kind = EntityKind::Address;
        let envelope = envelope_of(kind, &dto.id, SignedEnvelope::try_from(dto))?;
        check_hash(kind, &dto.id, &envelope)?;
        let container = self.container(kind, &dto.id).await?;
        complete_address(&container, dto, &envelope)
    }

    /// Verify every address; the first failure aborts the listing.
    pub async fn verify_addresses(
        &self,
        dtos: &[WhitelistedAddressDto],
    ) -> Result<Vec<WhitelistedAddress>, SdkError> {
        let mut verified = Vec::with_capacity(dtos.len());
        for dto in dtos {
            verified.push(self.verify_address(dto).await?);
        }
        Ok(verified)
    }

    pub async fn verify_asset(&self, dto: &WhitelistedAssetDto) -> Result<WhitelistedAsset, SdkError> {
        let kind = EntityKind::Asset;
        let envelope = envelope_of(kind, &dto.id, SignedEnvelope::try_from(dto))?;
        check_hash(kind, &dto.id, &envelope)?;
        let container = self.container(kind, &dto.id).await?;
        complete_asset(&container, &dto.id, &envelope)
    }

    /// Verify every asset; the first failure aborts the listing.
    pub async fn verify_assets(
        &self,
        dtos: &[WhitelistedAssetDto],
    ) -> Result<Vec<WhitelistedAsset>, SdkError> {
        let mut verified = Vec::with_capacity(dtos.len());
        for dto in dtos {
            verified.push(self.verify_asset(dto).await?);
        }
        Ok(verified)
    }

    async fn container(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Arc<VerifiedRulesContainer>, SdkError> {
        self.rules.get().await.map_err(|e| {
            tracing::warn!(
                entity = kind.as_str(),
                id,
                step = "container_verify",
                error = %e,
                "whitelist verification rejected"
            );
            e
        })
    }
}

/// Verify an address against an already verified container.
pub fn verify_address_with(
    container: &VerifiedRulesContainer,
    dto: &WhitelistedAddressDto,
) -> Result<WhitelistedAddress, SdkError> {
    let kind = EntityKind::Address;
    let envelope = envelope_of(kind, &dto.id, SignedEnvelope::try_from(dto))?;
    check_hash(kind, &dto.id, &envelope)?;
    complete_address(container, dto, &envelope)
}

/// Verify an asset against an already verified container.
pub fn verify_asset_with(
    container: &VerifiedRulesContainer,
    dto: &WhitelistedAssetDto,
) -> Result<WhitelistedAsset, SdkError> {
    let kind = EntityKind::Asset;
    let envelope = envelope_of(kind, &dto.id, SignedEnvelope::try_from(dto))?;
    check_hash(kind, &dto.id, &envelope)?;
    complete_asset(container, &dto.id, &envelope)
}

// ─── States ──────────────────────────────────────────────────────────────────

fn complete_address(
    container: &VerifiedRulesContainer,
    dto: &WhitelistedAddressDto,
    envelope: &SignedEnvelope,
) -> Result<WhitelistedAddress, SdkError> {
    let kind = EntityKind::Address;
    check_coverage(envelope).map_err(|e| reject(kind, &dto.id, e))?;
    let payload: AddressPayload = parse_payload(kind, &dto.id, envelope)?;
    check_thresholds(
        kind,
        container,
        envelope,
        payload.blockchain.as_deref(),
        payload.network.as_deref(),
    )
    .map_err(|e| reject(kind, &dto.id, e))?;

    tracing::debug!(entity = kind.as_str(), id = %dto.id, "whitelist entry verified");
    Ok(WhitelistedAddress::from_verified(dto, envelope, payload))
}

fn complete_asset(
    container: &VerifiedRulesContainer,
    id: &str,
    envelope: &SignedEnvelope,
) -> Result<WhitelistedAsset, SdkError> {
    let kind = EntityKind::Asset;
    check_coverage(envelope).map_err(|e| reject(kind, id, e))?;
    let payload: AssetPayload = parse_payload(kind, id, envelope)?;
    check_thresholds(
        kind,
        container,
        envelope,
        payload.blockchain.as_deref(),
        payload.network.as_deref(),
    )
    .map_err(|e| reject(kind, id, e))?;

    tracing::debug!(entity = kind.as_str(), id, "whitelist entry verified");
    Ok(WhitelistedAsset::from_verified(id, envelope, payload))
}

fn check_hash(kind: EntityKind, id: &str, envelope: &SignedEnvelope) -> Result<(), SdkError> {
    let matched = kind
        .hash_candidates(&envelope.payload_as_string)
        .iter()
        .any(|candidate| ct_eq_str(candidate, &envelope.hash));
    if matched {
        Ok(())
    } else {
        Err(reject(kind, id, IntegrityError::HashMismatch))
    }
}

fn check_coverage(envelope: &SignedEnvelope) -> Result<(), IntegrityError> {
    if envelope.signatures.iter().any(|r| r.covers(&envelope.hash)) {
        Ok(())
    } else {
        Err(IntegrityError::HashNotCovered)
    }
}

fn check_thresholds(
    kind: EntityKind,
    container: &DecodedRulesContainer,
    envelope: &SignedEnvelope,
    blockchain: Option<&str>,
    network: Option<&str>,
) -> Result<(), IntegrityError> {
    let rule = kind
        .rule(container, blockchain.unwrap_or_default(), network)
        .ok_or(IntegrityError::NoApplicableRule)?;

    let approvers = approving_users(container, envelope);
    let satisfied = rule
        .parallel_thresholds
        .iter()
        .any(|path| path_satisfied(container, path, &approvers));

    if satisfied && approvers.len() >= container.minimum_distinct_user_count {
        Ok(())
    } else {
        Err(IntegrityError::ThresholdNotMet)
    }
}

/// Ids of governance users with a valid signature over a hash list that
/// includes the envelope hash. A record naming a user is checked against that
/// user's key only; an anonymous record is credited to the first user whose
/// key verifies it.
fn approving_users<'a>(
    container: &'a DecodedRulesContainer,
    envelope: &SignedEnvelope,
) -> HashSet<&'a str> {
    let mut approvers = HashSet::new();
    for record in envelope.signatures.iter().filter(|r| r.covers(&envelope.hash)) {
        let signer = match &record.user_id {
            Some(user_id) => container.user(user_id).filter(|user| {
                check_hashes_signature(&record.hashes, &record.signature, &user.public_key)
            }),
            None => container.users.iter().find(|user| {
                check_hashes_signature(&record.hashes, &record.signature, &user.public_key)
            }),
        };
        if let Some(user) = signer {
            approvers.insert(user.id.as_str());
        }
    }
    approvers
}

/// Every group threshold in `path` is met by distinct approving members.
fn path_satisfied(
    container: &DecodedRulesContainer,
    path: &SequentialThresholds,
    approvers: &HashSet<&str>,
) -> bool {
    !path.thresholds.is_empty()
        && path.thresholds.iter().all(|threshold| {
            let approved = container
                .group(&threshold.group_id)
                .map(|group| {
                    group
                        .user_ids
                        .iter()
                        .map(String::as_str)
                        .filter(|id| approvers.contains(id))
                        .collect::<HashSet<_>>()
                        .len()
                })
                .unwrap_or(0);
            approved >= threshold.minimum_signatures
        })
}

fn parse_payload<T: DeserializeOwned>(
    kind: EntityKind,
    id: &str,
    envelope: &SignedEnvelope,
) -> Result<T, SdkError> {
    serde_json::from_str(&envelope.payload_as_string).map_err(|e| {
        let err = WhitelistError::MalformedPayload(e.to_string());
        tracing::warn!(
            entity = kind.as_str(),
            id,
            step = "parse_payload",
            "whitelist verification rejected"
        );
        err.into()
    })
}

fn envelope_of(
    kind: EntityKind,
    id: &str,
    envelope: Result<SignedEnvelope, WhitelistError>,
) -> Result<SignedEnvelope, SdkError> {
    envelope.map_err(|e| {
        tracing::warn!(entity = kind.as_str(), id, error = %e, "whitelist envelope rejected");
        e.into()
    })
}

fn reject(kind: EntityKind, id: &str, err: IntegrityError) -> SdkError {
    tracing::warn!(
        entity = kind.as_str(),
        id,
        step = %err.step(),
        error = %err,
        "whitelist verification rejected"
    );
    err.into()
}
