//! Rules container decoding: bytes → [`DecodedRulesContainer`].
//!
//! Decoding only ever runs on bytes whose SuperAdmin signatures already verified.

use crate::crypto::keys::PublicKeyMaterial;
use crate::error::{IntegrityError, SdkError};
use crate::governance::wire::{RulesContainerJson, WhitelistingRuleJson};
use crate::governance::{
    DecodedRulesContainer, GroupThreshold, RuleGroup, RuleUser, SequentialThresholds,
    WhitelistingRule,
};

/// Turns verified container bytes into the typed container.
pub trait RulesContainerDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRulesContainer, SdkError>;
}

/// Decoder for JSON-encoded containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRulesContainerDecoder;

impl RulesContainerDecoder for JsonRulesContainerDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRulesContainer, SdkError> {
        let json: RulesContainerJson = serde_json::from_slice(bytes)
            .map_err(|e| IntegrityError::MalformedRulesContainer(e.to_string()))?;
        Ok(DecodedRulesContainer::try_from(json)?)
    }
}

impl TryFrom<RulesContainerJson> for DecodedRulesContainer {
    type Error = SdkError;

    fn try_from(source: RulesContainerJson) -> Result<Self, Self::Error> {
        let users = source
            .users
            .into_iter()
            .map(|u| {
                Ok(RuleUser {
                    public_key: PublicKeyMaterial::parse(&u.public_key)?,
                    id: u.id,
                    roles: u.roles,
                })
            })
            .collect::<Result<Vec<_>, SdkError>>()?;

        let groups = source
            .groups
            .into_iter()
            .map(|g| RuleGroup {
                id: g.id,
                user_ids: g.user_ids,
            })
            .collect();

        let mut container = DecodedRulesContainer::new(
            users,
            groups,
            source
                .address_whitelisting_rules
                .into_iter()
                .map(WhitelistingRule::from)
                .collect(),
            source
                .contract_address_whitelisting_rules
                .into_iter()
                .map(WhitelistingRule::from)
                .collect(),
        );
        container.minimum_distinct_user_count = source.minimum_distinct_user_count;
        container.enforced_rules_hash = source.enforced_rules_hash;
        container.timestamp = source.timestamp;
        Ok(container)
    }
}

impl From<WhitelistingRuleJson> for WhitelistingRule {
    fn from(source: WhitelistingRuleJson) -> Self {
        Self {
            blockchain: source.blockchain,
            network: source.network,
            parallel_thresholds: source
                .parallel_thresholds
                .into_iter()
                .map(|seq| SequentialThresholds {
                    thresholds: seq
                        .thresholds
                        .into_iter()
                        .map(|t| GroupThreshold {
                            group_id: t.group_id,
                            minimum_signatures: t.minimum_signatures,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
