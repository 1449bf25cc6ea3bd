//! Governance rules: the SuperAdmin-signed trust anchor.
//!
//! The API returns governance rules as an opaque container (base64 bytes) plus a
//! list of SuperAdmin signatures over those bytes. The container holds the users
//! and groups allowed to approve whitelist entries, the approval thresholds, and
//! the HSM public keys. Nothing inside it is trusted until
//! [`verify::verify_governance_rules`] has confirmed enough SuperAdmin signatures;
//! [`VerifiedRulesContainer`] is only constructible through that function.

pub mod cache;
#[cfg(feature = "http")]
pub mod client;
pub mod decode;
pub mod verify;
pub mod wire;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::crypto::keys::PublicKeyMaterial;

pub use cache::{RulesContainerCache, RulesFetchFuture, DEFAULT_RULES_CACHE_TTL};
pub use decode::{JsonRulesContainerDecoder, RulesContainerDecoder};
pub use verify::verify_governance_rules;
pub use wire::{GovernanceRules, RuleUserSignature};

/// Role carried by users whose key belongs to an HSM slot.
pub const HSM_SLOT_ROLE: &str = "HSMSLOT";

/// Blockchain value marking a rule that applies to every blockchain.
pub const ANY_BLOCKCHAIN: &str = "Any";

// ─── Users & groups ──────────────────────────────────────────────────────────

/// A governance user and the key their approvals are checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleUser {
    pub id: String,
    pub public_key: PublicKeyMaterial,
    pub roles: Vec<String>,
}

impl RuleUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// A named set of users referenced by thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroup {
    pub id: String,
    pub user_ids: Vec<String>,
}

// ─── Thresholds ──────────────────────────────────────────────────────────────

/// At least `minimum_signatures` distinct members of `group_id` must approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupThreshold {
    pub group_id: String,
    pub minimum_signatures: usize,
}

/// Group thresholds that must all be met (one approval path).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequentialThresholds {
    pub thresholds: Vec<GroupThreshold>,
}

/// Approval policy for one (blockchain, network) scope.
///
/// `parallel_thresholds` lists alternative approval paths; meeting any one of
/// them satisfies the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistingRule {
    pub blockchain: Option<String>,
    pub network: Option<String>,
    pub parallel_thresholds: Vec<SequentialThresholds>,
}

impl WhitelistingRule {
    fn is_global(&self) -> bool {
        match &self.blockchain {
            None => true,
            Some(b) => b.is_empty() || b.eq_ignore_ascii_case(ANY_BLOCKCHAIN),
        }
    }

    fn matches_blockchain(&self, blockchain: &str) -> bool {
        self.blockchain
            .as_deref()
            .map(|b| b.eq_ignore_ascii_case(blockchain))
            .unwrap_or(false)
    }

    fn network_is_any(&self) -> bool {
        self.network.as_deref().map(str::is_empty).unwrap_or(true)
    }
}

// ─── Container ───────────────────────────────────────────────────────────────

/// Decoded governance rules container.
#[derive(Debug, Clone)]
pub struct DecodedRulesContainer {
    pub users: Vec<RuleUser>,
    pub groups: Vec<RuleGroup>,
    pub address_whitelisting_rules: Vec<WhitelistingRule>,
    pub contract_address_whitelisting_rules: Vec<WhitelistingRule>,
    pub minimum_distinct_user_count: usize,
    pub enforced_rules_hash: Option<String>,
    /// Server-side timestamp carried inside the container.
    pub timestamp: Option<i64>,
    /// When this container was decoded locally.
    pub decoded_at: DateTime<Utc>,
    user_index: HashMap<String, usize>,
}

impl DecodedRulesContainer {
    pub fn new(
        users: Vec<RuleUser>,
        groups: Vec<RuleGroup>,
        address_whitelisting_rules: Vec<WhitelistingRule>,
        contract_address_whitelisting_rules: Vec<WhitelistingRule>,
    ) -> Self {
        let user_index = users
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id.clone(), i))
            .collect();
        Self {
            users,
            groups,
            address_whitelisting_rules,
            contract_address_whitelisting_rules,
            minimum_distinct_user_count: 0,
            enforced_rules_hash: None,
            timestamp: None,
            decoded_at: Utc::now(),
            user_index,
        }
    }

    pub fn user(&self, id: &str) -> Option<&RuleUser> {
        self.user_index.get(id).map(|i| &self.users[*i])
    }

    pub fn group(&self, id: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Public keys of users holding the HSM slot role.
    pub fn hsm_public_keys(&self) -> Vec<&PublicKeyMaterial> {
        self.users
            .iter()
            .filter(|u| u.has_role(HSM_SLOT_ROLE))
            .map(|u| &u.public_key)
            .collect()
    }

    /// Rule governing address whitelisting on `(blockchain, network)`.
    pub fn address_rule(&self, blockchain: &str, network: Option<&str>) -> Option<&WhitelistingRule> {
        find_rule(&self.address_whitelisting_rules, blockchain, network)
    }

    /// Rule governing contract (asset) whitelisting on `(blockchain, network)`.
    pub fn contract_rule(
        &self,
        blockchain: &str,
        network: Option<&str>,
    ) -> Option<&WhitelistingRule> {
        find_rule(&self.contract_address_whitelisting_rules, blockchain, network)
    }
}

/// Most specific rule first: exact network, then blockchain-wide, then global.
fn find_rule<'a>(
    rules: &'a [WhitelistingRule],
    blockchain: &str,
    network: Option<&str>,
) -> Option<&'a WhitelistingRule> {
    if let Some(network) = network.filter(|n| !n.is_empty()) {
        let exact = rules.iter().find(|r| {
            r.matches_blockchain(blockchain)
                && r.network
                    .as_deref()
                    .map(|n| n.eq_ignore_ascii_case(network))
                    .unwrap_or(false)
        });
        if exact.is_some() {
            return exact;
        }
    }

    rules
        .iter()
        .find(|r| r.matches_blockchain(blockchain) && r.network_is_any())
        .or_else(|| rules.iter().find(|r| r.is_global()))
}

/// A rules container whose bytes carried enough valid SuperAdmin signatures.
#[derive(Debug, Clone)]
pub struct VerifiedRulesContainer {
    container: DecodedRulesContainer,
    valid_signatures: usize,
}

impl VerifiedRulesContainer {
    pub(crate) fn new(container: DecodedRulesContainer, valid_signatures: usize) -> Self {
        Self {
            container,
            valid_signatures,
        }
    }

    pub fn container(&self) -> &DecodedRulesContainer {
        &self.container
    }

    /// Number of SuperAdmin signatures that verified over the container bytes.
    pub fn valid_signatures(&self) -> usize {
        self.valid_signatures
    }
}

impl std::ops::Deref for VerifiedRulesContainer {
    type Target = DecodedRulesContainer;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}
