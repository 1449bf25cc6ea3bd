//! Wire types for governance rules.

use serde::{Deserialize, Serialize};

/// Response from `GET /api/rest/v1/governance_rules`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceRulesResponse {
    #[serde(default)]
    pub result: Option<GovernanceRules>,
}

/// Governance rules as returned by the API: opaque container bytes and the
/// SuperAdmin signatures over them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceRules {
    /// Base64-encoded container bytes.
    pub rules_container: String,
    #[serde(default)]
    pub rules_signatures: Vec<RuleUserSignature>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_date: Option<String>,
}

/// One SuperAdmin signature (base64 raw `r‖s`) over the container bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUserSignature {
    pub user_id: String,
    pub signature: String,
}

// ─── Container JSON ──────────────────────────────────────────────────────────

/// JSON form of the decoded container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesContainerJson {
    #[serde(default)]
    pub users: Vec<RuleUserJson>,
    #[serde(default)]
    pub groups: Vec<RuleGroupJson>,
    #[serde(default)]
    pub address_whitelisting_rules: Vec<WhitelistingRuleJson>,
    #[serde(default)]
    pub contract_address_whitelisting_rules: Vec<WhitelistingRuleJson>,
    #[serde(default)]
    pub minimum_distinct_user_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforced_rules_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUserJson {
    pub id: String,
    /// PEM, or base64 of PEM/DER.
    pub public_key: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroupJson {
    pub id: String,
    #[serde(default)]
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistingRuleJson {
    /// Blockchain; older containers call it `currency`.
    #[serde(default, alias = "currency", skip_serializing_if = "Option::is_none")]
    pub blockchain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default)]
    pub parallel_thresholds: Vec<SequentialThresholdsJson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequentialThresholdsJson {
    #[serde(default)]
    pub thresholds: Vec<GroupThresholdJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupThresholdJson {
    pub group_id: String,
    pub minimum_signatures: usize,
}
