//! Legacy payload hashes for schema evolution.
//!
//! Fields were added to whitelist payloads after some records had already been
//! signed. For those records the hash of today's payload never matches a signed
//! hash, but the hash of the payload with the newer fields removed does.
//!
//! Fields are removed textually so the remaining bytes are exactly those that were
//! originally hashed; re-serializing parsed JSON would not preserve them.
//! Addresses and assets have distinct field sets and distinct resolvers.

use std::sync::OnceLock;

use regex::Regex;

use crate::crypto::hashing::sha256_hex;

/// A JSON string value, honouring escapes.
const JSON_STRING: &str = r#""(?:[^"\\]|\\.)*""#;

/// The `linkedInternalAddresses` array. Brackets inside string values do not
/// close it.
const LINKED_ADDRESSES_SECTION: &str =
    r#""linkedInternalAddresses"\s*:\s*\[(?:[^\]"]|"(?:[^"\\]|\\.)*")*\]"#;

/// One textual field removal.
type Removal = fn(&str) -> String;

/// Address removals, in the order their combinations are tried.
const ADDRESS_REMOVALS: [Removal; 2] = [remove_contract_type, remove_linked_address_labels];

/// Asset removals, in the order their combinations are tried.
const ASSET_REMOVALS: [Removal; 2] = [remove_is_nft, remove_kind_type];

/// Hashes of `payload` with each non-empty combination of address field removals
/// applied: without `contractType`, without linked-address `label`s, without both.
pub fn compute_address_legacy_hashes(payload: &str) -> Vec<String> {
    legacy_hashes(payload, &ADDRESS_REMOVALS)
}

/// Hashes of `payload` with each non-empty combination of asset field removals
/// applied: without `isNFT`, without `kindType`, without both.
pub fn compute_asset_legacy_hashes(payload: &str) -> Vec<String> {
    legacy_hashes(payload, &ASSET_REMOVALS)
}

/// Ordered hash candidates for a payload: its live hash, then legacy variants.
pub fn address_hash_candidates(payload: &str) -> Vec<String> {
    let mut candidates = vec![sha256_hex(payload.as_bytes())];
    candidates.extend(compute_address_legacy_hashes(payload));
    candidates
}

/// Ordered hash candidates for an asset payload: its live hash, then legacy variants.
pub fn asset_hash_candidates(payload: &str) -> Vec<String> {
    let mut candidates = vec![sha256_hex(payload.as_bytes())];
    candidates.extend(compute_asset_legacy_hashes(payload));
    candidates
}

/// Apply every non-empty subset of `removals` (singletons first), skipping variants
/// identical to the original payload or to an earlier variant.
fn legacy_hashes(payload: &str, removals: &[Removal]) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();
    let subsets = 1u32 << removals.len();

    let mut masks: Vec<u32> = (1..subsets).collect();
    masks.sort_by_key(|m| m.count_ones());

    for mask in masks {
        let variant = removals
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .fold(payload.to_string(), |acc, (_, remove)| remove(&acc));
        if variant != payload && !variants.contains(&variant) {
            variants.push(variant);
        }
    }

    variants
        .iter()
        .map(|variant| sha256_hex(variant.as_bytes()))
        .collect()
}

// ─── Removals ────────────────────────────────────────────────────────────────

/// Remove every occurrence of `"<field>":<value>` together with its separating comma.
/// Without a compiled pattern the payload is left as is and yields no variant.
fn remove_field(json: &str, pattern: Option<&Regex>) -> String {
    match pattern {
        Some(re) => re.replace_all(json, "").into_owned(),
        None => json.to_string(),
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(error = %e, "legacy field pattern failed to compile");
            None
        }
    }
}

fn field_regex(field: &str, value: &str) -> Option<Regex> {
    // `,"f":v` (not first member) or `"f":v,` (first member, followed by more) or
    // a lone `"f":v`.
    compile(&format!(
        r#",\s*"{field}"\s*:\s*{value}|"{field}"\s*:\s*{value}\s*,|"{field}"\s*:\s*{value}"#
    ))
}

fn remove_contract_type(json: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE.get_or_init(|| field_regex("contractType", JSON_STRING));
    remove_field(json, re.as_ref())
}

fn remove_linked_address_labels(json: &str) -> String {
    static SECTION: OnceLock<Option<Regex>> = OnceLock::new();
    static LABEL: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(section) = SECTION.get_or_init(|| compile(LINKED_ADDRESSES_SECTION)) else {
        return json.to_string();
    };
    let label = LABEL.get_or_init(|| field_regex("label", JSON_STRING));

    section
        .replace_all(json, |caps: &regex::Captures<'_>| {
            remove_field(&caps[0], label.as_ref())
        })
        .into_owned()
}

fn remove_is_nft(json: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE.get_or_init(|| field_regex("isNFT", "(?:true|false|null)"));
    remove_field(json, re.as_ref())
}

fn remove_kind_type(json: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE.get_or_init(|| field_regex("kindType", JSON_STRING));
    remove_field(json, re.as_ref())
}
