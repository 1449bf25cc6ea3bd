//! End-to-end tests for the trust layer, through the public API only.
//!
//! A SuperAdmin-signed rules container is built and verified, then whitelisted
//! addresses are checked against it both directly and through the rules cache.
//!
//! Run with:
//! ```bash
//! cargo test -p custody-sdk --test trust_layer
//! ```

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures_util::FutureExt;
use p256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use serde_json::json;

use custody_sdk::auth::{RequestParts, RequestSigner};
use custody_sdk::crypto::{self, sha256_hex, PrivateKeyMaterial, PublicKeyMaterial};
use custody_sdk::domain::address::wire::WhitelistedAddressDto;
use custody_sdk::error::{IntegrityError, SdkError, VerificationStep};
use custody_sdk::governance::{
    verify_governance_rules, GovernanceRules, JsonRulesContainerDecoder, RuleUserSignature,
    RulesContainerCache, VerifiedRulesContainer,
};
use custody_sdk::integrity::{sign_hashes, verify_address_with, WhitelistIntegrityVerifier};

const PAYLOAD: &str = r#"{"currency":"ETH","network":"mainnet","address":"0x9f2d1c3b4a5e6f708192a3b4c5d6e7f801234567","memo":"","label":"cold storage","customerId":"cust-17","addressType":"individual","linkedInternalAddresses":[]}"#;

struct World {
    super_admins: Vec<PrivateKeyMaterial>,
    approvers: Vec<PrivateKeyMaterial>,
    rules: GovernanceRules,
}

fn random_key() -> PrivateKeyMaterial {
    PrivateKeyMaterial::from(SigningKey::random(&mut OsRng))
}

fn public_keys(keys: &[PrivateKeyMaterial]) -> Vec<PublicKeyMaterial> {
    keys.iter().map(PrivateKeyMaterial::public_key).collect()
}

/// Two SuperAdmins sign a container with two approvers and one HSM slot.
/// ETH/mainnet addresses need both approvers.
fn world() -> World {
    let super_admins = vec![random_key(), random_key()];
    let approvers = vec![random_key(), random_key()];
    let hsm = random_key();

    let pem = |k: &PrivateKeyMaterial| k.public_key().to_pem().unwrap();
    let container = json!({
        "users": [
            {"id": "alice", "publicKey": pem(&approvers[0]), "roles": ["ADMIN"]},
            {"id": "bob", "publicKey": pem(&approvers[1]), "roles": ["ADMIN"]},
            {"id": "hsm-1", "publicKey": pem(&hsm), "roles": ["HSMSLOT"]}
        ],
        "groups": [
            {"id": "approvers", "userIds": ["alice", "bob"]}
        ],
        "addressWhitelistingRules": [
            {
                "currency": "ETH",
                "network": "mainnet",
                "parallelThresholds": [
                    {"thresholds": [{"groupId": "approvers", "minimumSignatures": 2}]}
                ]
            }
        ],
        "minimumDistinctUserCount": 2,
        "timestamp": 1_700_000_000
    });
    let bytes = serde_json::to_vec(&container).unwrap();

    let rules = GovernanceRules {
        rules_container: BASE64.encode(&bytes),
        rules_signatures: super_admins
            .iter()
            .enumerate()
            .map(|(i, k)| RuleUserSignature {
                user_id: format!("superadmin-{i}"),
                signature: crypto::sign(k, &bytes).unwrap(),
            })
            .collect(),
        ..Default::default()
    };

    World {
        super_admins,
        approvers,
        rules,
    }
}

fn verified(world: &World) -> VerifiedRulesContainer {
    verify_governance_rules(
        &world.rules,
        &public_keys(&world.super_admins),
        2,
        &JsonRulesContainerDecoder,
    )
    .unwrap()
}

fn address_dto(world: &World) -> WhitelistedAddressDto {
    let hash = sha256_hex(PAYLOAD.as_bytes());
    let signatures: Vec<_> = world
        .approvers
        .iter()
        .zip(["alice", "bob"])
        .map(|(key, user)| {
            json!({
                "signature": {"userId": user, "signature": sign_hashes(key, &[hash.as_str()]).unwrap()},
                "hashes": [hash]
            })
        })
        .collect();

    serde_json::from_value(json!({
        "id": "8812",
        "blockchain": "ETH",
        "network": "mainnet",
        "status": "APPROVED",
        "rule": "eth-mainnet",
        "metadata": {"hash": hash, "payloadAsString": PAYLOAD},
        "signedAddress": {"signatures": signatures},
        "trails": [
            {"action": "created", "date": "2024-03-01T09:30:00Z", "comment": ""},
            {"action": "approved", "date": "2024-03-01T10:00:00Z", "comment": "ok"}
        ]
    }))
    .unwrap()
}

fn flip_first_byte(signature_b64: &str) -> String {
    let mut raw = BASE64.decode(signature_b64).unwrap();
    raw[0] ^= 0x01;
    BASE64.encode(raw)
}

#[test]
fn tpv1_header_is_exact() {
    let signer = RequestSigner::new(
        "3e9c4c0d-9c1e-4a49-8f0c-7b1c2d3e4f50",
        "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
    )
    .unwrap();
    let parts = RequestParts {
        method: "GET",
        host: "api.custody.example",
        path: "/api/rest/v1/whitelisted_addresses",
        query: Some("blockchain=ETH&limit=50"),
        content_type: None,
        body: None,
    };

    let header = signer
        .sign_at("6f1a2b3c-4d5e-4f60-8a7b-9c0d1e2f3a4b", 1_700_000_000_000, &parts)
        .unwrap();

    assert_eq!(
        header,
        "TPV1-HMAC-SHA256 ApiKey=3e9c4c0d-9c1e-4a49-8f0c-7b1c2d3e4f50 \
         Nonce=6f1a2b3c-4d5e-4f60-8a7b-9c0d1e2f3a4b Timestamp=1700000000000 \
         Signature=tYLrqMImdnfKE+bxzyFZfkVADPG39DmjhhdUzKfw83E="
    );
}

#[test]
fn governance_rules_need_enough_super_admins() {
    let world = world();
    let container = verified(&world);
    assert_eq!(container.valid_signatures(), 2);
    assert_eq!(container.hsm_public_keys().len(), 1);
    assert_eq!(container.minimum_distinct_user_count, 2);

    let mut one_bad = world.rules.clone();
    one_bad.rules_signatures[1].signature = flip_first_byte(&one_bad.rules_signatures[1].signature);
    let err = verify_governance_rules(
        &one_bad,
        &public_keys(&world.super_admins),
        2,
        &JsonRulesContainerDecoder,
    )
    .unwrap_err();
    assert_eq!(
        err.as_integrity(),
        Some(&IntegrityError::InsufficientSignatures {
            valid: 1,
            required: 2
        })
    );

    // Signatures from unknown keys do not count.
    let strangers = vec![random_key(), random_key()];
    assert!(verify_governance_rules(
        &world.rules,
        &public_keys(&strangers),
        1,
        &JsonRulesContainerDecoder,
    )
    .is_err());
}

#[test]
fn crafted_envelope_verifies() {
    let world = world();
    let container = verified(&world);

    let address = verify_address_with(&container, &address_dto(&world)).unwrap();
    assert_eq!(address.id, "8812");
    assert_eq!(
        address.address.as_deref(),
        Some("0x9f2d1c3b4a5e6f708192a3b4c5d6e7f801234567")
    );
    assert_eq!(address.label.as_deref(), Some("cold storage"));
    assert_eq!(address.customer_id.as_deref(), Some("cust-17"));
    assert_eq!(address.status.as_deref(), Some("APPROVED"));
    assert_eq!(
        address.created_at.map(|d| d.timestamp()),
        Some(1_709_285_400)
    );
}

#[test]
fn flipped_signature_byte_is_rejected() {
    let world = world();
    let container = verified(&world);

    let mut dto = address_dto(&world);
    let record = &mut dto.signed_address.as_mut().unwrap().signatures[1];
    let sig = record.signature.as_mut().unwrap();
    sig.signature = flip_first_byte(&sig.signature);

    let err = verify_address_with(&container, &dto).unwrap_err();
    let integrity = err.as_integrity().expect("integrity error");
    assert_eq!(integrity, &IntegrityError::ThresholdNotMet);
    assert_eq!(integrity.step(), VerificationStep::SignatureThresholds);
}

#[test]
fn dto_fields_never_override_payload() {
    let world = world();
    let container = verified(&world);

    let mut dto = address_dto(&world);
    dto.blockchain = Some("BTC".to_string());
    dto.network = Some("testnet".to_string());

    let address = verify_address_with(&container, &dto).unwrap();
    assert_eq!(address.blockchain.as_deref(), Some("ETH"));
    assert_eq!(address.network.as_deref(), Some("mainnet"));
}

#[tokio::test]
async fn verifier_uses_cached_container() {
    let world = Arc::new(world());
    let fetches = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let cache = RulesContainerCache::new(Duration::from_secs(60), {
        let world = Arc::clone(&world);
        let fetches = Arc::clone(&fetches);
        move || {
            fetches.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let result = verify_governance_rules(
                &world.rules,
                &public_keys(&world.super_admins),
                2,
                &JsonRulesContainerDecoder,
            )
            .map(Some);
            async move { result }.boxed()
        }
    })
    .unwrap();
    let verifier = WhitelistIntegrityVerifier::new(Arc::new(cache));

    let dto = address_dto(&world);
    let (a, b) = tokio::join!(verifier.verify_address(&dto), verifier.verify_address(&dto));
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 1);

    let listed = verifier.verify_addresses(&[dto.clone(), dto]).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unverifiable_rules_never_reach_the_cache() {
    let world = Arc::new(world());
    let cache = RulesContainerCache::new(Duration::from_secs(60), {
        let world = Arc::clone(&world);
        move || {
            let strangers = public_keys(&[random_key()]);
            let result = verify_governance_rules(&world.rules, &strangers, 1, &JsonRulesContainerDecoder)
                .map(Some);
            async move { result }.boxed()
        }
    })
    .unwrap();

    let err = cache.get().await.unwrap_err();
    assert!(matches!(err, SdkError::RulesRefresh(_)));
    assert!(matches!(
        err.as_integrity(),
        Some(IntegrityError::InsufficientSignatures { valid: 0, .. })
    ));
    assert!(!cache.is_valid().await);
}
