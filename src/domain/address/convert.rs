//! Conversion: WhitelistedAddressDto → SignedEnvelope, AddressPayload → WhitelistedAddress.

use super::wire::{AddressPayload, LinkedAddressPayload, WhitelistedAddressDto};
use super::{LinkedAddress, WhitelistedAddress, CREATED_TRAIL_ACTION};
use crate::error::WhitelistError;
use crate::integrity::envelope::SignedEnvelope;
use chrono::{DateTime, Utc};

impl TryFrom<&WhitelistedAddressDto> for SignedEnvelope {
    type Error = WhitelistError;

    fn try_from(dto: &WhitelistedAddressDto) -> Result<Self, Self::Error> {
        SignedEnvelope::from_parts(dto.metadata.as_ref(), dto.signed_address.as_ref(), &dto.trails)
    }
}

impl From<LinkedAddressPayload> for LinkedAddress {
    fn from(p: LinkedAddressPayload) -> Self {
        Self {
            id: p.id,
            address: p.address,
            label: p.label,
        }
    }
}

impl WhitelistedAddress {
    /// Build from a verified payload, then attach the unsigned metadata.
    pub(crate) fn from_verified(
        dto: &WhitelistedAddressDto,
        envelope: &SignedEnvelope,
        payload: AddressPayload,
    ) -> Self {
        Self {
            id: dto.id.clone(),
            verified_hash: envelope.hash.clone(),
            blockchain: payload.blockchain,
            network: payload.network,
            address: payload.address,
            memo: payload.memo,
            label: payload.label,
            customer_id: payload.customer_id,
            address_type: payload.address_type,
            exchange_account_id: payload.exchange_account_id,
            contract_type: payload.contract_type,
            linked_internal_addresses: payload
                .linked_internal_addresses
                .into_iter()
                .map(LinkedAddress::from)
                .collect(),
            status: dto.status.clone(),
            rule: dto.rule.clone(),
            created_at: envelope
                .trail_date(CREATED_TRAIL_ACTION)
                .and_then(parse_date),
        }
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
