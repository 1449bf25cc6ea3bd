//! Conversion: WhitelistedAssetDto → SignedEnvelope, AssetPayload → WhitelistedAsset.

use super::wire::{AssetPayload, WhitelistedAssetDto};
use super::WhitelistedAsset;
use crate::error::WhitelistError;
use crate::integrity::envelope::SignedEnvelope;

impl TryFrom<&WhitelistedAssetDto> for SignedEnvelope {
    type Error = WhitelistError;

    fn try_from(dto: &WhitelistedAssetDto) -> Result<Self, Self::Error> {
        SignedEnvelope::from_parts(
            dto.metadata.as_ref(),
            dto.signed_contract_address.as_ref(),
            &dto.trails,
        )
    }
}

impl WhitelistedAsset {
    pub(crate) fn from_verified(id: &str, envelope: &SignedEnvelope, payload: AssetPayload) -> Self {
        Self {
            id: id.to_string(),
            verified_hash: envelope.hash.clone(),
            blockchain: payload.blockchain,
            network: payload.network,
            name: payload.name,
            symbol: payload.symbol,
            contract_address: payload.contract_address,
            decimals: payload.decimals,
            token_id: payload.token_id,
            kind_type: payload.kind_type,
            is_nft: payload.is_nft,
        }
    }
}
