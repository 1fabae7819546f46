//! Subset signing session

use k256::{ProjectivePoint, Scalar};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::aggregate::{
    aggregate_nonces, aggregate_public_keys, challenge, combine_partial_signatures, has_even_y,
    verify, verify_partial, x_coordinate, SchnorrSignature,
};
use super::party::SchnorrParty;
use crate::{CurveGroup, Error, PartyId, Result, SessionConfig};

#[cfg(feature = "multi-thread")]
use rayon::prelude::*;

/// Aggregated signature together with the subset that produced it.
///
/// Key aggregation is subset specific, so a verifier needs either the signer
/// list or the aggregate key to check against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetSignature {
    /// Signing parties, ascending
    pub signers: Vec<PartyId>,
    /// Compressed aggregate public key of `signers`
    pub aggregate_key: Vec<u8>,
    /// `(R.x, s)`
    pub signature: SchnorrSignature,
}

impl SubsetSignature {
    /// Decoded aggregate public key
    pub fn aggregate_key(&self) -> Result<ProjectivePoint> {
        ProjectivePoint::decode_point(&self.aggregate_key)
    }
}

/// Check the session against the parties it is run over
fn validate_session(parties: &[SchnorrParty], config: &SessionConfig) -> Result<()> {
    config.params.validate()?;

    if parties.len() != config.params.n_parties {
        return Err(Error::InvalidConfig(format!(
            "Expected {} parties, got {}",
            config.params.n_parties,
            parties.len()
        )));
    }
    if let Some((position, party)) = parties
        .iter()
        .enumerate()
        .find(|(position, party)| party.id() != *position)
    {
        return Err(Error::InvalidConfig(format!(
            "Party at position {} has ID {}",
            position,
            party.id()
        )));
    }
    if !config.participants.windows(2).all(|w| w[0] < w[1]) {
        return Err(Error::InvalidConfig(
            "Participants must be unique and ascending".into(),
        ));
    }
    if let Some(&id) = config
        .participants
        .iter()
        .find(|&&id| id >= config.params.n_parties)
    {
        return Err(Error::InvalidConfig(format!("Unknown participant {}", id)));
    }
    if config.participants.len() < config.params.threshold {
        return Err(Error::InsufficientShares {
            required: config.params.threshold,
            actual: config.participants.len(),
        });
    }
    Ok(())
}

/// Check every partial against its signer's key and nonce point.
///
/// `ids`, `keys`, `nonces` and `partials` are aligned by signer. The first
/// bad partial is reported by party ID.
fn check_partials(
    ids: &[PartyId],
    keys: &[ProjectivePoint],
    nonces: &[ProjectivePoint],
    partials: &[Scalar],
    negate: bool,
    e: &Scalar,
) -> Result<()> {
    for (((&id, key), nonce), partial) in ids.iter().zip(keys).zip(nonces).zip(partials) {
        if !verify_partial(partial, nonce, negate, e, key) {
            warn!(party_id = id, "Partial signature failed verification");
            return Err(Error::InvalidShare { index: id });
        }
    }
    Ok(())
}

/// Run nonce derivation, nonce aggregation, partial signing and aggregation
/// over the participants of `config`.
///
/// `parties[i]` must be party `i`. Parties outside the subset are left
/// untouched. The result is verified before it is returned.
#[instrument(
    skip(parties, config),
    fields(
        threshold = config.params.threshold,
        signers = config.participants.len()
    )
)]
pub fn sign_subset(
    parties: &mut [SchnorrParty],
    config: &SessionConfig,
) -> Result<SubsetSignature> {
    validate_session(parties, config)?;

    let mut signers: Vec<&mut SchnorrParty> = parties
        .iter_mut()
        .filter(|party| config.participants.binary_search(&party.id()).is_ok())
        .collect();

    // Phase 1: key aggregation over exactly this subset
    let keys: Vec<ProjectivePoint> = signers.iter().map(|p| p.public_key()).collect();
    let aggregate_key = aggregate_public_keys(&keys)?;
    debug!(
        aggregate_key = hex::encode(aggregate_key.encode_point()),
        "Public keys aggregated"
    );

    // Phase 2: per-party nonces
    #[cfg(feature = "multi-thread")]
    let nonces = signers
        .par_iter_mut()
        .map(|party| party.commit_nonce(&config.message))
        .collect::<Result<Vec<_>>>()?;
    #[cfg(not(feature = "multi-thread"))]
    let nonces = signers
        .iter_mut()
        .map(|party| party.commit_nonce(&config.message))
        .collect::<Result<Vec<_>>>()?;

    // Phase 3: nonce aggregation
    let aggregate_nonce = aggregate_nonces(&nonces)?;

    // Phase 4 and 5: challenge and partial signatures
    #[cfg(feature = "multi-thread")]
    let partials = signers
        .par_iter_mut()
        .map(|party| party.sign(&aggregate_nonce, &aggregate_key))
        .collect::<Result<Vec<_>>>()?;
    #[cfg(not(feature = "multi-thread"))]
    let partials = signers
        .iter_mut()
        .map(|party| party.sign(&aggregate_nonce, &aggregate_key))
        .collect::<Result<Vec<_>>>()?;

    let negate = !has_even_y(&aggregate_nonce)?;
    let e = challenge(&x_coordinate(&aggregate_nonce)?, &aggregate_key, &config.message)?;
    check_partials(&config.participants, &keys, &nonces, &partials, negate, &e)?;

    // Phase 6: aggregation
    let signature = combine_partial_signatures(&aggregate_nonce, &partials)?;

    if let Err(e) = verify(&aggregate_key, &config.message, &signature) {
        warn!(error = %e, "Aggregated signature failed verification");
        return Err(e);
    }

    info!(r = hex::encode(signature.r), "Subset signature produced");

    Ok(SubsetSignature {
        signers: config.participants.clone(),
        aggregate_key: aggregate_key.encode_point(),
        signature,
    })
}

/// Verify a subset signature against the full list of party public keys.
///
/// The aggregate key is recomputed from `signature.signers` and must match
/// the one carried by the signature.
pub fn verify_subset(
    public_keys: &[ProjectivePoint],
    signature: &SubsetSignature,
    message: &[u8],
) -> Result<()> {
    let mut keys = Vec::with_capacity(signature.signers.len());
    for (position, &id) in signature.signers.iter().enumerate() {
        if position > 0 && signature.signers[position - 1] >= id {
            return Err(Error::DuplicateIndex { index: id });
        }
        let key = public_keys
            .get(id)
            .ok_or(Error::InvalidShare { index: id })?;
        keys.push(*key);
    }

    let aggregate_key = aggregate_public_keys(&keys)?;
    if aggregate_key.encode_point() != signature.aggregate_key {
        return Err(Error::VerificationFailed(
            "Aggregate key does not match signers".into(),
        ));
    }

    verify(&aggregate_key, message, &signature.signature)
}
