//! m-of-n multisignature with independent ECDSA keys
//!
//! Unlike the threshold schemes there is no shared key: each of the `n`
//! parties owns an ordinary secp256k1 key, and a message is accepted once
//! `m` distinct parties have signed it.

use std::collections::HashSet;

use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use tracing::{debug, warn};

use crate::{Error, PartyId, Result, ThresholdParams};

/// Public keys of all parties and the number of signatures required
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigPolicy {
    params: ThresholdParams,
    keys: Vec<VerifyingKey>,
}

impl MultisigPolicy {
    pub fn new(required: usize, keys: Vec<VerifyingKey>) -> Result<Self> {
        let params = ThresholdParams::new(required, keys.len())?;
        Ok(Self { params, keys })
    }

    /// Build a policy from SEC1-encoded public keys
    pub fn from_sec1_keys<K: AsRef<[u8]>>(required: usize, keys: &[K]) -> Result<Self> {
        let keys = keys
            .iter()
            .map(|key| {
                VerifyingKey::from_sec1_bytes(key.as_ref())
                    .map_err(|e| Error::Deserialization(format!("Invalid public key: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(required, keys)
    }

    pub fn required(&self) -> usize {
        self.params.threshold
    }

    pub fn keys(&self) -> &[VerifyingKey] {
        &self.keys
    }

    /// Deterministic (RFC 6979) ECDSA signature over SHA-256 of `message`
    pub fn sign(key: &SigningKey, message: &[u8]) -> Signature {
        key.sign(message)
    }

    /// Accept `message` if at least `required` distinct parties signed it.
    ///
    /// Every supplied signature must be valid; a bad one is reported rather
    /// than skipped.
    pub fn verify(&self, message: &[u8], signatures: &[(PartyId, Signature)]) -> Result<()> {
        let mut signers = HashSet::with_capacity(signatures.len());

        for (index, signature) in signatures {
            let index = *index;
            if !signers.insert(index) {
                return Err(Error::DuplicateIndex { index });
            }

            let key = self
                .keys
                .get(index)
                .ok_or(Error::InvalidShare { index })?;

            if key.verify(message, signature).is_err() {
                warn!(index, "Multisig signature rejected");
                return Err(Error::InvalidShare { index });
            }
            debug!(index, "Multisig signature accepted");
        }

        if signers.len() < self.params.threshold {
            return Err(Error::InsufficientShares {
                required: self.params.threshold,
                actual: signers.len(),
            });
        }
        Ok(())
    }
}
