//! Threshold signing session: collect, verify, recover

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use super::{SchemeScalar, ThresholdScheme};
use crate::codec::SignatureShare;
use crate::poly::{recover_commit, PrivateShare, PublicCommitment, PublicShare};
use crate::{CurveGroup, Error, Result, ShareIndex, ThresholdParams};

/// Partial signature of one key share
pub fn sign_share<C: ThresholdScheme>(
    share: &PrivateShare<SchemeScalar<C>>,
    message: &[u8],
) -> Result<SignatureShare> {
    let signature = C::sign(&share.value, message)?;
    Ok(SignatureShare::new(share.index, signature.encode_point()))
}

/// Check a partial signature against the public key share at `index`
pub fn verify_share<C: ThresholdScheme>(
    commitment: &PublicCommitment<C::Public>,
    index: ShareIndex,
    message: &[u8],
    signature: &[u8],
) -> bool {
    let Ok(point) = C::Signature::decode_point(signature) else {
        return false;
    };
    let public_share = commitment.evaluate(index);
    C::verify(&public_share.value, message, &point)
}

/// Lagrange recovery of the group signature from verified partial signatures
pub fn recover_signature<C: ThresholdScheme>(
    verified: &[PublicShare<C::Signature>],
    params: &ThresholdParams,
) -> Result<C::Signature> {
    recover_commit(verified, params.threshold)
}

/// Check the recovered signature against the group public key
pub fn verify_aggregate<C: ThresholdScheme>(
    public_key: &C::Public,
    message: &[u8],
    signature: &C::Signature,
) -> Result<()> {
    if C::verify(public_key, message, signature) {
        Ok(())
    } else {
        Err(Error::VerificationFailed(
            "Aggregate signature does not verify against the group key".into(),
        ))
    }
}

/// Verify every encoded share and recover the group signature.
///
/// The first share that fails to decode or verify aborts recovery with
/// [`Error::InvalidShare`].
#[instrument(skip_all, fields(threshold = params.threshold, shares = encoded.len()))]
pub fn recover_from_shares<C: ThresholdScheme>(
    commitment: &PublicCommitment<C::Public>,
    message: &[u8],
    encoded: &[Vec<u8>],
    params: &ThresholdParams,
) -> Result<C::Signature> {
    let mut session = ThresholdSession::<C>::new(*params, commitment.clone(), message)?;
    for bytes in encoded {
        session.add_encoded(bytes)?;
    }
    session.verify_shares()?;
    session.recover()
}

/// Phase of a [`ThresholdSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    SharesCollected,
    Verified,
    Recovered,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::SharesCollected => "SharesCollected",
            SessionState::Verified => "Verified",
            SessionState::Recovered => "Recovered",
        }
    }
}

/// One signing session on the recovering side.
///
/// `Idle -> SharesCollected -> Verified -> Recovered`. Adding or excluding a
/// share after verification drops back to `SharesCollected`, so recovery only
/// ever sees a fully verified share set.
pub struct ThresholdSession<C: ThresholdScheme> {
    params: ThresholdParams,
    commitment: PublicCommitment<C::Public>,
    message: Vec<u8>,
    collected: Vec<SignatureShare>,
    verified: Vec<PublicShare<C::Signature>>,
    signature: Option<C::Signature>,
    state: SessionState,
}

impl<C: ThresholdScheme> ThresholdSession<C> {
    /// Start a session for `message` under the group commitment
    pub fn new(
        params: ThresholdParams,
        commitment: PublicCommitment<C::Public>,
        message: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        params.validate()?;
        if commitment.threshold() != params.threshold {
            return Err(Error::InvalidConfig(format!(
                "Commitment has {} coefficients, threshold is {}",
                commitment.threshold(),
                params.threshold
            )));
        }

        Ok(Self {
            params,
            commitment,
            message: message.into(),
            collected: Vec::new(),
            verified: Vec::new(),
            signature: None,
            state: SessionState::Idle,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn params(&self) -> &ThresholdParams {
        &self.params
    }

    /// Indices of collected shares, in arrival order
    pub fn indices(&self) -> Vec<ShareIndex> {
        self.collected.iter().map(|s| s.index).collect()
    }

    /// Recovered signature, once the session reached `Recovered`
    pub fn signature(&self) -> Option<&C::Signature> {
        self.signature.as_ref()
    }

    fn expect_state(&self, allowed: &[SessionState], expected: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected,
                actual: self.state.name(),
            })
        }
    }

    /// Admit a share for later verification
    pub fn add_share(&mut self, share: SignatureShare) -> Result<()> {
        self.expect_state(
            &[
                SessionState::Idle,
                SessionState::SharesCollected,
                SessionState::Verified,
            ],
            "Idle, SharesCollected or Verified",
        )?;

        if share.index as usize >= self.params.n_parties {
            warn!(index = share.index, "Share index out of range");
            return Err(Error::InvalidShare {
                index: share.index as usize,
            });
        }
        if self.collected.iter().any(|s| s.index == share.index) {
            return Err(Error::DuplicateIndex {
                index: share.index as usize,
            });
        }

        debug!(index = share.index, "Share collected");
        self.collected.push(share);
        self.verified.clear();
        self.state = SessionState::SharesCollected;
        Ok(())
    }

    /// Decode a wire share and admit it
    pub fn add_encoded(&mut self, bytes: &[u8]) -> Result<()> {
        self.add_share(SignatureShare::from_bytes(bytes)?)
    }

    /// Drop the share of a party, e.g. after it failed verification
    pub fn exclude(&mut self, index: ShareIndex) -> Result<()> {
        self.expect_state(
            &[SessionState::SharesCollected, SessionState::Verified],
            "SharesCollected or Verified",
        )?;

        let before = self.collected.len();
        self.collected.retain(|s| s.index != index);
        if self.collected.len() == before {
            return Err(Error::InvalidConfig(format!("No share with index {}", index)));
        }

        self.verified.clear();
        self.state = if self.collected.is_empty() {
            SessionState::Idle
        } else {
            SessionState::SharesCollected
        };
        Ok(())
    }

    /// Verify every collected share against the group commitment.
    ///
    /// Any failure aborts with the failing index; nothing is admitted to
    /// recovery unless all shares pass.
    pub fn verify_shares(&mut self) -> Result<()> {
        self.expect_state(&[SessionState::SharesCollected], "SharesCollected")?;

        let mut verified = Vec::with_capacity(self.collected.len());
        for share in &self.collected {
            let public_share = self.commitment.evaluate(share.index);
            let point = C::Signature::decode_point(&share.payload)
                .ok()
                .filter(|point| C::verify(&public_share.value, &self.message, point));

            match point {
                Some(value) => verified.push(PublicShare {
                    index: share.index,
                    value,
                }),
                None => {
                    warn!(index = share.index, "Signature share failed verification");
                    return Err(Error::InvalidShare {
                        index: share.index as usize,
                    });
                }
            }
        }

        debug!(verified = verified.len(), "All collected shares verified");
        self.verified = verified;
        self.state = SessionState::Verified;
        Ok(())
    }

    /// Recover the group signature from the verified shares
    pub fn recover(&mut self) -> Result<C::Signature> {
        self.expect_state(&[SessionState::Verified], "Verified")?;

        let distinct: BTreeSet<ShareIndex> = self.verified.iter().map(|s| s.index).collect();
        if distinct.len() < self.params.threshold {
            return Err(Error::InsufficientShares {
                required: self.params.threshold,
                actual: distinct.len(),
            });
        }

        let signature = recover_signature::<C>(&self.verified, &self.params)?;

        info!(
            threshold = self.params.threshold,
            signers = ?distinct,
            signature = hex::encode(signature.encode_point()),
            "Group signature recovered"
        );

        self.signature = Some(signature);
        self.state = SessionState::Recovered;
        Ok(signature)
    }
}
