//! Per-party session record

use std::fmt;

use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use tracing::debug;

use super::aggregate::{challenge, derive_nonce, has_even_y, partial_signature, x_coordinate};
use crate::curve::{decode_scalar, random_scalar};
use crate::{Error, PartyId, Result};

/// Nonce committed for one message
#[derive(Clone)]
struct Nonce {
    k0: Scalar,
    point: ProjectivePoint,
    message: Vec<u8>,
}

/// Key material and transient signing state of one participant.
///
/// A nonce is consumed by [`SchnorrParty::sign`]; signing again needs a new
/// [`SchnorrParty::commit_nonce`].
#[derive(Clone)]
pub struct SchnorrParty {
    id: PartyId,
    secret: Scalar,
    public: ProjectivePoint,
    nonce: Option<Nonce>,
    partial: Option<Scalar>,
}

impl SchnorrParty {
    /// Create a party from a non-zero secret key
    pub fn new(id: PartyId, secret: Scalar) -> Result<Self> {
        if bool::from(secret.is_zero()) {
            return Err(Error::InvalidConfig("Secret key must not be zero".into()));
        }

        Ok(Self {
            id,
            secret,
            public: ProjectivePoint::GENERATOR * secret,
            nonce: None,
            partial: None,
        })
    }

    /// Create a party from a 32-byte big-endian secret key in `[1, N)`
    pub fn from_bytes(id: PartyId, bytes: &[u8]) -> Result<Self> {
        let secret = decode_scalar(bytes)
            .map_err(|e| Error::InvalidConfig(format!("Invalid secret key: {}", e)))?;
        Self::new(id, secret)
    }

    /// Create a party with a fresh random key
    pub fn random<R>(id: PartyId, rng: &mut R) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        Self::new(id, random_scalar(rng)?)
    }

    pub fn id(&self) -> PartyId {
        self.id
    }

    pub fn public_key(&self) -> ProjectivePoint {
        self.public
    }

    /// Nonce point of the current session, if one was committed
    pub fn nonce_point(&self) -> Option<ProjectivePoint> {
        self.nonce.as_ref().map(|n| n.point)
    }

    /// This party's partial signature from the last [`SchnorrParty::sign`]
    pub fn partial_signature(&self) -> Option<Scalar> {
        self.partial
    }

    /// Derive `k0 = H(d || m)` and return the nonce point `R_i = k0 * G`
    pub fn commit_nonce(&mut self, message: &[u8]) -> Result<ProjectivePoint> {
        let k0 = derive_nonce(&self.secret, message)?;
        let point = ProjectivePoint::GENERATOR * k0;

        debug!(
            party_id = self.id,
            nonce_point = hex::encode(x_coordinate(&point)?),
            "Nonce committed"
        );

        self.nonce = Some(Nonce {
            k0,
            point,
            message: message.to_vec(),
        });
        self.partial = None;
        Ok(point)
    }

    /// Produce the partial signature for the committed message.
    ///
    /// The nonce sign is reconciled against the aggregate nonce: when it has
    /// odd y every party negates its `k0`, so the signature is valid for the
    /// even-y point with the same x coordinate.
    pub fn sign(
        &mut self,
        aggregate_nonce: &ProjectivePoint,
        aggregate_key: &ProjectivePoint,
    ) -> Result<Scalar> {
        let negate = !has_even_y(aggregate_nonce)?;
        let e = {
            let nonce = self.nonce.as_ref().ok_or(Error::InvalidState {
                expected: "nonce committed",
                actual: "no nonce",
            })?;
            challenge(&x_coordinate(aggregate_nonce)?, aggregate_key, &nonce.message)?
        };
        self.respond(negate, &e)
    }

    /// Consume the nonce and answer challenge `e`
    pub(super) fn respond(&mut self, negate: bool, e: &Scalar) -> Result<Scalar> {
        let nonce = self.nonce.take().ok_or(Error::InvalidState {
            expected: "nonce committed",
            actual: "no nonce",
        })?;

        let s = partial_signature(&nonce.k0, negate, e, &self.secret);
        self.partial = Some(s);
        Ok(s)
    }
}

impl fmt::Debug for SchnorrParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchnorrParty")
            .field("id", &self.id)
            .field("public", &self.public)
            .field("has_nonce", &self.nonce.is_some())
            .finish_non_exhaustive()
    }
}
