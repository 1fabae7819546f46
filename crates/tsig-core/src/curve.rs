//! Curve group capability
//!
//! Both signing families only need a prime-order group with a base point,
//! point addition, scalar multiplication and a canonical byte encoding. The
//! `group` and `ff` traits already describe exactly that, and both
//! `k256::ProjectivePoint` and the `bls12_381` projective groups implement
//! them, so [`CurveGroup`] is a thin extension with encoding helpers.

use ff::PrimeField;
use group::{Group, GroupEncoding};
use rand_core::{CryptoRng, RngCore};

use crate::{Error, Result, ShareIndex};

#[cfg(feature = "multi-thread")]
use rayon::prelude::*;

/// Rejection-sampling attempts before a source is considered broken
const MAX_SAMPLING_ATTEMPTS: usize = 64;

/// Prime-order group used for commitments, public keys and signatures
pub trait CurveGroup: Group + GroupEncoding {
    /// The group base point
    fn base_point() -> Self {
        Self::generator()
    }

    /// Canonical (compressed) encoding of the point
    fn encode_point(&self) -> Vec<u8> {
        self.to_bytes().as_ref().to_vec()
    }

    /// Decode a point from its canonical encoding
    fn decode_point(bytes: &[u8]) -> Result<Self> {
        let mut repr = <Self as GroupEncoding>::Repr::default();
        if repr.as_ref().len() != bytes.len() {
            return Err(Error::Deserialization(format!(
                "Invalid point length: expected {}, got {}",
                repr.as_ref().len(),
                bytes.len()
            )));
        }
        repr.as_mut().copy_from_slice(bytes);

        Option::<Self>::from(Self::from_bytes(&repr))
            .ok_or_else(|| Error::Deserialization("Invalid point encoding".into()))
    }
}

impl<G: Group + GroupEncoding> CurveGroup for G {}

/// Canonical encoding of a scalar
pub fn encode_scalar<S: PrimeField>(scalar: &S) -> Vec<u8> {
    scalar.to_repr().as_ref().to_vec()
}

/// Decode a canonical scalar; values outside `[0, N)` are rejected
pub fn decode_scalar<S: PrimeField>(bytes: &[u8]) -> Result<S> {
    let mut repr = S::Repr::default();
    if repr.as_ref().len() != bytes.len() {
        return Err(Error::Deserialization(format!(
            "Invalid scalar length: expected {}, got {}",
            repr.as_ref().len(),
            bytes.len()
        )));
    }
    repr.as_mut().copy_from_slice(bytes);

    Option::<S>::from(S::from_repr(repr))
        .ok_or_else(|| Error::Deserialization("Scalar is not reduced".into()))
}

/// Draw a uniformly random non-zero scalar.
///
/// Failures of the source are returned as [`Error::RandomnessFailure`]; there
/// is no fallback to another source.
pub fn random_scalar<S, R>(rng: &mut R) -> Result<S>
where
    S: PrimeField,
    R: RngCore + CryptoRng + ?Sized,
{
    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        let mut repr = S::Repr::default();
        rng.try_fill_bytes(repr.as_mut())?;

        if let Some(scalar) = Option::<S>::from(S::from_repr(repr)) {
            if !bool::from(scalar.is_zero()) {
                return Ok(scalar);
            }
        }
    }

    Err(Error::RandomnessFailure(
        "Randomness source keeps producing out-of-range values".into(),
    ))
}

/// Evaluation point of a share index: `x = index + 1`, never zero
pub fn evaluation_point<S: PrimeField>(index: ShareIndex) -> S {
    S::from(u64::from(index) + 1)
}

/// Order-independent sum of points
#[cfg(feature = "multi-thread")]
pub fn sum_points<G: Group>(points: &[G]) -> G {
    points
        .par_iter()
        .copied()
        .reduce(G::identity, |acc, point| acc + point)
}

/// Order-independent sum of points
#[cfg(not(feature = "multi-thread"))]
pub fn sum_points<G: Group>(points: &[G]) -> G {
    points.iter().sum()
}
