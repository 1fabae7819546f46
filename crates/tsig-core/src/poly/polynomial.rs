//! Secret polynomials and their public commitments

use ff::PrimeField;
use group::Group;
use rand_core::{CryptoRng, RngCore};

use crate::curve::{evaluation_point, random_scalar, sum_points, CurveGroup};
use crate::{Error, Result, ShareIndex, MAX_PARTIES};

#[cfg(feature = "multi-thread")]
use rayon::prelude::*;

/// Evaluation of a secret polynomial at `index + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateShare<S: PrimeField> {
    pub index: ShareIndex,
    pub value: S,
}

/// Evaluation of a public commitment at `index + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicShare<G: Group> {
    pub index: ShareIndex,
    pub value: G,
}

/// Indices `0..n`; every index must fit the wire format
fn share_indices(n_parties: usize) -> Result<Vec<ShareIndex>> {
    if n_parties > MAX_PARTIES {
        return Err(Error::InvalidConfig(format!(
            "At most {} parties are supported, got {}",
            MAX_PARTIES, n_parties
        )));
    }
    Ok((0..n_parties).map(|i| i as ShareIndex).collect())
}

/// Random polynomial of degree `t - 1` whose constant term is the secret
#[derive(Clone)]
pub struct Polynomial<S: PrimeField> {
    coefficients: Vec<S>,
}

impl<S: PrimeField> Polynomial<S> {
    /// Build a polynomial with `threshold` coefficients around `secret`
    pub fn random<R>(threshold: usize, secret: S, rng: &mut R) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        if threshold == 0 {
            return Err(Error::InvalidConfig(
                "Polynomial needs at least one coefficient".into(),
            ));
        }

        let mut coefficients = Vec::with_capacity(threshold);
        coefficients.push(secret);
        for _ in 1..threshold {
            coefficients.push(random_scalar(rng)?);
        }

        Ok(Self { coefficients })
    }

    /// Number of coefficients (t)
    pub fn threshold(&self) -> usize {
        self.coefficients.len()
    }

    /// The shared secret
    pub fn secret(&self) -> &S {
        &self.coefficients[0]
    }

    pub fn coefficients(&self) -> &[S] {
        &self.coefficients
    }

    /// Horner evaluation at `index + 1`
    pub fn evaluate(&self, index: ShareIndex) -> PrivateShare<S> {
        let x: S = evaluation_point(index);
        let value = self
            .coefficients
            .iter()
            .rev()
            .fold(S::ZERO, |acc, coef| acc * x + coef);

        PrivateShare { index, value }
    }

    /// Shares for indices `0..n`
    pub fn shares(&self, n_parties: usize) -> Result<Vec<PrivateShare<S>>> {
        let indices = share_indices(n_parties)?;

        #[cfg(feature = "multi-thread")]
        let shares = indices.par_iter().map(|&i| self.evaluate(i)).collect();
        #[cfg(not(feature = "multi-thread"))]
        let shares = indices.iter().map(|&i| self.evaluate(i)).collect();

        Ok(shares)
    }

    /// Multiply every coefficient by `base`
    pub fn commit<G>(&self, base: &G) -> PublicCommitment<G>
    where
        G: CurveGroup<Scalar = S>,
    {
        PublicCommitment {
            points: self.coefficients.iter().map(|coef| *base * coef).collect(),
        }
    }
}

impl<S: PrimeField> std::fmt::Debug for Polynomial<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Polynomial")
            .field("threshold", &self.coefficients.len())
            .finish_non_exhaustive()
    }
}

/// Point-domain image of a [`Polynomial`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicCommitment<G: Group> {
    points: Vec<G>,
}

impl<G: CurveGroup> PublicCommitment<G> {
    /// Wrap commitment points received from elsewhere
    pub fn from_points(points: Vec<G>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::InvalidConfig("Empty commitment".into()));
        }
        Ok(Self { points })
    }

    /// Number of committed coefficients (t)
    pub fn threshold(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[G] {
        &self.points
    }

    /// Commitment to the secret, i.e. the group public key
    pub fn public_key(&self) -> G {
        self.points[0]
    }

    /// Horner evaluation at `index + 1`
    pub fn evaluate(&self, index: ShareIndex) -> PublicShare<G> {
        let x: G::Scalar = evaluation_point(index);
        let value = self
            .points
            .iter()
            .rev()
            .fold(G::identity(), |acc, point| acc * x + point);

        PublicShare { index, value }
    }

    /// Public shares for indices `0..n`
    pub fn shares(&self, n_parties: usize) -> Result<Vec<PublicShare<G>>> {
        Ok(share_indices(n_parties)?
            .into_iter()
            .map(|i| self.evaluate(i))
            .collect())
    }

    /// Check `base * share.value == self.evaluate(share.index)`
    pub fn verify_share(&self, share: &PrivateShare<G::Scalar>, base: &G) -> bool {
        *base * share.value == self.evaluate(share.index).value
    }

    /// Coefficient-wise sum with another commitment of the same size
    pub fn add(&self, other: &Self) -> Result<Self> {
        if self.points.len() != other.points.len() {
            return Err(Error::InvalidConfig(format!(
                "Commitment sizes differ: {} and {}",
                self.points.len(),
                other.points.len()
            )));
        }

        Ok(Self {
            points: self
                .points
                .iter()
                .zip(&other.points)
                .map(|(a, b)| *a + b)
                .collect(),
        })
    }

    /// Canonical encoding of every point
    pub fn to_bytes(&self) -> Vec<Vec<u8>> {
        self.points.iter().map(|point| point.encode_point()).collect()
    }

    /// Decode commitment points
    pub fn from_bytes(encoded: &[Vec<u8>]) -> Result<Self> {
        let points = encoded
            .iter()
            .map(|bytes| G::decode_point(bytes))
            .collect::<Result<Vec<_>>>()?;
        Self::from_points(points)
    }
}

/// Coefficient-wise sum of commitments from different contributors
pub fn add_commitments<G: CurveGroup>(commitments: &[PublicCommitment<G>]) -> Result<PublicCommitment<G>> {
    let first = commitments
        .first()
        .ok_or_else(|| Error::InvalidConfig("No commitments to add".into()))?;
    let threshold = first.threshold();

    if let Some(bad) = commitments.iter().find(|c| c.threshold() != threshold) {
        return Err(Error::InvalidConfig(format!(
            "Commitment sizes differ: {} and {}",
            threshold,
            bad.threshold()
        )));
    }

    let points = (0..threshold)
        .map(|k| {
            let column: Vec<G> = commitments.iter().map(|c| c.points[k]).collect();
            sum_points(&column)
        })
        .collect();

    Ok(PublicCommitment { points })
}

/// Sum of private shares at the same index from different contributors
pub fn add_private_shares<S: PrimeField>(shares: &[PrivateShare<S>]) -> Result<PrivateShare<S>> {
    let first = shares
        .first()
        .ok_or_else(|| Error::InvalidConfig("No shares to add".into()))?;

    if let Some(bad) = shares.iter().find(|s| s.index != first.index) {
        return Err(Error::InvalidShare {
            index: bad.index as usize,
        });
    }

    Ok(PrivateShare {
        index: first.index,
        value: shares.iter().map(|s| s.value).sum(),
    })
}
