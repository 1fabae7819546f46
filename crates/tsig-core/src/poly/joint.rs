//! Joint key setup from several contributors
//!
//! Every contributor shares its own random secret with a degree `t - 1`
//! polynomial. A party's combined key share is the sum of the shares it
//! received, which by linearity is a share of the sum of all secrets under
//! the summed commitment.

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument, warn};

use super::{add_commitments, add_private_shares, Polynomial, PrivateShare, PublicCommitment};
use crate::curve::{random_scalar, CurveGroup};
use crate::{Error, Result, ThresholdParams};

#[cfg(feature = "multi-thread")]
use rayon::prelude::*;

/// One contributor's secret polynomial and its public commitment
#[derive(Debug, Clone)]
pub struct Contribution<G: CurveGroup> {
    pub polynomial: Polynomial<G::Scalar>,
    pub commitment: PublicCommitment<G>,
}

impl<G: CurveGroup> Contribution<G> {
    /// Share a fresh random secret
    pub fn random<R>(params: &ThresholdParams, rng: &mut R) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let secret = random_scalar(rng)?;
        Self::with_secret(params, secret, rng)
    }

    /// Share a given secret
    pub fn with_secret<R>(params: &ThresholdParams, secret: G::Scalar, rng: &mut R) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        params.validate()?;
        let polynomial = Polynomial::random(params.threshold, secret, rng)?;
        let commitment = polynomial.commit(&G::base_point());
        Ok(Self {
            polynomial,
            commitment,
        })
    }

    /// Private shares for every party
    pub fn shares(&self, params: &ThresholdParams) -> Result<Vec<PrivateShare<G::Scalar>>> {
        self.polynomial.shares(params.n_parties)
    }
}

/// Result of a joint setup: the group commitment and every party's key share
#[derive(Debug, Clone)]
pub struct JointKey<G: CurveGroup> {
    pub params: ThresholdParams,
    /// Sum of all contributors' commitments
    pub commitment: PublicCommitment<G>,
    /// Combined key share of party `i` at position `i`
    pub shares: Vec<PrivateShare<G::Scalar>>,
}

impl<G: CurveGroup> JointKey<G> {
    /// Group public key
    pub fn public_key(&self) -> G {
        self.commitment.public_key()
    }
}

/// Run a joint setup in which every one of the `n` parties contributes
#[instrument(skip(rng))]
pub fn joint_setup<G, R>(params: &ThresholdParams, rng: &mut R) -> Result<JointKey<G>>
where
    G: CurveGroup,
    R: RngCore + CryptoRng + ?Sized,
{
    params.validate()?;

    let contributions = (0..params.n_parties)
        .map(|_| Contribution::<G>::random(params, rng))
        .collect::<Result<Vec<_>>>()?;

    combine_contributions(params, &contributions)
}

/// Combine contributions into per-party key shares.
///
/// Every received share is checked against its contributor's commitment
/// first; the first failing share aborts the setup.
pub fn combine_contributions<G: CurveGroup>(
    params: &ThresholdParams,
    contributions: &[Contribution<G>],
) -> Result<JointKey<G>> {
    params.validate()?;
    if contributions.is_empty() {
        return Err(Error::InvalidConfig("No contributions".into()));
    }
    if let Some(bad) = contributions
        .iter()
        .find(|c| c.commitment.threshold() != params.threshold)
    {
        return Err(Error::InvalidConfig(format!(
            "Contribution has {} coefficients, expected {}",
            bad.commitment.threshold(),
            params.threshold
        )));
    }

    let per_contributor: Vec<Vec<PrivateShare<G::Scalar>>> =
        contributions
            .iter()
            .map(|c| c.shares(params))
            .collect::<Result<_>>()?;

    let combine_at = |i: usize| -> Result<PrivateShare<G::Scalar>> {
        let received: Vec<PrivateShare<G::Scalar>> =
            per_contributor.iter().map(|shares| shares[i]).collect();

        for (share, contribution) in received.iter().zip(contributions) {
            if !contribution.commitment.verify_share(share, &G::base_point()) {
                warn!(index = share.index, "Share does not match commitment");
                return Err(Error::InvalidShare {
                    index: share.index as usize,
                });
            }
        }

        add_private_shares(&received)
    };

    #[cfg(feature = "multi-thread")]
    let shares = (0..params.n_parties)
        .into_par_iter()
        .map(combine_at)
        .collect::<Result<Vec<_>>>()?;
    #[cfg(not(feature = "multi-thread"))]
    let shares = (0..params.n_parties)
        .map(combine_at)
        .collect::<Result<Vec<_>>>()?;

    let commitments: Vec<PublicCommitment<G>> =
        contributions.iter().map(|c| c.commitment.clone()).collect();
    let commitment = add_commitments(&commitments)?;

    debug!(
        contributors = contributions.len(),
        threshold = params.threshold,
        n_parties = params.n_parties,
        public_key = hex::encode(commitment.public_key().encode_point()),
        "Joint key setup completed"
    );

    Ok(JointKey {
        params: *params,
        commitment,
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::recover_secret;
    use k256::{ProjectivePoint, Scalar};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_joint_key_shares_match_commitment() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let params = ThresholdParams::new(3, 5).unwrap();
        let key = joint_setup::<ProjectivePoint, _>(&params, &mut rng).unwrap();

        assert_eq!(key.shares.len(), 5);
        for share in &key.shares {
            assert!(key
                .commitment
                .verify_share(share, &ProjectivePoint::GENERATOR));
        }
    }

    #[test]
    fn test_combined_secret_is_sum_of_contributions() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let params = ThresholdParams::new(2, 3).unwrap();
        let contributions: Vec<Contribution<ProjectivePoint>> = (1..=3u64)
            .map(|s| Contribution::with_secret(&params, Scalar::from(s), &mut rng).unwrap())
            .collect();

        let key = combine_contributions(&params, &contributions).unwrap();
        let recovered = recover_secret(&key.shares[1..3], 2).unwrap();

        assert_eq!(recovered, Scalar::from(6u64));
        assert_eq!(key.public_key(), ProjectivePoint::GENERATOR * Scalar::from(6u64));
    }

    #[test]
    fn test_tampered_contribution_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let params = ThresholdParams::new(2, 3).unwrap();
        let mut contributions: Vec<Contribution<ProjectivePoint>> = (0..3)
            .map(|_| Contribution::random(&params, &mut rng).unwrap())
            .collect();

        // Publish a commitment that does not match the polynomial
        let other = Contribution::<ProjectivePoint>::random(&params, &mut rng).unwrap();
        contributions[1].commitment = other.commitment;

        let result = combine_contributions(&params, &contributions);
        assert!(matches!(result, Err(Error::InvalidShare { .. })));
    }

    #[test]
    fn test_mismatched_threshold_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let params = ThresholdParams::new(2, 3).unwrap();
        let wider = ThresholdParams::new(3, 3).unwrap();
        let contributions = vec![
            Contribution::<ProjectivePoint>::random(&params, &mut rng).unwrap(),
            Contribution::<ProjectivePoint>::random(&wider, &mut rng).unwrap(),
        ];

        assert!(matches!(
            combine_contributions(&params, &contributions),
            Err(Error::InvalidConfig(_))
        ));
    }
}
