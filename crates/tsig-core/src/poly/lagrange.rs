//! Lagrange interpolation at zero, in the scalar and the point domain

use std::collections::BTreeSet;

use ff::PrimeField;
use group::Group;

use super::{PrivateShare, PublicShare};
use crate::curve::{evaluation_point, sum_points};
use crate::{Error, Result, ShareIndex};

/// Lagrange coefficient of `index` for interpolation at zero over `indices`
///
/// `lambda_i = prod_{j != i} x_j / (x_j - x_i)` with `x = index + 1`.
pub fn lagrange_coefficient<S: PrimeField>(index: ShareIndex, indices: &[ShareIndex]) -> Result<S> {
    let x_i: S = evaluation_point(index);
    let mut numerator = S::ONE;
    let mut denominator = S::ONE;

    for &j in indices {
        if j == index {
            continue;
        }
        let x_j: S = evaluation_point(j);
        numerator *= x_j;
        denominator *= x_j - x_i;
    }

    let inverse = Option::<S>::from(denominator.invert())
        .ok_or(Error::DuplicateIndex { index: index as usize })?;
    Ok(numerator * inverse)
}

/// Reject duplicates, then pick the first `threshold` indices.
///
/// Returns positions into the input slice.
fn select_indices(indices: &[ShareIndex], threshold: usize) -> Result<Vec<usize>> {
    let mut seen = BTreeSet::new();
    for &index in indices {
        if !seen.insert(index) {
            return Err(Error::DuplicateIndex {
                index: index as usize,
            });
        }
    }

    if threshold == 0 || indices.len() < threshold {
        return Err(Error::InsufficientShares {
            required: threshold,
            actual: indices.len(),
        });
    }

    Ok((0..threshold).collect())
}

fn coefficients<S: PrimeField>(indices: &[ShareIndex]) -> Result<Vec<S>> {
    indices
        .iter()
        .map(|&i| lagrange_coefficient(i, indices))
        .collect()
}

/// Recover the secret (the polynomial at zero) from `threshold` shares
pub fn recover_secret<S: PrimeField>(shares: &[PrivateShare<S>], threshold: usize) -> Result<S> {
    let all: Vec<ShareIndex> = shares.iter().map(|s| s.index).collect();
    let picked = select_indices(&all, threshold)?;

    let indices: Vec<ShareIndex> = picked.iter().map(|&p| shares[p].index).collect();
    let lambdas: Vec<S> = coefficients(&indices)?;

    Ok(picked
        .iter()
        .zip(lambdas)
        .map(|(&p, lambda)| shares[p].value * lambda)
        .sum())
}

/// Recover the committed point at zero from `threshold` public shares.
///
/// Applies the same coefficients as [`recover_secret`] through scalar
/// multiplication, which is how threshold signatures are recovered "in the
/// exponent".
pub fn recover_commit<G: Group>(shares: &[PublicShare<G>], threshold: usize) -> Result<G> {
    let all: Vec<ShareIndex> = shares.iter().map(|s| s.index).collect();
    let picked = select_indices(&all, threshold)?;

    let indices: Vec<ShareIndex> = picked.iter().map(|&p| shares[p].index).collect();
    let lambdas: Vec<G::Scalar> = coefficients(&indices)?;

    let terms: Vec<G> = picked
        .iter()
        .zip(lambdas)
        .map(|(&p, lambda)| shares[p].value * lambda)
        .collect();
    Ok(sum_points(&terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::Polynomial;
    use k256::{ProjectivePoint, Scalar};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn setup(threshold: usize, seed: u64) -> (Scalar, Polynomial<Scalar>) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let secret: Scalar = crate::curve::random_scalar(&mut rng).unwrap();
        let poly = Polynomial::random(threshold, secret, &mut rng).unwrap();
        (secret, poly)
    }

    #[test]
    fn test_coefficients_sum_to_one() {
        // Interpolating the constant polynomial 1 gives 1
        let indices = [0u16, 3, 7];
        let sum: Scalar = indices
            .iter()
            .map(|&i| lagrange_coefficient::<Scalar>(i, &indices).unwrap())
            .sum();
        assert_eq!(sum, Scalar::ONE);
    }

    #[test]
    fn test_two_point_coefficient() {
        // x = 1, 2: lambda_1 = 2 / (2 - 1) = 2, lambda_2 = 1 / (1 - 2) = -1
        let indices = [0u16, 1];
        assert_eq!(
            lagrange_coefficient::<Scalar>(0, &indices).unwrap(),
            Scalar::from(2u64)
        );
        assert_eq!(
            lagrange_coefficient::<Scalar>(1, &indices).unwrap(),
            -Scalar::ONE
        );
    }

    #[test]
    fn test_recover_secret_from_different_subsets() {
        let (secret, poly) = setup(3, 1);
        let shares = poly.shares(6).unwrap();

        let first = recover_secret(&shares[0..3], 3).unwrap();
        let last = recover_secret(&shares[3..6], 3).unwrap();
        let mixed = recover_secret(&[shares[5], shares[1], shares[3]], 3).unwrap();

        assert_eq!(first, secret);
        assert_eq!(last, secret);
        assert_eq!(mixed, secret);
    }

    #[test]
    fn test_recover_uses_first_threshold_shares() {
        let (secret, poly) = setup(2, 2);
        let mut shares = poly.shares(4).unwrap();
        // A bad share past the threshold is never read
        shares[3].value += Scalar::ONE;
        assert_eq!(recover_secret(&shares, 2).unwrap(), secret);
    }

    #[test]
    fn test_recover_secret_insufficient() {
        for threshold in 2..6 {
            let (_, poly) = setup(threshold, threshold as u64);
            let shares = poly.shares(threshold - 1).unwrap();
            assert_eq!(
                recover_secret(&shares, threshold),
                Err(Error::InsufficientShares {
                    required: threshold,
                    actual: threshold - 1
                })
            );
        }
    }

    #[test]
    fn test_recover_secret_duplicate_index() {
        let (_, poly) = setup(2, 3);
        let shares = vec![poly.evaluate(1), poly.evaluate(2), poly.evaluate(1)];
        assert_eq!(
            recover_secret(&shares, 2),
            Err(Error::DuplicateIndex { index: 1 })
        );
    }

    #[test]
    fn test_recover_commit_matches_public_key() {
        let (_, poly) = setup(4, 4);
        let commitment = poly.commit(&ProjectivePoint::GENERATOR);
        let public_shares = commitment.shares(7).unwrap();

        let recovered = recover_commit(&public_shares[2..6], 4).unwrap();
        assert_eq!(recovered, commitment.public_key());

        assert!(matches!(
            recover_commit(&public_shares[..3], 4),
            Err(Error::InsufficientShares { .. })
        ));
    }
}
