//! Interchangeable ways of producing the group signature

use std::marker::PhantomData;

use tracing::{debug, instrument};

use super::session::{sign_share, ThresholdSession};
use super::{SchemeScalar, ThresholdScheme};
use crate::poly::{recover_secret, JointKey, PrivateShare};
use crate::{CurveGroup, Error, Result, ShareIndex};

#[cfg(feature = "multi-thread")]
use rayon::prelude::*;

/// Produces a signature that verifies under the group public key
pub trait SigningStrategy<C: ThresholdScheme> {
    fn sign(&self, message: &[u8]) -> Result<C::Signature>;
}

fn select_shares<G: CurveGroup>(
    key: &JointKey<G>,
    signers: &[ShareIndex],
) -> Result<Vec<PrivateShare<G::Scalar>>> {
    signers
        .iter()
        .map(|&index| {
            key.shares
                .iter()
                .find(|s| s.index == index)
                .copied()
                .ok_or(Error::InvalidShare {
                    index: index as usize,
                })
        })
        .collect()
}

/// Every signer signs with its share, the signature is interpolated in the
/// signature group after each partial signature was verified
pub struct ExponentRecovery<'a, C: ThresholdScheme> {
    key: &'a JointKey<C::Public>,
    shares: Vec<PrivateShare<SchemeScalar<C>>>,
    _scheme: PhantomData<fn() -> C>,
}

impl<'a, C: ThresholdScheme> ExponentRecovery<'a, C> {
    pub fn new(key: &'a JointKey<C::Public>, signers: &[ShareIndex]) -> Result<Self> {
        Ok(Self {
            key,
            shares: select_shares(key, signers)?,
            _scheme: PhantomData,
        })
    }
}

impl<C: ThresholdScheme> SigningStrategy<C> for ExponentRecovery<'_, C> {
    #[instrument(skip_all, fields(signers = self.shares.len()))]
    fn sign(&self, message: &[u8]) -> Result<C::Signature> {
        #[cfg(feature = "multi-thread")]
        let partials = self
            .shares
            .par_iter()
            .map(|share| sign_share::<C>(share, message))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "multi-thread"))]
        let partials = self
            .shares
            .iter()
            .map(|share| sign_share::<C>(share, message))
            .collect::<Result<Vec<_>>>()?;

        let mut session =
            ThresholdSession::<C>::new(self.key.params, self.key.commitment.clone(), message)?;
        for partial in partials {
            session.add_share(partial)?;
        }
        session.verify_shares()?;
        session.recover()
    }
}

/// The group secret is interpolated from the signers' shares and used to
/// sign directly
pub struct SecretRecovery<C: ThresholdScheme> {
    threshold: usize,
    shares: Vec<PrivateShare<SchemeScalar<C>>>,
    _scheme: PhantomData<fn() -> C>,
}

impl<C: ThresholdScheme> SecretRecovery<C> {
    pub fn new(key: &JointKey<C::Public>, signers: &[ShareIndex]) -> Result<Self> {
        Ok(Self {
            threshold: key.params.threshold,
            shares: select_shares(key, signers)?,
            _scheme: PhantomData,
        })
    }
}

impl<C: ThresholdScheme> SigningStrategy<C> for SecretRecovery<C> {
    #[instrument(skip_all, fields(signers = self.shares.len()))]
    fn sign(&self, message: &[u8]) -> Result<C::Signature> {
        let secret = recover_secret(&self.shares, self.threshold)?;
        debug!("Group secret recovered, signing directly");
        C::sign(&secret, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bls::{verify_aggregate, Bls12381};
    use crate::poly::joint_setup;
    use crate::ThresholdParams;
    use bls12_381::G2Projective;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn key(threshold: usize, n: usize, seed: u64) -> JointKey<G2Projective> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let params = ThresholdParams::new(threshold, n).unwrap();
        joint_setup(&params, &mut rng).unwrap()
    }

    #[test]
    fn test_strategies_agree() {
        let key = key(2, 4, 1);
        let message = b"strategies agree";

        let exponent = ExponentRecovery::<Bls12381>::new(&key, &[3, 1]).unwrap();
        let secret = SecretRecovery::<Bls12381>::new(&key, &[0, 2]).unwrap();

        let a = exponent.sign(message).unwrap();
        let b = secret.sign(message).unwrap();
        assert_eq!(a.encode_point(), b.encode_point());
        verify_aggregate::<Bls12381>(&key.public_key(), message, &a).unwrap();
    }

    #[test]
    fn test_strategies_through_trait_object() {
        let key = key(3, 3, 2);
        let signers = [0, 1, 2];
        let strategies: Vec<Box<dyn SigningStrategy<Bls12381> + '_>> = vec![
            Box::new(ExponentRecovery::<Bls12381>::new(&key, &signers).unwrap()),
            Box::new(SecretRecovery::<Bls12381>::new(&key, &signers).unwrap()),
        ];

        let signatures: Vec<_> = strategies
            .iter()
            .map(|s| s.sign(b"dyn").unwrap())
            .collect();
        assert_eq!(signatures[0], signatures[1]);
    }

    #[test]
    fn test_unknown_signer() {
        let key = key(2, 3, 3);
        assert!(matches!(
            SecretRecovery::<Bls12381>::new(&key, &[0, 9]),
            Err(Error::InvalidShare { index: 9 })
        ));
    }

    #[test]
    fn test_too_few_signers() {
        let key = key(3, 4, 4);
        let exponent = ExponentRecovery::<Bls12381>::new(&key, &[0, 1]).unwrap();
        let secret = SecretRecovery::<Bls12381>::new(&key, &[0, 1]).unwrap();

        assert!(matches!(
            exponent.sign(b"m"),
            Err(Error::InsufficientShares { .. })
        ));
        assert!(matches!(
            secret.sign(b"m"),
            Err(Error::InsufficientShares { .. })
        ));
    }
}
