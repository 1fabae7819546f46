//! Threshold BLS signing
//!
//! Parties holding Shamir shares of a group key each sign the message with
//! their share. Shares are verified one by one against the group commitment
//! and the signature is recovered by Lagrange interpolation in the signature
//! group. Recovering the group secret and signing with it directly yields the
//! same signature; both paths sit behind [`SigningStrategy`].

mod scheme;
mod session;
mod strategy;

pub use scheme::{hash_to_g1, Bls12381, HASH_DST};
pub use session::{
    recover_from_shares, recover_signature, sign_share, verify_aggregate, verify_share,
    SessionState, ThresholdSession,
};
pub use strategy::{ExponentRecovery, SecretRecovery, SigningStrategy};

use group::Group;

use crate::{CurveGroup, Result};

/// Scalar field shared by the key and signature groups of a scheme
pub type SchemeScalar<C> = <<C as ThresholdScheme>::Public as Group>::Scalar;

/// Deterministic signing primitive whose signatures are linear in the key
pub trait ThresholdScheme {
    /// Group of public keys and commitments
    type Public: CurveGroup;
    /// Group of signatures
    type Signature: CurveGroup<Scalar = SchemeScalar<Self>>;

    /// Sign `message` with a secret scalar
    fn sign(secret: &SchemeScalar<Self>, message: &[u8]) -> Result<Self::Signature>;

    /// Check a signature against a public key
    fn verify(public: &Self::Public, message: &[u8], signature: &Self::Signature) -> bool;

    /// Public key of a secret scalar
    fn public_key(secret: &SchemeScalar<Self>) -> Self::Public {
        Self::Public::base_point() * secret
    }
}
