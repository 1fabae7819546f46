//! Key and nonce aggregation, challenge, and signature arithmetic

use group::Group;
use k256::{elliptic_curve::sec1::ToEncodedPoint, ProjectivePoint, Scalar};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::curve::{decode_scalar, sum_points};
use crate::hash::hash_to_scalar;
use crate::{Error, Result};

/// Compressed SEC1 prefix of a point with even y
const EVEN_Y_TAG: u8 = 0x02;

/// Final aggregated signature `(R.x, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrSignature {
    /// x coordinate of the aggregate nonce point
    pub r: [u8; 32],
    /// Aggregated response
    pub s: [u8; 32],
}

impl SchnorrSignature {
    /// `r || s`
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(Error::Deserialization(format!(
                "Invalid signature length: expected 64, got {}",
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Self { r, s })
    }
}

/// Compressed SEC1 encoding; the identity has none
fn compressed(point: &ProjectivePoint) -> Result<[u8; 33]> {
    if bool::from(point.is_identity()) {
        return Err(Error::Crypto("Point at infinity".into()));
    }
    let encoded = point.to_affine().to_encoded_point(true);
    encoded
        .as_bytes()
        .try_into()
        .map_err(|_| Error::Crypto("Invalid compressed point".into()))
}

/// x coordinate of a non-identity point
pub fn x_coordinate(point: &ProjectivePoint) -> Result<[u8; 32]> {
    let bytes = compressed(point)?;
    let mut x = [0u8; 32];
    x.copy_from_slice(&bytes[1..33]);
    Ok(x)
}

/// Whether a non-identity point has an even y coordinate
pub fn has_even_y(point: &ProjectivePoint) -> Result<bool> {
    Ok(compressed(point)?[0] == EVEN_Y_TAG)
}

/// Sum of the signers' public keys
pub fn aggregate_public_keys(keys: &[ProjectivePoint]) -> Result<ProjectivePoint> {
    aggregate(keys, "public key")
}

/// Sum of the signers' nonce points
pub fn aggregate_nonces(nonces: &[ProjectivePoint]) -> Result<ProjectivePoint> {
    aggregate(nonces, "nonce")
}

fn aggregate(points: &[ProjectivePoint], what: &str) -> Result<ProjectivePoint> {
    if points.is_empty() {
        return Err(Error::InsufficientShares {
            required: 1,
            actual: 0,
        });
    }
    let sum = sum_points(points);
    if bool::from(sum.is_identity()) {
        return Err(Error::Crypto(format!("Aggregate {} is the identity", what)));
    }
    Ok(sum)
}

/// Deterministic nonce `k0 = H(d || m) mod N`
pub fn derive_nonce(secret: &Scalar, message: &[u8]) -> Result<Scalar> {
    let mut secret_bytes = Zeroizing::new([0u8; 32]);
    secret_bytes.copy_from_slice(&secret.to_bytes());

    let k0 = hash_to_scalar(&[&secret_bytes[..], message]);
    if bool::from(k0.is_zero()) {
        return Err(Error::Crypto("Derived nonce is zero".into()));
    }
    Ok(k0)
}

/// Fiat-Shamir challenge `e = H(R.x || P || m) mod N`, with `P` compressed
pub fn challenge(r_x: &[u8; 32], aggregate_key: &ProjectivePoint, message: &[u8]) -> Result<Scalar> {
    let key_bytes = compressed(aggregate_key)?;
    Ok(hash_to_scalar(&[&r_x[..], &key_bytes[..], message]))
}

/// `s_i = k + e * d`, where `k` is the nonce negated when the aggregate nonce
/// has odd y
pub fn partial_signature(nonce: &Scalar, negate: bool, challenge: &Scalar, secret: &Scalar) -> Scalar {
    let k = if negate { -*nonce } else { *nonce };
    k + *challenge * secret
}

/// Check one partial against its signer's commitments:
/// `s_i * G == ±R_i + e * P_i`, with `R_i` negated under the same rule as
/// the nonce
pub fn verify_partial(
    partial: &Scalar,
    nonce_point: &ProjectivePoint,
    negate: bool,
    challenge: &Scalar,
    public: &ProjectivePoint,
) -> bool {
    let r = if negate { -*nonce_point } else { *nonce_point };
    ProjectivePoint::GENERATOR * partial == r + *public * challenge
}

/// Sum partial signatures into `(R.x, s)`
pub fn combine_partial_signatures(
    aggregate_nonce: &ProjectivePoint,
    partials: &[Scalar],
) -> Result<SchnorrSignature> {
    if partials.is_empty() {
        return Err(Error::InsufficientShares {
            required: 1,
            actual: 0,
        });
    }

    let s: Scalar = partials.iter().sum();
    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&s.to_bytes());

    Ok(SchnorrSignature {
        r: x_coordinate(aggregate_nonce)?,
        s: s_bytes,
    })
}

/// Check `R' = sG - eP` has even y and `R'.x == r`
pub fn verify(aggregate_key: &ProjectivePoint, message: &[u8], signature: &SchnorrSignature) -> Result<()> {
    let s: Scalar = decode_scalar(&signature.s)
        .map_err(|_| Error::VerificationFailed("s is not a canonical scalar".into()))?;
    let e = challenge(&signature.r, aggregate_key, message)
        .map_err(|e| Error::VerificationFailed(e.to_string()))?;

    let r_point = ProjectivePoint::GENERATOR * s - *aggregate_key * e;
    if bool::from(r_point.is_identity()) {
        return Err(Error::VerificationFailed("R is the point at infinity".into()));
    }
    if !has_even_y(&r_point)? {
        return Err(Error::VerificationFailed("R has odd y".into()));
    }
    if x_coordinate(&r_point)? != signature.r {
        return Err(Error::VerificationFailed("R.x does not match".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::random_scalar;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// Single-signer run of the same arithmetic
    fn sign_single(secret: &Scalar, message: &[u8]) -> SchnorrSignature {
        let public = ProjectivePoint::GENERATOR * secret;
        let k0 = derive_nonce(secret, message).unwrap();
        let nonce = ProjectivePoint::GENERATOR * k0;
        let negate = !has_even_y(&nonce).unwrap();
        let e = challenge(&x_coordinate(&nonce).unwrap(), &public, message).unwrap();
        let s = partial_signature(&k0, negate, &e, secret);
        combine_partial_signatures(&nonce, &[s]).unwrap()
    }

    #[test]
    fn test_nonce_is_deterministic() {
        let secret = Scalar::from(12345u64);
        assert_eq!(
            derive_nonce(&secret, b"m").unwrap(),
            derive_nonce(&secret, b"m").unwrap()
        );
        assert_ne!(
            derive_nonce(&secret, b"m").unwrap(),
            derive_nonce(&secret, b"n").unwrap()
        );
        assert_ne!(
            derive_nonce(&secret, b"m").unwrap(),
            derive_nonce(&Scalar::from(12346u64), b"m").unwrap()
        );
    }

    #[test]
    fn test_single_signer_verifies() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for _ in 0..8 {
            let secret: Scalar = random_scalar(&mut rng).unwrap();
            let public = ProjectivePoint::GENERATOR * secret;
            let signature = sign_single(&secret, b"message");

            verify(&public, b"message", &signature).unwrap();
            assert!(matches!(
                verify(&public, b"other", &signature),
                Err(Error::VerificationFailed(_))
            ));
        }
    }

    #[test]
    fn test_tampered_signature_fails() {
        let secret = Scalar::from(777u64);
        let public = ProjectivePoint::GENERATOR * secret;
        let signature = sign_single(&secret, b"message");

        let mut bad_s = signature;
        bad_s.s[31] ^= 0x01;
        assert!(verify(&public, b"message", &bad_s).is_err());

        let mut bad_r = signature;
        bad_r.r[0] ^= 0x80;
        assert!(verify(&public, b"message", &bad_r).is_err());

        let non_canonical = SchnorrSignature {
            r: signature.r,
            s: [0xff; 32],
        };
        assert!(verify(&public, b"message", &non_canonical).is_err());
    }

    #[test]
    fn test_partial_checked_against_signer() {
        let secret = Scalar::from(4242u64);
        let public = ProjectivePoint::GENERATOR * secret;
        let k0 = derive_nonce(&secret, b"partial").unwrap();
        let nonce = ProjectivePoint::GENERATOR * k0;
        let e = Scalar::from(17u64);

        for negate in [false, true] {
            let s = partial_signature(&k0, negate, &e, &secret);
            assert!(verify_partial(&s, &nonce, negate, &e, &public));
            assert!(!verify_partial(&s, &nonce, !negate, &e, &public));
            assert!(!verify_partial(&s, &nonce, negate, &(e + Scalar::ONE), &public));
            assert!(!verify_partial(
                &s,
                &nonce,
                negate,
                &e,
                &(public + ProjectivePoint::GENERATOR)
            ));
        }
    }

    #[test]
    fn test_aggregation_rejects_empty_and_identity() {
        assert!(matches!(
            aggregate_public_keys(&[]),
            Err(Error::InsufficientShares { .. })
        ));

        let p = ProjectivePoint::GENERATOR * Scalar::from(3u64);
        assert!(matches!(
            aggregate_nonces(&[p, -p]),
            Err(Error::Crypto(_))
        ));
    }

    #[test]
    fn test_signature_bytes() {
        let signature = sign_single(&Scalar::from(99u64), b"bytes");
        let bytes = signature.to_bytes();
        assert_eq!(&bytes[..32], &signature.r);
        assert_eq!(SchnorrSignature::from_bytes(&bytes).unwrap(), signature);
        assert!(SchnorrSignature::from_bytes(&bytes[..63]).is_err());
    }
}
