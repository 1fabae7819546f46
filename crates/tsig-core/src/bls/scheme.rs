//! BLS signatures on BLS12-381 with keys in G2 and signatures in G1

use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use sha2::{Digest, Sha256};

use super::ThresholdScheme;
use crate::{Error, Result};

/// Domain separation tag for hashing messages to G1
pub const HASH_DST: &[u8] = b"TSIG-V01-CS01-with-BLS12381G1_SHA-256_TAI_";

/// Compressed-encoding flag bits of the first byte
const COMPRESSION_FLAG: u8 = 0x80;
const SORT_FLAG: u8 = 0x20;
const FLAG_MASK: u8 = 0x1f;

/// Hash a message to a non-identity point of the G1 prime-order subgroup.
///
/// Try-and-increment: candidate x coordinates are derived from SHA-256 with a
/// one-byte counter until one lies on the curve, then the cofactor is
/// cleared. Only public data goes through here, so the variable number of
/// attempts leaks nothing.
pub fn hash_to_g1(message: &[u8]) -> Result<G1Projective> {
    for counter in 0..=u8::MAX {
        let head = Sha256::new()
            .chain_update(HASH_DST)
            .chain_update([counter, 0])
            .chain_update(message)
            .finalize();
        let tail = Sha256::new()
            .chain_update(HASH_DST)
            .chain_update([counter, 1])
            .chain_update(message)
            .finalize();

        let mut candidate = [0u8; 48];
        candidate[..32].copy_from_slice(&head);
        candidate[32..].copy_from_slice(&tail[..16]);

        candidate[0] &= FLAG_MASK;
        candidate[0] |= COMPRESSION_FLAG;
        if tail[16] & 1 == 1 {
            candidate[0] |= SORT_FLAG;
        }

        if let Some(affine) = Option::<G1Affine>::from(G1Affine::from_compressed_unchecked(&candidate)) {
            let point = G1Projective::from(affine).clear_cofactor();
            if !bool::from(point.is_identity()) {
                return Ok(point);
            }
        }
    }

    Err(Error::Crypto("Could not hash message to G1".into()))
}

/// Minimal-signature-size BLS over BLS12-381
#[derive(Debug, Clone, Copy, Default)]
pub struct Bls12381;

impl ThresholdScheme for Bls12381 {
    type Public = G2Projective;
    type Signature = G1Projective;

    fn sign(secret: &Scalar, message: &[u8]) -> Result<G1Projective> {
        Ok(hash_to_g1(message)? * secret)
    }

    fn verify(public: &G2Projective, message: &[u8], signature: &G1Projective) -> bool {
        if bool::from(public.is_identity()) || bool::from(signature.is_identity()) {
            return false;
        }
        let Ok(hashed) = hash_to_g1(message) else {
            return false;
        };

        // e(sig, g2) == e(H(m), pk)
        let lhs = pairing(&G1Affine::from(signature), &G2Affine::generator());
        let rhs = pairing(&G1Affine::from(hashed), &G2Affine::from(public));
        lhs == rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::random_scalar;
    use crate::CurveGroup;
    use rand::rngs::OsRng;

    #[test]
    fn test_hash_to_g1_is_deterministic_and_in_subgroup() {
        let a = hash_to_g1(b"Hello Threshold Signature").unwrap();
        let b = hash_to_g1(b"Hello Threshold Signature").unwrap();
        let c = hash_to_g1(b"another message").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(bool::from(G1Affine::from(a).is_torsion_free()));
    }

    #[test]
    fn test_sign_verify() {
        let secret: Scalar = random_scalar(&mut OsRng).unwrap();
        let public = Bls12381::public_key(&secret);
        let signature = Bls12381::sign(&secret, b"message").unwrap();

        assert!(Bls12381::verify(&public, b"message", &signature));
        assert!(!Bls12381::verify(&public, b"other message", &signature));

        let other: Scalar = random_scalar(&mut OsRng).unwrap();
        assert!(!Bls12381::verify(&Bls12381::public_key(&other), b"message", &signature));
    }

    #[test]
    fn test_signature_encoding() {
        let secret = Scalar::from(1234u64);
        let signature = Bls12381::sign(&secret, b"message").unwrap();
        let bytes = signature.encode_point();

        assert_eq!(bytes.len(), 48);
        assert_eq!(G1Projective::decode_point(&bytes).unwrap(), signature);
    }

    #[test]
    fn test_identity_is_rejected() {
        let public = Bls12381::public_key(&Scalar::from(5u64));
        assert!(!Bls12381::verify(&public, b"m", &G1Projective::identity()));
    }
}
