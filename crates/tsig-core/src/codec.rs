//! Signature share wire format
//!
//! `[2-byte big-endian index][opaque payload]`. There is no version field;
//! the payload format is agreed on out of band.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ShareIndex};

/// Length of the index prefix
pub const INDEX_LEN: usize = 2;

/// A partial signature tagged with the signer's share index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureShare {
    pub index: ShareIndex,
    pub payload: Vec<u8>,
}

impl SignatureShare {
    pub fn new(index: ShareIndex, payload: Vec<u8>) -> Self {
        Self { index, payload }
    }

    /// Wire encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self.index, &self.payload)
    }

    /// Decode from the wire
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (index, payload) = decode(bytes)?;
        Ok(Self {
            index,
            payload: payload.to_vec(),
        })
    }
}

/// Prefix `payload` with the big-endian index
pub fn encode(index: ShareIndex, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(INDEX_LEN + payload.len());
    bytes.extend_from_slice(&index.to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Split wire bytes into index and payload
pub fn decode(bytes: &[u8]) -> Result<(ShareIndex, &[u8])> {
    if bytes.len() < INDEX_LEN {
        return Err(Error::MalformedShare(format!(
            "Share is {} bytes, need at least {}",
            bytes.len(),
            INDEX_LEN
        )));
    }

    let (prefix, payload) = bytes.split_at(INDEX_LEN);
    let index = ShareIndex::from_be_bytes([prefix[0], prefix[1]]);
    Ok((index, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let bytes = encode(0x0102, &[0xaa, 0xbb]);
        assert_eq!(bytes, vec![0x01, 0x02, 0xaa, 0xbb]);
    }

    #[test]
    fn test_decode_then_encode_is_identity() {
        let wire = hex::decode("0007deadbeef").unwrap();
        let share = SignatureShare::from_bytes(&wire).unwrap();
        assert_eq!(share.index, 7);
        assert_eq!(share.payload, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(share.to_bytes(), wire);
    }

    #[test]
    fn test_empty_payload() {
        let (index, payload) = decode(&[0xff, 0xff]).unwrap();
        assert_eq!(index, u16::MAX);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_short_input_is_malformed() {
        assert!(matches!(decode(&[]), Err(Error::MalformedShare(_))));
        assert!(matches!(
            SignatureShare::from_bytes(&[0x01]),
            Err(Error::MalformedShare(_))
        ));
    }
}
