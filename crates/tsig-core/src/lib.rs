//! # TSig Core
//!
//! Protocol layer for two families of multi-party signatures.
//!
//! - Threshold BLS: Shamir shares of a group key, per-share verification
//!   against a public commitment, and recovery of the signature by Lagrange
//!   interpolation in the signature group.
//! - Aggregated Schnorr on secp256k1: deterministic per-party nonces, key and
//!   nonce aggregation over a chosen subset, one shared challenge, and a
//!   single `(R.x, s)` signature.
//!
//! Curve arithmetic, pairings and hashing come from `k256`, `bls12_381` and
//! `sha2`; transport between parties is left to the caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tsig_core::bls::{Bls12381, ExponentRecovery, SigningStrategy};
//! use tsig_core::poly::joint_setup;
//! use tsig_core::ThresholdParams;
//!
//! let params = ThresholdParams::new(2, 3)?;
//! let key = joint_setup(&params, &mut rand::rngs::OsRng)?;
//!
//! let signature = ExponentRecovery::<Bls12381>::new(&key, &[0, 2])?.sign(b"message")?;
//! ```

pub mod bls;
pub mod codec;
pub mod collect;
pub mod curve;
pub mod error;
pub mod hash;
pub mod multisig;
pub mod poly;
pub mod schnorr;
pub mod types;

pub use codec::SignatureShare;
pub use curve::CurveGroup;
pub use error::{Error, Result};
pub use types::{PartyId, SessionConfig, ShareIndex, ThresholdParams, MAX_PARTIES};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default threshold for a 3-party setup
pub const DEFAULT_THRESHOLD: usize = 2;

/// Default number of parties
pub const DEFAULT_PARTIES: usize = 3;
