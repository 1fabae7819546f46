//! Aggregated Schnorr signing on secp256k1
//!
//! Every signer derives a deterministic nonce from its key and the message.
//! Public keys and nonce points of the chosen subset are summed, a single
//! challenge is computed over the aggregate nonce, the aggregate key and the
//! message, and the partial responses are added into one `(R.x, s)`
//! signature that verifies against the subset's aggregate key.
//!
//! The aggregate nonce is normalized to even y: if the sum has odd y every
//! signer negates its nonce before responding.

mod aggregate;
mod party;
mod session;

pub use aggregate::{
    aggregate_nonces, aggregate_public_keys, challenge, combine_partial_signatures, derive_nonce,
    has_even_y, partial_signature, verify, verify_partial, x_coordinate, SchnorrSignature,
};
pub use party::SchnorrParty;
pub use session::{sign_subset, verify_subset, SubsetSignature};
