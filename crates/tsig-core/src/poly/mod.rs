//! Polynomial secret sharing
//!
//! Shamir sharing over the scalar field of a [`CurveGroup`](crate::CurveGroup),
//! Feldman-style public commitments, and Lagrange recovery of either the
//! secret scalar or a committed point.

mod joint;
mod lagrange;
mod polynomial;

pub use joint::{combine_contributions, joint_setup, Contribution, JointKey};
pub use lagrange::{lagrange_coefficient, recover_commit, recover_secret};
pub use polynomial::{
    add_commitments, add_private_shares, Polynomial, PrivateShare, PublicCommitment, PublicShare,
};
