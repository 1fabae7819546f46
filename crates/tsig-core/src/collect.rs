//! Share collection at the transport boundary
//!
//! Encoded signature shares arrive over an mpsc channel. Collection stops as
//! soon as `t` distinct shares are in hand, and gives up with
//! [`Error::InsufficientShares`] when the deadline passes or every sender is
//! gone.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, instrument, warn};

use crate::codec::SignatureShare;
use crate::{Error, Result, ThresholdParams};

/// Collect `params.threshold` shares from `rx` within `timeout`.
///
/// Shares are returned in arrival order. Shares are only decoded, not
/// verified; that is the job of the signing session.
#[instrument(skip(rx, params), fields(threshold = params.threshold))]
pub async fn collect_shares(
    rx: &mut mpsc::Receiver<Vec<u8>>,
    params: &ThresholdParams,
    timeout: Duration,
) -> Result<Vec<SignatureShare>> {
    params.validate()?;

    let deadline = Instant::now() + timeout;
    let mut seen = HashSet::with_capacity(params.threshold);
    let mut shares = Vec::with_capacity(params.threshold);

    while shares.len() < params.threshold {
        let bytes = tokio::select! {
            received = rx.recv() => match received {
                Some(bytes) => bytes,
                None => {
                    warn!(collected = shares.len(), "Share channel closed");
                    break;
                }
            },
            _ = sleep_until(deadline) => {
                warn!(collected = shares.len(), "Timed out collecting shares");
                break;
            }
        };

        let share = SignatureShare::from_bytes(&bytes)?;
        let index = share.index as usize;
        if index >= params.n_parties {
            warn!(index, "Share from unknown party");
            return Err(Error::InvalidShare { index });
        }
        if !seen.insert(share.index) {
            warn!(index, "Duplicate share");
            return Err(Error::DuplicateIndex { index });
        }

        debug!(index, collected = shares.len() + 1, "Share received");
        shares.push(share);
    }

    if shares.len() < params.threshold {
        return Err(Error::InsufficientShares {
            required: params.threshold,
            actual: shares.len(),
        });
    }
    Ok(shares)
}
