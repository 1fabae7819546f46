//! Core types shared by both signing families

use serde::{Deserialize, Serialize};

use crate::{Error, Result, DEFAULT_PARTIES, DEFAULT_THRESHOLD};

/// Unique identifier for a party in a signing session
pub type PartyId = usize;

/// Index of a share on the wire. Share `i` is the polynomial evaluated at `i + 1`.
pub type ShareIndex = u16;

/// Largest number of parties addressable by a [`ShareIndex`]
pub const MAX_PARTIES: usize = ShareIndex::MAX as usize;

/// Threshold pair `(t, n)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdParams {
    /// Minimum number of shares needed to sign or recover (t)
    pub threshold: usize,
    /// Total number of parties (n)
    pub n_parties: usize,
}

impl ThresholdParams {
    /// Create validated threshold parameters
    pub fn new(threshold: usize, n_parties: usize) -> Result<Self> {
        let params = Self {
            threshold,
            n_parties,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check `1 <= t <= n <= MAX_PARTIES`.
    ///
    /// Deserialized parameters bypass [`ThresholdParams::new`], so callers
    /// holding values from the outside should run this before use.
    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 {
            return Err(Error::InvalidConfig(
                "Threshold must be at least 1".into(),
            ));
        }
        if self.threshold > self.n_parties {
            return Err(Error::InvalidConfig(
                "Threshold cannot exceed number of parties".into(),
            ));
        }
        if self.n_parties > MAX_PARTIES {
            return Err(Error::InvalidConfig(format!(
                "At most {} parties are supported",
                MAX_PARTIES
            )));
        }
        Ok(())
    }

    /// Share indices `0..n`
    pub fn indices(&self) -> impl Iterator<Item = ShareIndex> {
        // n_parties <= MAX_PARTIES, so every index fits
        (0..self.n_parties).map(|i| i as ShareIndex)
    }
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            n_parties: DEFAULT_PARTIES,
        }
    }
}

/// Inputs of one signing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Threshold pair
    pub params: ThresholdParams,
    /// Message to sign
    pub message: Vec<u8>,
    /// Participating party IDs, ascending
    pub participants: Vec<PartyId>,
}

impl SessionConfig {
    /// Create a session in which every party participates
    pub fn new(params: ThresholdParams, message: impl Into<Vec<u8>>) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            message: message.into(),
            participants: (0..params.n_parties).collect(),
        })
    }

    /// Restrict the session to the parties selected by `mask`
    pub fn with_subset(mut self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.params.n_parties {
            return Err(Error::InvalidConfig(format!(
                "Subset mask has {} entries, expected {}",
                mask.len(),
                self.params.n_parties
            )));
        }

        let participants: Vec<PartyId> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &picked)| picked.then_some(i))
            .collect();

        if participants.is_empty() {
            return Err(Error::InvalidConfig("Subset selects no parties".into()));
        }

        self.participants = participants;
        Ok(self)
    }
}
