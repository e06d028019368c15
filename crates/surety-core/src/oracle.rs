//! Oracles and the response windows they vote in.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
  address::Address,
  flight::{FlightKey, FlightStatus},
};

/// A registered oracle and the three indexes it may answer for.
///
/// The triple may contain repeats; it is never changed after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
  pub address: Address,
  pub indexes: [u8; 3],
}

impl Oracle {
  pub fn holds(&self, index: u8) -> bool { self.indexes.contains(&index) }
}

/// The live status request for a flight and the votes cast so far.
///
/// At most one window is open per flight. Opening a new one discards the
/// previous window and its tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseWindow {
  pub index:     u8,
  pub flight:    FlightKey,
  pub requester: Address,
  /// Block at which the window was opened.
  pub opened_at: u64,
  /// Oracles that voted for each status. Set semantics make the tally
  /// independent of submission order and of resubmissions.
  pub tallies:   BTreeMap<FlightStatus, BTreeSet<Address>>,
}

impl ResponseWindow {
  pub fn open(index: u8, flight: FlightKey, requester: Address, opened_at: u64) -> Self {
    Self { index, flight, requester, opened_at, tallies: BTreeMap::new() }
  }

  /// Record `oracle`'s vote for `status`, returning that status's tally.
  pub fn record(&mut self, oracle: Address, status: FlightStatus) -> usize {
    let voters = self.tallies.entry(status).or_default();
    voters.insert(oracle);
    voters.len()
  }

  pub fn votes_for(&self, status: FlightStatus) -> usize {
    self.tallies.get(&status).map_or(0, BTreeSet::len)
  }
}

/// Result of an accepted oracle response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResponseOutcome {
  /// Counted, quorum not yet reached.
  Recorded { status: FlightStatus, votes: usize, required: usize },
  /// This response completed the quorum; the flight is resolved.
  Resolved { status: FlightStatus },
}
