//! Consortium members.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// An airline known to the ledger.
///
/// An entry exists either because the airline is registered or because a
/// registration proposal for it is pending. Entries are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
  pub address:    Address,
  pub registered: bool,
  pub funded:     bool,
  /// Distinct registered airlines approving a pending registration. Cleared
  /// once the candidate is admitted.
  pub votes:      BTreeSet<Address>,
}

impl Airline {
  /// A fresh, not-yet-admitted candidate.
  pub fn candidate(address: Address) -> Self {
    Self { address, registered: false, funded: false, votes: BTreeSet::new() }
  }

  /// A registered, unfunded airline.
  pub fn registered(address: Address) -> Self {
    Self { registered: true, ..Self::candidate(address) }
  }

  /// Registered and funded; the only state allowed to act for the consortium.
  pub fn is_active(&self) -> bool { self.registered && self.funded }
}

/// Result of a call to `register_airline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Registration {
  /// The candidate is now a registered airline.
  Registered,
  /// The vote was recorded; `required` approvals admit the candidate.
  Pending { votes: usize, required: usize },
}
