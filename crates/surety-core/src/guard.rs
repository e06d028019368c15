//! A multiparty on/off switch.
//!
//! The switch flips only once enough distinct addresses have asked for the
//! same target state. Votes are kept per target value, so votes to disable
//! never count towards enabling and vice versa.

use std::collections::{BTreeMap, BTreeSet};

use crate::address::Address;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchVote {
  /// Already in the desired state; no vote is kept.
  Unchanged,
  /// Vote recorded; `required` distinct votes flip the switch.
  Recorded { votes: usize, required: usize },
  /// This vote reached quorum and the switch now reads `desired`.
  Flipped,
}

#[derive(Debug, Clone)]
pub struct MultipartySwitch {
  on:     bool,
  quorum: usize,
  votes:  BTreeMap<bool, BTreeSet<Address>>,
}

impl MultipartySwitch {
  pub fn new(on: bool, quorum: usize) -> Self {
    Self { on, quorum: quorum.max(1), votes: BTreeMap::new() }
  }

  pub fn is_on(&self) -> bool { self.on }

  /// Distinct voters currently asking for `desired`.
  pub fn votes_for(&self, desired: bool) -> usize {
    self.votes.get(&desired).map_or(0, BTreeSet::len)
  }

  pub fn vote(&mut self, voter: Address, desired: bool) -> SwitchVote {
    if desired == self.on {
      return SwitchVote::Unchanged;
    }
    let voters = self.votes.entry(desired).or_default();
    voters.insert(voter);
    if voters.len() < self.quorum {
      return SwitchVote::Recorded { votes: voters.len(), required: self.quorum };
    }
    self.votes.remove(&desired);
    self.on = desired;
    SwitchVote::Flipped
  }
}
