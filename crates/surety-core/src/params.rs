//! Tunable constants of the consortium.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  amount::{self, Amount, units},
  error::Error,
};

/// Fixed parameters a ledger is created with.
///
/// Every field has a default matching the reference deployment, so a config
/// file only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
  /// Distinct votes needed to flip the operational flag.
  pub ops_quorum:           usize,
  /// Below this many registered airlines, registration needs no vote.
  pub airline_bootstrap:    usize,
  /// Exact value an airline must attach to `fund_airline`.
  #[serde(with = "amount::as_str")]
  pub funding_fee:          Amount,
  /// Upper bound on the insured amount of a single policy.
  #[serde(with = "amount::as_str")]
  pub max_insurance:        Amount,
  /// Exact value an oracle must attach to `register_oracle`.
  #[serde(with = "amount::as_str")]
  pub registration_fee:     Amount,
  /// Matching responses needed to resolve a flight.
  pub min_responses:        usize,
  /// Oracle indexes are drawn from `0..index_space`.
  pub index_space:          u8,
  pub payout_numerator:     u32,
  pub payout_denominator:   u32,
}

impl Default for Params {
  fn default() -> Self {
    Self {
      ops_quorum:         4,
      airline_bootstrap:  4,
      funding_fee:        units(10),
      max_insurance:      units(1),
      registration_fee:   units(1),
      min_responses:      3,
      index_space:        10,
      payout_numerator:   3,
      payout_denominator: 2,
    }
  }
}

impl Params {
  /// Refuse values under which the ledger cannot work: a zero quorum resolves
  /// on nothing, a zero denominator can never pay out.
  pub fn validate(&self) -> Result<()> {
    let problem = if self.ops_quorum == 0 {
      "ops_quorum must be at least 1"
    } else if self.min_responses == 0 {
      "min_responses must be at least 1"
    } else if self.index_space == 0 {
      "index_space must be at least 1"
    } else if self.payout_denominator == 0 {
      "payout_denominator must not be 0"
    } else if self.max_insurance == 0 {
      "max_insurance must not be 0"
    } else {
      return Ok(());
    };
    Err(Error::InvalidParams(problem))
  }

  /// The amount credited for an insured amount on a late-airline resolution.
  /// Returns `None` on overflow.
  pub fn payout_for(&self, insured: Amount) -> Option<Amount> {
    insured
      .checked_mul(Amount::from(self.payout_numerator))?
      .checked_div(Amount::from(self.payout_denominator))
  }
}
