//! Passenger insurance policies.

use serde::{Deserialize, Serialize};

use crate::{
  address::Address,
  amount::{self, Amount},
  flight::FlightKey,
};

/// One passenger's cover on one flight.
///
/// Repeat purchases for the same flight accumulate into the same policy, up
/// to the per-policy cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
  pub passenger:       Address,
  pub flight:          FlightKey,
  #[serde(with = "amount::as_str")]
  pub insured_amount:  Amount,
  /// Set when the flight resolves as late through the airline's fault;
  /// zeroed again when the passenger withdraws.
  #[serde(with = "amount::as_str")]
  pub credited_amount: Amount,
  /// The covered flight has reached a terminal status.
  pub resolved:        bool,
}

impl InsurancePolicy {
  pub fn new(passenger: Address, flight: FlightKey) -> Self {
    Self {
      passenger,
      flight,
      insured_amount: 0,
      credited_amount: 0,
      resolved: false,
    }
  }
}
