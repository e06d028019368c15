//! [`MemoryStore`]: the in-process implementation of [`LedgerStore`].

use std::collections::{BTreeMap, BTreeSet};

use crate::{
  address::Address,
  airline::Airline,
  flight::{Flight, FlightKey},
  insurance::InsurancePolicy,
  oracle::{Oracle, ResponseWindow},
  store::LedgerStore,
};

/// Ledger tables held in ordered maps.
///
/// Ordered maps keep iteration (and therefore event order) deterministic,
/// which journal replay relies on. Cloning copies the whole ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  airlines:   BTreeMap<Address, Airline>,
  flights:    BTreeMap<FlightKey, Flight>,
  policies:   BTreeMap<(FlightKey, Address), InsurancePolicy>,
  /// passenger → flights they hold a policy on
  holdings:   BTreeMap<Address, BTreeSet<FlightKey>>,
  oracles:    BTreeMap<Address, Oracle>,
  windows:    BTreeMap<FlightKey, ResponseWindow>,
  registered: usize,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl LedgerStore for MemoryStore {
  fn airline(&self, address: &Address) -> Option<Airline> {
    self.airlines.get(address).cloned()
  }

  fn put_airline(&mut self, airline: Airline) {
    let was_registered = self
      .airlines
      .get(&airline.address)
      .is_some_and(|a| a.registered);
    match (was_registered, airline.registered) {
      (false, true) => self.registered += 1,
      (true, false) => self.registered -= 1,
      _ => {}
    }
    self.airlines.insert(airline.address, airline);
  }

  fn registered_airline_count(&self) -> usize { self.registered }

  fn flight(&self, key: &FlightKey) -> Option<Flight> { self.flights.get(key).cloned() }

  fn put_flight(&mut self, flight: Flight) {
    self.flights.insert(flight.key.clone(), flight);
  }

  fn policy(&self, flight: &FlightKey, passenger: &Address) -> Option<InsurancePolicy> {
    self.policies.get(&(flight.clone(), *passenger)).cloned()
  }

  fn put_policy(&mut self, policy: InsurancePolicy) {
    self
      .holdings
      .entry(policy.passenger)
      .or_default()
      .insert(policy.flight.clone());
    self
      .policies
      .insert((policy.flight.clone(), policy.passenger), policy);
  }

  fn policies_for_flight(&self, flight: &FlightKey) -> Vec<InsurancePolicy> {
    let start = (flight.clone(), Address::ZERO);
    self
      .policies
      .range(start..)
      .take_while(|((key, _), _)| key == flight)
      .map(|(_, policy)| policy.clone())
      .collect()
  }

  fn policies_of(&self, passenger: &Address) -> Vec<InsurancePolicy> {
    self
      .holdings
      .get(passenger)
      .into_iter()
      .flatten()
      .filter_map(|flight| self.policy(flight, passenger))
      .collect()
  }

  fn oracle(&self, address: &Address) -> Option<Oracle> { self.oracles.get(address).cloned() }

  fn put_oracle(&mut self, oracle: Oracle) {
    self.oracles.insert(oracle.address, oracle);
  }

  fn oracle_count(&self) -> usize { self.oracles.len() }

  fn response_window(&self, flight: &FlightKey) -> Option<ResponseWindow> {
    self.windows.get(flight).cloned()
  }

  fn put_response_window(&mut self, window: ResponseWindow) {
    self.windows.insert(window.flight.clone(), window);
  }

  fn close_response_window(&mut self, flight: &FlightKey) -> Option<ResponseWindow> {
    self.windows.remove(flight)
  }
}
