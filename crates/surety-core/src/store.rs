//! The `LedgerStore` trait.
//!
//! A ledger store is plain key-indexed storage for the five ledger tables. It
//! carries no business rules: the engine in [`crate::ledger`] validates every
//! transaction in full before it writes, so a store only ever sees writes
//! that belong to an accepted transaction.
//!
//! Reads return owned values so backends are free to decode on the fly.

use crate::{
  address::Address,
  airline::Airline,
  flight::{Flight, FlightKey},
  insurance::InsurancePolicy,
  oracle::{Oracle, ResponseWindow},
};

pub trait LedgerStore {
  // ── Airlines ──────────────────────────────────────────────────────────

  fn airline(&self, address: &Address) -> Option<Airline>;

  /// Insert or replace the airline entry keyed by `airline.address`.
  fn put_airline(&mut self, airline: Airline);

  /// Number of airlines with `registered == true`.
  fn registered_airline_count(&self) -> usize;

  // ── Flights ───────────────────────────────────────────────────────────

  fn flight(&self, key: &FlightKey) -> Option<Flight>;

  fn put_flight(&mut self, flight: Flight);

  // ── Policies ──────────────────────────────────────────────────────────

  fn policy(&self, flight: &FlightKey, passenger: &Address) -> Option<InsurancePolicy>;

  fn put_policy(&mut self, policy: InsurancePolicy);

  /// Every policy on `flight`, in passenger order.
  fn policies_for_flight(&self, flight: &FlightKey) -> Vec<InsurancePolicy>;

  /// Every policy held by `passenger`, in flight order.
  fn policies_of(&self, passenger: &Address) -> Vec<InsurancePolicy>;

  // ── Oracles ───────────────────────────────────────────────────────────

  fn oracle(&self, address: &Address) -> Option<Oracle>;

  fn put_oracle(&mut self, oracle: Oracle);

  fn oracle_count(&self) -> usize;

  // ── Response windows ──────────────────────────────────────────────────

  fn response_window(&self, flight: &FlightKey) -> Option<ResponseWindow>;

  /// Open or replace the window for `window.flight`.
  fn put_response_window(&mut self, window: ResponseWindow);

  fn close_response_window(&mut self, flight: &FlightKey) -> Option<ResponseWindow>;
}
