//! Oracle registration and flight-status aggregation.

use super::FlightSurety;
use crate::{
  Error, Result,
  event::Event,
  flight::{FlightKey, FlightStatus},
  index::IndexSource,
  oracle::{Oracle, ResponseOutcome, ResponseWindow},
  store::LedgerStore,
  tx::TxContext,
};

impl<S: LedgerStore, I: IndexSource> FlightSurety<S, I> {
  /// Enrol the caller as an oracle and assign its index triple.
  pub fn register_oracle(&mut self, ctx: &TxContext) -> Result<[u8; 3]> {
    self.require_operational()?;

    if self.store.oracle(&ctx.caller).is_some() {
      return Err(Error::OracleAlreadyRegistered(ctx.caller));
    }
    if ctx.value != self.params.registration_fee {
      return Err(Error::InvalidAmount {
        got:    ctx.value,
        reason: "registration requires exactly the registration fee",
      });
    }

    self.deposit(ctx.value)?;
    let indexes = self
      .indexes
      .index_triple(&ctx.caller, &ctx.block, self.params.index_space);
    self.store.put_oracle(Oracle { address: ctx.caller, indexes });
    self.emit(Event::OracleRegistered { oracle: ctx.caller, indexes });
    Ok(indexes)
  }

  /// Open a status request for `flight`, discarding any stale one.
  ///
  /// Returns the index that oracles must hold to answer.
  pub fn fetch_flight_status(&mut self, ctx: &TxContext, flight: &FlightKey) -> Result<u8> {
    self.require_operational()?;

    let record = self
      .store
      .flight(flight)
      .ok_or_else(|| Error::FlightNotFound(flight.clone()))?;
    if record.is_resolved() {
      return Err(Error::AlreadyResolved(flight.clone()));
    }

    let index = self
      .indexes
      .next_index(&ctx.caller, &ctx.block, self.params.index_space);
    self.store.put_response_window(ResponseWindow::open(
      index,
      flight.clone(),
      ctx.caller,
      ctx.block.number,
    ));
    self.emit(Event::OracleRequest { index, flight: flight.clone() });
    Ok(index)
  }

  /// Count the caller's vote that `flight` has status `code`.
  ///
  /// The first status to collect `min_responses` distinct oracles resolves
  /// the flight. Resolution is final: the window closes, and a late-airline
  /// status credits every policy on the flight within this same call.
  pub fn submit_oracle_response(
    &mut self,
    ctx: &TxContext,
    index: u8,
    flight: &FlightKey,
    code: u8,
  ) -> Result<ResponseOutcome> {
    self.require_operational()?;

    let oracle = self
      .store
      .oracle(&ctx.caller)
      .ok_or(Error::Unauthorized(ctx.caller, "not a registered oracle"))?;
    if !oracle.holds(index) {
      return Err(Error::IndexMismatch { index, reason: "not assigned to this oracle" });
    }
    let mut record = self
      .store
      .flight(flight)
      .ok_or_else(|| Error::FlightNotFound(flight.clone()))?;
    if record.is_resolved() {
      return Err(Error::AlreadyResolved(flight.clone()));
    }
    let mut window = match self.store.response_window(flight) {
      Some(w) if w.index == index => w,
      Some(_) => {
        return Err(Error::IndexMismatch { index, reason: "not the open request's index" });
      }
      None => return Err(Error::IndexMismatch { index, reason: "no open request" }),
    };
    let status = FlightStatus::try_from(code)?;
    if !status.is_terminal() {
      return Err(Error::InvalidStatusCode(code));
    }

    let required = self.params.min_responses;
    let votes = window.record(ctx.caller, status);
    if votes < required {
      self.store.put_response_window(window);
      self.emit(Event::OracleReport { oracle: ctx.caller, flight: flight.clone(), status });
      return Ok(ResponseOutcome::Recorded { status, votes, required });
    }

    // Quorum. Validate the payouts before touching anything.
    let payouts = self.planned_payouts(flight, status.pays_out())?;

    record.status = status;
    record.resolved_at = Some(ctx.block.number);
    self.store.put_flight(record);
    self.store.close_response_window(flight);
    self.emit(Event::OracleReport { oracle: ctx.caller, flight: flight.clone(), status });
    self.emit(Event::FlightStatusResolved { flight: flight.clone(), status });
    self.credit_payouts(payouts);
    Ok(ResponseOutcome::Resolved { status })
  }
}
