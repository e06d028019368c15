//! Operational guard, airline admission and funding.

use super::FlightSurety;
use crate::{
  Error, Result,
  address::Address,
  airline::{Airline, Registration},
  event::Event,
  guard::SwitchVote,
  index::IndexSource,
  store::LedgerStore,
  tx::TxContext,
};

impl<S: LedgerStore, I: IndexSource> FlightSurety<S, I> {
  /// Vote to set the operational flag to `desired`.
  ///
  /// The only mutating operation that runs while operations are disabled,
  /// since it is the way back.
  pub fn set_operational_status(&mut self, ctx: &TxContext, desired: bool) -> Result<SwitchVote> {
    let vote = self.operational.vote(ctx.caller, desired);
    if vote == SwitchVote::Flipped {
      self.emit(Event::OperationalStatusChanged { operational: desired });
    }
    Ok(vote)
  }

  /// Register `candidate`, or record the caller's approval of it.
  ///
  /// While fewer than `airline_bootstrap` airlines are registered any active
  /// airline admits a candidate on its own. Past that, a candidate needs
  /// approvals from a strict majority of registered airlines.
  pub fn register_airline(&mut self, ctx: &TxContext, candidate: Address) -> Result<Registration> {
    self.require_operational()?;
    self.require_active_airline(ctx)?;

    let mut entry = self
      .store
      .airline(&candidate)
      .unwrap_or_else(|| Airline::candidate(candidate));
    if entry.registered {
      return Err(Error::AirlineAlreadyRegistered(candidate));
    }

    let registered = self.store.registered_airline_count();
    if registered < self.params.airline_bootstrap {
      self.admit(entry, ctx.caller);
      return Ok(Registration::Registered);
    }

    let required = registered / 2 + 1;
    entry.votes.insert(ctx.caller);
    let votes = entry.votes.len();
    if votes >= required {
      self.admit(entry, ctx.caller);
      return Ok(Registration::Registered);
    }

    self.store.put_airline(entry);
    self.emit(Event::AirlineVoted { candidate, voter: ctx.caller, votes, required });
    Ok(Registration::Pending { votes, required })
  }

  fn admit(&mut self, mut entry: Airline, sponsor: Address) {
    let airline = entry.address;
    entry.registered = true;
    entry.votes.clear();
    self.store.put_airline(entry);
    self.emit(Event::AirlineRegistered { airline, sponsor });
  }

  /// Pay the funding fee. Funding is exact and happens once.
  pub fn fund_airline(&mut self, ctx: &TxContext) -> Result<()> {
    self.require_operational()?;

    let mut airline = match self.store.airline(&ctx.caller) {
      Some(a) if a.registered => a,
      _ => return Err(Error::Unauthorized(ctx.caller, "not a registered airline")),
    };
    if airline.funded {
      return Err(Error::AirlineAlreadyFunded(ctx.caller));
    }
    if ctx.value != self.params.funding_fee {
      return Err(Error::InvalidAmount {
        got:    ctx.value,
        reason: "funding requires exactly the funding fee",
      });
    }

    self.deposit(ctx.value)?;
    airline.funded = true;
    self.store.put_airline(airline);
    self.emit(Event::AirlineFunded { airline: ctx.caller, amount: ctx.value });
    Ok(())
  }
}
