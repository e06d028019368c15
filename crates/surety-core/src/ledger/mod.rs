//! [`FlightSurety`]: the state ledger and consensus engine.
//!
//! Every mutating operation follows the same shape: check the operational
//! guard, validate every precondition against the store, and only then
//! write. A returned `Err` therefore means nothing was written. The one
//! operation that calls out of the engine, [`FlightSurety::withdraw`], writes
//! its effects before the call and rolls the whole engine back if the call
//! fails. That rollback is a clone of the engine, hence the `Clone` bounds on
//! `withdraw` and [`FlightSurety::execute`].
//!
//! Operations are grouped by component:
//!
//! | Module        | Operations |
//! |---------------|------------|
//! | `membership`  | `set_operational_status`, `register_airline`, `fund_airline` |
//! | `flights`     | `register_flight` |
//! | `insurance`   | `buy_insurance`, `withdraw` (and payout crediting) |
//! | `oracles`     | `register_oracle`, `fetch_flight_status`, `submit_oracle_response` |

mod flights;
mod insurance;
mod membership;
mod oracles;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  address::Address,
  airline::Airline,
  amount::Amount,
  error::TransferError,
  event::Event,
  flight::{Flight, FlightKey, FlightStatus},
  guard::MultipartySwitch,
  index::IndexSource,
  insurance::InsurancePolicy,
  oracle::ResponseWindow,
  params::Params,
  store::LedgerStore,
  tx::{Call, Outcome, Receipt, Transaction, TxContext},
};

// ─── Transfers ───────────────────────────────────────────────────────────────

/// Moves native value out of the ledger to an external account.
///
/// A transfer receives the ledger itself, because the receiving side of a
/// real transfer can run arbitrary code, including calls back into the
/// ledger.
pub trait Transfer<L: ?Sized> {
  fn send(&mut self, ledger: &mut L, to: Address, amount: Amount) -> Result<(), TransferError>;
}

impl<L: ?Sized, F> Transfer<L> for F
where
  F: FnMut(&mut L, Address, Amount) -> Result<(), TransferError>,
{
  fn send(&mut self, ledger: &mut L, to: Address, amount: Amount) -> Result<(), TransferError> {
    self(ledger, to, amount)
  }
}

/// External account balances, credited by transfers out of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
  accounts: BTreeMap<Address, Amount>,
}

impl Balances {
  pub fn new() -> Self { Self::default() }

  pub fn balance_of(&self, address: &Address) -> Amount {
    self.accounts.get(address).copied().unwrap_or(0)
  }
}

impl<L: ?Sized> Transfer<L> for Balances {
  fn send(&mut self, _ledger: &mut L, to: Address, amount: Amount) -> Result<(), TransferError> {
    let balance = self.accounts.entry(to).or_default();
    *balance = balance
      .checked_add(amount)
      .ok_or_else(|| TransferError(format!("balance overflow for {to}")))?;
    Ok(())
  }
}

// ─── Genesis ─────────────────────────────────────────────────────────────────

/// Initial ledger contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
  /// Registered (unfunded) at creation, so the consortium can bootstrap.
  pub first_airline: Address,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The flight-insurance ledger.
///
/// Generic over its storage and its oracle index source. Cloning (when both
/// are `Clone`) snapshots the entire ledger.
#[derive(Debug, Clone)]
pub struct FlightSurety<S, I> {
  store:       S,
  indexes:     I,
  params:      Params,
  operational: MultipartySwitch,
  reserve:     Amount,
  pending:     Vec<Event>,
}

impl<S: LedgerStore, I: IndexSource> FlightSurety<S, I> {
  pub fn new(mut store: S, indexes: I, params: Params, genesis: Genesis) -> Self {
    store.put_airline(Airline::registered(genesis.first_airline));
    let operational = MultipartySwitch::new(true, params.ops_quorum);
    Self { store, indexes, params, operational, reserve: 0, pending: Vec::new() }
  }

  pub fn params(&self) -> &Params { &self.params }

  pub fn store(&self) -> &S { &self.store }

  // ── Transactions ──────────────────────────────────────────────────────

  /// Execute one ledger transaction.
  ///
  /// On success the receipt carries exactly the events this transaction
  /// emitted. On failure no events survive.
  pub fn execute<T>(&mut self, tx: &Transaction, transfer: &mut T) -> Result<Receipt>
  where
    T: Transfer<Self>,
    S: Clone,
    I: Clone,
  {
    self.pending.clear();
    let result = self.dispatch(tx, transfer);
    let events = std::mem::take(&mut self.pending);
    result.map(|outcome| Receipt { outcome, events })
  }

  fn dispatch<T>(&mut self, tx: &Transaction, transfer: &mut T) -> Result<Outcome>
  where
    T: Transfer<Self>,
    S: Clone,
    I: Clone,
  {
    let ctx = &tx.ctx;
    // Voting is the way back from a disabled ledger; everything else checks
    // the flag before looking at the call.
    if !matches!(tx.call, Call::SetOperationalStatus { .. }) {
      self.require_operational()?;
    }
    if ctx.value > 0 && !tx.call.is_payable() {
      return Err(Error::InvalidAmount {
        got:    ctx.value,
        reason: "operation does not accept value",
      });
    }

    Ok(match &tx.call {
      Call::SetOperationalStatus { desired } => {
        self.set_operational_status(ctx, *desired)?;
        Outcome::Done
      }
      Call::RegisterAirline { candidate } => {
        Outcome::Airline(self.register_airline(ctx, *candidate)?)
      }
      Call::FundAirline => {
        self.fund_airline(ctx)?;
        Outcome::Done
      }
      Call::RegisterFlight { code, timestamp } => {
        self.register_flight(ctx, code, *timestamp)?;
        Outcome::Done
      }
      Call::BuyInsurance { flight } => {
        self.buy_insurance(ctx, flight)?;
        Outcome::Done
      }
      Call::RegisterOracle => Outcome::Indexes(self.register_oracle(ctx)?),
      Call::FetchFlightStatus { flight } => Outcome::Requested {
        index: self.fetch_flight_status(ctx, flight)?,
      },
      Call::SubmitOracleResponse { index, flight, status } => {
        Outcome::Response(self.submit_oracle_response(ctx, *index, flight, *status)?)
      }
      Call::Withdraw => Outcome::Withdrawn(self.withdraw(ctx, transfer)?),
    })
  }

  /// Drain events emitted by operations called directly (outside
  /// [`execute`](Self::execute)).
  pub fn take_events(&mut self) -> Vec<Event> { std::mem::take(&mut self.pending) }

  fn emit(&mut self, event: Event) { self.pending.push(event); }

  fn require_operational(&self) -> Result<()> {
    if self.operational.is_on() { Ok(()) } else { Err(Error::OperationalDisabled) }
  }

  fn require_active_airline(&self, ctx: &TxContext) -> Result<Airline> {
    match self.store.airline(&ctx.caller) {
      Some(a) if a.is_active() => Ok(a),
      Some(a) if a.registered => Err(Error::Unauthorized(ctx.caller, "airline is not funded")),
      _ => Err(Error::Unauthorized(ctx.caller, "not a registered airline")),
    }
  }

  fn deposit(&mut self, amount: Amount) -> Result<()> {
    self.reserve = self.reserve.checked_add(amount).ok_or(Error::InvalidAmount {
      got:    amount,
      reason: "reserve overflow",
    })?;
    Ok(())
  }

  // ── Queries ───────────────────────────────────────────────────────────
  //
  // Queries never consult the operational flag.

  pub fn is_operational(&self) -> bool { self.operational.is_on() }

  pub fn reserve(&self) -> Amount { self.reserve }

  pub fn airline(&self, address: &Address) -> Option<Airline> { self.store.airline(address) }

  pub fn is_airline_registered(&self, address: &Address) -> bool {
    self.store.airline(address).is_some_and(|a| a.registered)
  }

  pub fn is_airline_funded(&self, address: &Address) -> bool {
    self.store.airline(address).is_some_and(|a| a.funded)
  }

  pub fn registered_airline_count(&self) -> usize { self.store.registered_airline_count() }

  pub fn flight(&self, key: &FlightKey) -> Option<Flight> { self.store.flight(key) }

  pub fn is_flight_registered(&self, key: &FlightKey) -> bool { self.store.flight(key).is_some() }

  pub fn flight_status(&self, key: &FlightKey) -> Result<FlightStatus> {
    self
      .store
      .flight(key)
      .map(|f| f.status)
      .ok_or_else(|| Error::FlightNotFound(key.clone()))
  }

  pub fn policy(&self, key: &FlightKey, passenger: &Address) -> Option<InsurancePolicy> {
    self.store.policy(key, passenger)
  }

  pub fn is_insured(&self, key: &FlightKey, passenger: &Address) -> bool {
    self.insured_amount(key, passenger) > 0
  }

  pub fn insured_amount(&self, key: &FlightKey, passenger: &Address) -> Amount {
    self.store.policy(key, passenger).map_or(0, |p| p.insured_amount)
  }

  /// Total credited and not yet withdrawn across all of `passenger`'s
  /// policies.
  pub fn insurance_payout(&self, passenger: &Address) -> Amount {
    self
      .store
      .policies_of(passenger)
      .iter()
      .fold(0, |acc: Amount, p| acc.saturating_add(p.credited_amount))
  }

  pub fn oracle_count(&self) -> usize { self.store.oracle_count() }

  pub fn oracle_indexes(&self, oracle: &Address) -> Result<[u8; 3]> {
    self
      .store
      .oracle(oracle)
      .map(|o| o.indexes)
      .ok_or(Error::OracleNotFound(*oracle))
  }

  pub fn registration_fee(&self) -> Amount { self.params.registration_fee }

  pub fn open_request(&self, key: &FlightKey) -> Option<ResponseWindow> {
    self.store.response_window(key)
  }
}

#[cfg(test)]
pub(crate) mod testing;
