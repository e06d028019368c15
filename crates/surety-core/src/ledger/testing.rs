//! Shared fixtures for ledger tests.

use std::collections::VecDeque;

use crate::{
  Result,
  address::Address,
  amount::{Amount, milli},
  flight::FlightKey,
  index::IndexSource,
  ledger::{Balances, FlightSurety, Genesis},
  memory::MemoryStore,
  params::Params,
  tx::{BlockInfo, Call, Receipt, Transaction, TxContext},
};

pub const DEPARTURE: u64 = 1_649_129_486;

pub fn airline(n: u64) -> Address { Address::derive("airline", n) }

pub fn passenger(n: u64) -> Address { Address::derive("passenger", n) }

pub fn oracle(n: u64) -> Address { Address::derive("oracle", n) }

/// Hands out pre-arranged indexes, then zeros.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
  queue: VecDeque<u8>,
}

impl Scripted {
  pub fn push(&mut self, indexes: impl IntoIterator<Item = u8>) {
    self.queue.extend(indexes);
  }
}

impl IndexSource for Scripted {
  fn next_index(&mut self, _caller: &Address, _block: &BlockInfo, _space: u8) -> u8 {
    self.queue.pop_front().unwrap_or(0)
  }
}

pub type TestLedger = FlightSurety<MemoryStore, Scripted>;

/// A ledger plus the external balances its withdrawals pay into.
pub struct Harness {
  pub ledger:   TestLedger,
  pub balances: Balances,
  block:        u64,
}

impl Harness {
  pub fn new() -> Self { Self::with_params(Params::default()) }

  pub fn with_params(params: Params) -> Self {
    let ledger = FlightSurety::new(
      MemoryStore::new(),
      Scripted::default(),
      params,
      Genesis { first_airline: airline(0) },
    );
    Self { ledger, balances: Balances::new(), block: 0 }
  }

  /// Script the next indexes the ledger will draw.
  pub fn script(&mut self, indexes: impl IntoIterator<Item = u8>) {
    self.ledger.indexes.push(indexes);
  }

  pub fn ctx(&mut self, caller: Address, value: Amount) -> TxContext {
    self.block += 1;
    TxContext::new(caller)
      .with_value(value)
      .at(BlockInfo { number: self.block, timestamp: DEPARTURE as i64 + self.block as i64 })
  }

  pub fn call(&mut self, caller: Address, value: Amount, call: Call) -> Result<Receipt> {
    let tx = Transaction::new(self.ctx(caller, value), call);
    self.ledger.execute(&tx, &mut self.balances)
  }

  pub fn fund(&mut self, who: Address) -> Result<Receipt> {
    let fee = self.ledger.params().funding_fee;
    self.call(who, fee, Call::FundAirline)
  }

  /// Fund the genesis airline, then register and fund `airline(1..n)`.
  /// Only valid while `n` does not exceed the bootstrap threshold.
  pub fn active_airlines(&mut self, n: u64) -> Vec<Address> {
    self.fund(airline(0)).unwrap();
    for i in 1..n {
      self
        .call(airline(0), 0, Call::RegisterAirline { candidate: airline(i) })
        .unwrap();
      self.fund(airline(i)).unwrap();
    }
    (0..n).map(airline).collect()
  }

  pub fn flight(&mut self, owner: Address, code: &str) -> FlightKey {
    self
      .call(owner, 0, Call::RegisterFlight { code: code.into(), timestamp: DEPARTURE })
      .unwrap();
    FlightKey::new(owner, code, DEPARTURE)
  }

  pub fn insure(&mut self, who: Address, flight: &FlightKey, amount: Amount) -> Result<Receipt> {
    self.call(who, amount, Call::BuyInsurance { flight: flight.clone() })
  }

  /// Register `oracle(0..n)` with the given triples.
  pub fn oracles(&mut self, triples: &[[u8; 3]]) -> Vec<Address> {
    let fee = self.ledger.registration_fee();
    triples
      .iter()
      .enumerate()
      .map(|(n, triple)| {
        self.script(*triple);
        let who = oracle(n as u64);
        self.call(who, fee, Call::RegisterOracle).unwrap();
        who
      })
      .collect()
  }

  /// Open a request for `flight` that will carry `index`.
  pub fn request(&mut self, flight: &FlightKey, index: u8) -> Result<Receipt> {
    self.script([index]);
    self.call(passenger(0), 0, Call::FetchFlightStatus { flight: flight.clone() })
  }

  pub fn respond(&mut self, who: Address, index: u8, flight: &FlightKey, status: u8) -> Result<Receipt> {
    self.call(who, 0, Call::SubmitOracleResponse { index, flight: flight.clone(), status })
  }

  /// Everything up to an insured, registered flight with an open request on
  /// index 7 and five oracles holding it.
  pub fn insured_flight(&mut self) -> (FlightKey, Vec<Address>) {
    self.active_airlines(1);
    let flight = self.flight(airline(0), "AB721");
    self.insure(passenger(1), &flight, milli(100)).unwrap();
    let oracles = self.oracles(&[[7, 1, 2]; 5]);
    self.request(&flight, 7).unwrap();
    (flight, oracles)
  }
}
