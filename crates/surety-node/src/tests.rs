//! Node and relay tests against an in-memory journal.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use surety_core::{
  Address, ErrorKind, Genesis,
  amount::{milli, units},
  event::Event,
  flight::{FlightKey, FlightStatus},
  journal::{EventQuery, Journal, JournalEntry, RecordedEvent},
  params::Params,
  tx::{BlockInfo, Call, Transaction, TxContext},
};
use surety_store_sqlite::SqliteJournal;

use crate::{
  FixedStatus, Node, NodeError, OracleRelay, RelayConfig, Settings, Submission,
};

const DEPARTURE: u64 = 1_649_129_486;

fn airline() -> Address { Address::derive("airline", 0) }

fn passenger() -> Address { Address::derive("passenger", 0) }

fn flight() -> FlightKey { FlightKey::new(airline(), "AB721", DEPARTURE) }

fn settings(params: Params) -> Settings {
  Settings { genesis: Genesis { first_airline: airline() }, index_seed: 11, params }
}

async fn journal() -> SqliteJournal {
  SqliteJournal::open_in_memory()
    .await
    .expect("in-memory journal")
}

async fn node_on(journal: SqliteJournal, params: Params) -> Node<SqliteJournal> {
  Node::open(journal, settings(params)).await.expect("node")
}

/// Fund the genesis airline, register AB721, insure the passenger for 0.1.
async fn insured(node: &Node<SqliteJournal>) {
  node
    .submit(Submission::new(airline(), units(10), Call::FundAirline))
    .await
    .unwrap();
  node
    .submit(Submission::new(airline(), 0, Call::RegisterFlight {
      code:      "AB721".into(),
      timestamp: DEPARTURE,
    }))
    .await
    .unwrap();
  node
    .submit(Submission::new(passenger(), milli(100), Call::BuyInsurance { flight: flight() }))
    .await
    .unwrap();
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn accepted_submissions_are_journalled_in_order() {
  let j = journal().await;
  let node = node_on(j.clone(), Params::default()).await;
  insured(&node).await;

  assert_eq!(node.height().await, 3);
  let entries = j.entries(None).await.unwrap();
  assert_eq!(entries.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![1, 2, 3]);
  assert_eq!(
    entries.iter().map(|e| e.transaction.ctx.block.number).collect::<Vec<_>>(),
    vec![1, 2, 3]
  );
  assert_eq!(entries[2].transaction.ctx.caller, passenger());
}

#[tokio::test]
async fn rejected_submissions_leave_no_trace() {
  let j = journal().await;
  let node = node_on(j.clone(), Params::default()).await;

  let err = node
    .submit(Submission::new(airline(), units(3), Call::FundAirline))
    .await
    .unwrap_err();
  assert!(matches!(err, NodeError::Rejected(ref e) if e.kind() == ErrorKind::InvalidAmount));
  assert_eq!(node.height().await, 0);
  assert_eq!(j.head().await.unwrap(), 0);
  assert_eq!(node.reserve().await, 0);
}

#[tokio::test]
async fn events_are_broadcast_after_acceptance() {
  let node = node_on(journal().await, Params::default()).await;
  let mut rx = node.subscribe();

  node
    .submit(Submission::new(airline(), units(10), Call::FundAirline))
    .await
    .unwrap();
  let event = rx.recv().await.unwrap();
  assert!(matches!(event, Event::AirlineFunded { airline: a, .. } if a == airline()));
}

#[tokio::test]
async fn withdrawals_pay_into_node_balances() {
  let node = node_on(journal().await, Params { index_space: 1, ..Params::default() }).await;
  insured(&node).await;
  for n in 0..3 {
    node
      .submit(Submission::new(Address::derive("oracle", n), units(1), Call::RegisterOracle))
      .await
      .unwrap();
  }
  node
    .submit(Submission::new(passenger(), 0, Call::FetchFlightStatus { flight: flight() }))
    .await
    .unwrap();
  for n in 0..3 {
    node
      .submit(Submission::new(Address::derive("oracle", n), 0, Call::SubmitOracleResponse {
        index:  0,
        flight: flight(),
        status: FlightStatus::LateAirline.code(),
      }))
      .await
      .unwrap();
  }

  let accepted = node
    .submit(Submission::new(passenger(), 0, Call::Withdraw))
    .await
    .unwrap();
  assert!(matches!(
    accepted.receipt.events.as_slice(),
    [Event::PayoutWithdrawn { amount, .. }] if *amount == milli(150)
  ));
  assert_eq!(node.balance_of(&passenger()).await, milli(150));
}

// ─── Replay ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_replays_the_journal() {
  let j = journal().await;
  {
    let node = node_on(j.clone(), Params::default()).await;
    insured(&node).await;
  }

  let node = node_on(j, Params::default()).await;
  assert_eq!(node.height().await, 3);
  assert_eq!(node.insured_amount(&flight(), &passenger()).await, milli(100));
  assert!(node.airline(&airline()).await.is_some_and(|a| a.funded));

  // New submissions continue the sequence.
  let accepted = node
    .submit(Submission::new(Address::derive("oracle", 0), units(1), Call::RegisterOracle))
    .await
    .unwrap();
  assert_eq!(accepted.seq, 4);
  assert_eq!(accepted.block.number, 4);
}

fn raw(number: u64, caller: Address, value: u128, call: Call) -> Transaction {
  Transaction::new(
    TxContext::new(caller).with_value(value).at(BlockInfo { number, timestamp: 0 }),
    call,
  )
}

#[tokio::test]
async fn replay_refuses_a_transaction_that_fails() {
  let j = journal().await;
  j.append(raw(1, passenger(), 0, Call::Withdraw), vec![]).await.unwrap();

  let err = Node::open(j, settings(Params::default())).await.err().unwrap();
  assert!(matches!(err, NodeError::Replay { seq: 1, ref source } if source.kind() == ErrorKind::NothingToWithdraw));
}

#[tokio::test]
async fn replay_refuses_mismatched_events() {
  let j = journal().await;
  j.append(raw(1, airline(), units(10), Call::FundAirline), vec![]).await.unwrap();

  let err = Node::open(j, settings(Params::default())).await.err().unwrap();
  assert!(matches!(err, NodeError::Diverged { seq: 1 }));
}

// ─── Journal failure ─────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("disk full")]
struct DiskFull;

/// Accepts reads, refuses every write.
struct FullDisk;

impl Journal for FullDisk {
  type Error = DiskFull;

  async fn append(&self, _: Transaction, _: Vec<Event>) -> Result<JournalEntry, DiskFull> {
    Err(DiskFull)
  }

  async fn entries(&self, _: Option<u64>) -> Result<Vec<JournalEntry>, DiskFull> { Ok(vec![]) }

  async fn events(&self, _: &EventQuery) -> Result<Vec<RecordedEvent>, DiskFull> { Ok(vec![]) }

  async fn head(&self) -> Result<u64, DiskFull> { Ok(0) }
}

#[tokio::test]
async fn journal_failure_rolls_the_ledger_back() {
  let node = Node::open(FullDisk, settings(Params::default())).await.unwrap();
  let mut rx = node.subscribe();

  let err = node
    .submit(Submission::new(airline(), units(10), Call::FundAirline))
    .await
    .unwrap_err();
  assert!(matches!(err, NodeError::Journal(_)));
  assert!(node.airline(&airline()).await.is_some_and(|a| !a.funded));
  assert_eq!(node.reserve().await, 0);
  assert_eq!(node.height().await, 0);
  assert!(rx.try_recv().is_err());
}

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error("disk full")]
  DiskFull,
  #[error(transparent)]
  Store(#[from] surety_store_sqlite::Error),
}

/// A real journal whose next append can be made to fail.
struct Flaky {
  inner:     SqliteJournal,
  fail_next: Arc<AtomicBool>,
}

impl Journal for Flaky {
  type Error = FlakyError;

  async fn append(&self, tx: Transaction, events: Vec<Event>) -> Result<JournalEntry, FlakyError> {
    if self.fail_next.swap(false, Ordering::SeqCst) {
      return Err(FlakyError::DiskFull);
    }
    Ok(self.inner.append(tx, events).await?)
  }

  async fn entries(&self, after: Option<u64>) -> Result<Vec<JournalEntry>, FlakyError> {
    Ok(self.inner.entries(after).await?)
  }

  async fn events(&self, query: &EventQuery) -> Result<Vec<RecordedEvent>, FlakyError> {
    Ok(self.inner.events(query).await?)
  }

  async fn head(&self) -> Result<u64, FlakyError> { Ok(self.inner.head().await?) }
}

#[tokio::test]
async fn failed_append_rebuilds_from_the_journal() {
  let fail_next = Arc::new(AtomicBool::new(false));
  let node = Node::open(
    Flaky { inner: journal().await, fail_next: fail_next.clone() },
    settings(Params::default()),
  )
  .await
  .unwrap();
  node
    .submit(Submission::new(airline(), units(10), Call::FundAirline))
    .await
    .unwrap();

  fail_next.store(true, Ordering::SeqCst);
  let err = node
    .submit(Submission::new(airline(), 0, Call::RegisterFlight {
      code:      "AB721".into(),
      timestamp: DEPARTURE,
    }))
    .await
    .unwrap_err();
  assert!(matches!(err, NodeError::Journal(_)));
  assert_eq!(node.height().await, 1);
  assert!(node.flight_status(&flight()).await.is_err());
  assert!(node.airline(&airline()).await.is_some_and(|a| a.funded));
  assert_eq!(node.reserve().await, units(10));

  // The same submission goes through once the journal recovers.
  let accepted = node
    .submit(Submission::new(airline(), 0, Call::RegisterFlight {
      code:      "AB721".into(),
      timestamp: DEPARTURE,
    }))
    .await
    .unwrap();
  assert_eq!(accepted.seq, 2);
  assert_eq!(node.flight_status(&flight()).await.unwrap(), FlightStatus::Unknown);
}

/// Readable once at startup, then gone entirely.
struct Vanishing {
  opened: AtomicBool,
}

impl Journal for Vanishing {
  type Error = DiskFull;

  async fn append(&self, _: Transaction, _: Vec<Event>) -> Result<JournalEntry, DiskFull> {
    Err(DiskFull)
  }

  async fn entries(&self, _: Option<u64>) -> Result<Vec<JournalEntry>, DiskFull> {
    if self.opened.swap(true, Ordering::SeqCst) { Err(DiskFull) } else { Ok(vec![]) }
  }

  async fn events(&self, _: &EventQuery) -> Result<Vec<RecordedEvent>, DiskFull> { Err(DiskFull) }

  async fn head(&self) -> Result<u64, DiskFull> { Err(DiskFull) }
}

#[tokio::test]
async fn unrecoverable_journal_halts_the_node() {
  let node = Node::open(Vanishing { opened: AtomicBool::new(false) }, settings(Params::default()))
    .await
    .unwrap();

  let err = node
    .submit(Submission::new(airline(), units(10), Call::FundAirline))
    .await
    .unwrap_err();
  assert!(matches!(err, NodeError::Journal(_)));

  let err = node
    .submit(Submission::new(Address::derive("oracle", 0), units(1), Call::RegisterOracle))
    .await
    .unwrap_err();
  assert!(matches!(err, NodeError::Halted));
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn open_refuses_degenerate_params() {
  let params = Params { payout_denominator: 0, ..Params::default() };
  let err = Node::open(journal().await, settings(params)).await.err().unwrap();
  assert!(matches!(err, NodeError::Settings(ref e) if e.kind() == ErrorKind::Malformed));

  let params = Params { min_responses: 0, ..Params::default() };
  assert!(Node::open(journal().await, settings(params)).await.is_err());
}

// ─── Relay ───────────────────────────────────────────────────────────────────

fn relay_config(oracle_count: u64) -> RelayConfig {
  RelayConfig { oracle_count, ..RelayConfig::default() }
}

#[tokio::test]
async fn relay_registers_each_oracle_once() {
  let node = Arc::new(node_on(journal().await, Params::default()).await);
  let relay = OracleRelay::new(node.clone(), &relay_config(20), FixedStatus(FlightStatus::LateAirline));

  assert_eq!(relay.register().await.unwrap(), 20);
  assert_eq!(relay.register().await.unwrap(), 0);
  for oracle in relay.oracles() {
    assert!(node.oracle_indexes(oracle).await.is_some());
  }
  assert_eq!(node.reserve().await, units(20));
}

#[tokio::test]
async fn relay_answer_resolves_with_quorum() {
  // A single-slot index space makes every relay oracle hold the request.
  let node = Arc::new(node_on(journal().await, Params { index_space: 1, ..Params::default() }).await);
  insured(&node).await;
  let relay = OracleRelay::new(node.clone(), &relay_config(5), FixedStatus(FlightStatus::LateAirline));
  relay.register().await.unwrap();

  node
    .submit(Submission::new(passenger(), 0, Call::FetchFlightStatus { flight: flight() }))
    .await
    .unwrap();

  // Three answers resolve the flight; the other two are refused quietly.
  assert_eq!(relay.answer(0, &flight()).await, 3);
  assert_eq!(node.flight_status(&flight()).await.unwrap(), FlightStatus::LateAirline);
  assert_eq!(node.insurance_payout(&passenger()).await, milli(150));
}

#[tokio::test]
async fn relay_ignores_indexes_it_does_not_hold() {
  let node = Arc::new(node_on(journal().await, Params { index_space: 1, ..Params::default() }).await);
  insured(&node).await;
  let relay = OracleRelay::new(node.clone(), &relay_config(3), FixedStatus(FlightStatus::OnTime));
  relay.register().await.unwrap();

  assert_eq!(relay.answer(7, &flight()).await, 0);
  assert_eq!(node.flight_status(&flight()).await.unwrap(), FlightStatus::Unknown);
}

#[tokio::test]
async fn running_relay_answers_requests() {
  let node = Arc::new(node_on(journal().await, Params { index_space: 1, ..Params::default() }).await);
  insured(&node).await;
  let relay = OracleRelay::new(node.clone(), &relay_config(4), FixedStatus(FlightStatus::LateWeather));
  relay.register().await.unwrap();
  let task = tokio::spawn(relay.run(node.subscribe()));

  node
    .submit(Submission::new(passenger(), 0, Call::FetchFlightStatus { flight: flight() }))
    .await
    .unwrap();

  let mut status = FlightStatus::Unknown;
  for _ in 0..100 {
    status = node.flight_status(&flight()).await.unwrap();
    if status != FlightStatus::Unknown {
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  task.abort();

  assert_eq!(status, FlightStatus::LateWeather);
  // Weather delays are not the airline's fault: nothing is owed.
  assert_eq!(node.insurance_payout(&passenger()).await, 0);
}
