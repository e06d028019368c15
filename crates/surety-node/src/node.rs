//! [`Node`]: the single writer in front of the ledger.
//!
//! Every submission goes through one async mutex, which gives transactions
//! their total order. An accepted transaction is journalled before its
//! effects are published. A rejected transaction leaves the engine untouched,
//! so only a failed append needs undoing: the node then rebuilds its state
//! from the journal, keeping memory from running ahead of disk. If even that
//! fails the node halts and refuses further submissions.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use surety_core::{
  Address, Amount, Balances, FlightSurety, Genesis,
  airline::Airline,
  amount,
  event::Event,
  flight::{FlightKey, FlightStatus},
  index::HashIndexSource,
  journal::Journal,
  memory::MemoryStore,
  oracle::ResponseWindow,
  params::Params,
  tx::{BlockInfo, Call, Receipt, Transaction, TxContext},
};
use tokio::sync::{Mutex, broadcast};

use crate::{NodeError, Result};

/// The engine a node runs: in-memory state, replayable index generation.
pub type Engine = FlightSurety<MemoryStore, HashIndexSource>;

/// Capacity of the event broadcast. Slow subscribers past this lag.
const EVENT_BUFFER: usize = 1024;

// ─── Wire types ──────────────────────────────────────────────────────────────

/// A transaction as a client submits it. The node assigns the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
  pub caller: Address,
  #[serde(default, with = "amount::as_str")]
  pub value:  Amount,
  pub call:   Call,
}

impl Submission {
  pub fn new(caller: Address, value: Amount, call: Call) -> Self { Self { caller, value, call } }
}

/// An accepted, journalled transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accepted {
  pub seq:     u64,
  pub block:   BlockInfo,
  pub receipt: Receipt,
}

/// Everything needed to build a fresh engine.
#[derive(Debug, Clone)]
pub struct Settings {
  pub genesis:    Genesis,
  pub index_seed: u64,
  pub params:     Params,
}

impl Settings {
  fn engine(&self) -> Engine {
    FlightSurety::new(
      MemoryStore::new(),
      HashIndexSource::new(self.index_seed),
      self.params.clone(),
      self.genesis,
    )
  }
}

// ─── Node ────────────────────────────────────────────────────────────────────

struct State {
  engine:   Engine,
  balances: Balances,
  height:   u64,
  /// Set when the journal could not be replayed after a failed append.
  halted:   bool,
}

pub struct Node<J> {
  journal:  J,
  settings: Settings,
  state:    Mutex<State>,
  events:   broadcast::Sender<Event>,
}

impl<J: Journal> Node<J> {
  /// Rebuild the ledger from `journal` and start accepting submissions.
  ///
  /// Fails on unusable params, or if any journalled transaction no longer
  /// executes, or executes with different events than were recorded.
  pub async fn open(journal: J, settings: Settings) -> Result<Self> {
    settings.params.validate().map_err(NodeError::Settings)?;
    let state = restore(&journal, &settings).await?;

    let (events, _) = broadcast::channel(EVENT_BUFFER);
    Ok(Self { journal, settings, state: Mutex::new(state), events })
  }

  /// Events of every transaction accepted from now on.
  pub fn subscribe(&self) -> broadcast::Receiver<Event> { self.events.subscribe() }

  /// Execute, journal, then publish one transaction.
  pub async fn submit(&self, submission: Submission) -> Result<Accepted> {
    let mut state = self.state.lock().await;
    if state.halted {
      return Err(NodeError::Halted);
    }

    let number = state.height.checked_add(1).ok_or(NodeError::HeightExhausted)?;
    let block = BlockInfo { number, timestamp: Utc::now().timestamp() };
    let tx = Transaction::new(
      TxContext::new(submission.caller).with_value(submission.value).at(block),
      submission.call,
    );

    let State { engine, balances, .. } = &mut *state;
    let receipt = match engine.execute(&tx, balances) {
      Ok(r) => r,
      Err(e) => {
        tracing::debug!(call = tx.call.name(), caller = %tx.ctx.caller, error = %e, "rejected");
        return Err(e.into());
      }
    };

    let entry = match self.journal.append(tx, receipt.events.clone()).await {
      Ok(entry) => entry,
      Err(e) => {
        tracing::warn!(error = %e, "journal append failed; rebuilding ledger from journal");
        match restore(&self.journal, &self.settings).await {
          Ok(restored) => *state = restored,
          Err(rebuild) => {
            tracing::error!(error = %rebuild, "ledger could not be rebuilt; halting");
            state.halted = true;
          }
        }
        return Err(NodeError::journal(e));
      }
    };
    state.height = number;
    drop(state);

    for event in &receipt.events {
      // No subscribers is not an error.
      let _ = self.events.send(event.clone());
    }
    Ok(Accepted { seq: entry.seq, block, receipt })
  }

  // ─── Queries ───────────────────────────────────────────────────────────────

  pub async fn height(&self) -> u64 { self.state.lock().await.height }

  pub async fn is_operational(&self) -> bool { self.state.lock().await.engine.is_operational() }

  pub async fn params(&self) -> Params { self.state.lock().await.engine.params().clone() }

  pub async fn reserve(&self) -> Amount { self.state.lock().await.engine.reserve() }

  pub async fn balance_of(&self, who: &Address) -> Amount {
    self.state.lock().await.balances.balance_of(who)
  }

  pub async fn airline(&self, who: &Address) -> Option<Airline> {
    self.state.lock().await.engine.airline(who)
  }

  pub async fn flight_status(&self, flight: &FlightKey) -> surety_core::Result<FlightStatus> {
    self.state.lock().await.engine.flight_status(flight)
  }

  pub async fn insured_amount(&self, flight: &FlightKey, passenger: &Address) -> Amount {
    self.state.lock().await.engine.insured_amount(flight, passenger)
  }

  pub async fn insurance_payout(&self, passenger: &Address) -> Amount {
    self.state.lock().await.engine.insurance_payout(passenger)
  }

  pub async fn oracle_indexes(&self, oracle: &Address) -> Option<[u8; 3]> {
    self.state.lock().await.engine.oracle_indexes(oracle).ok()
  }

  pub async fn open_request(&self, flight: &FlightKey) -> Option<ResponseWindow> {
    self.state.lock().await.engine.open_request(flight)
  }
}

/// Replay every journalled transaction onto a fresh engine.
async fn restore<J: Journal>(journal: &J, settings: &Settings) -> Result<State> {
  let mut state =
    State { engine: settings.engine(), balances: Balances::new(), height: 0, halted: false };

  let entries = journal.entries(None).await.map_err(NodeError::journal)?;
  let replayed = entries.len();
  for entry in entries {
    let receipt = state
      .engine
      .execute(&entry.transaction, &mut state.balances)
      .map_err(|source| NodeError::Replay { seq: entry.seq, source })?;
    if receipt.events != entry.events {
      return Err(NodeError::Diverged { seq: entry.seq });
    }
    state.height = entry.transaction.ctx.block.number;
  }
  tracing::info!(replayed, height = state.height, "ledger restored from journal");
  Ok(state)
}
