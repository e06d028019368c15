//! Flight registry.

use super::FlightSurety;
use crate::{
  Error, Result,
  event::Event,
  flight::{Flight, FlightKey},
  index::IndexSource,
  store::LedgerStore,
  tx::TxContext,
};

impl<S: LedgerStore, I: IndexSource> FlightSurety<S, I> {
  /// Register the caller's flight `code` departing at `timestamp`.
  pub fn register_flight(&mut self, ctx: &TxContext, code: &str, timestamp: u64) -> Result<FlightKey> {
    self.require_operational()?;
    self.require_active_airline(ctx)?;

    let key = FlightKey::new(ctx.caller, code, timestamp);
    if self.store.flight(&key).is_some() {
      return Err(Error::FlightAlreadyRegistered(key));
    }

    self.store.put_flight(Flight::new(key.clone()));
    self.emit(Event::FlightRegistered { flight: key.clone() });
    Ok(key)
  }
}
