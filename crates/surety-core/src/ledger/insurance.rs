//! Insurance purchase, payout crediting and withdrawal.

use super::{FlightSurety, Transfer};
use crate::{
  Error, Result,
  amount::Amount,
  event::Event,
  flight::FlightKey,
  index::IndexSource,
  insurance::InsurancePolicy,
  store::LedgerStore,
  tx::TxContext,
};

impl<S: LedgerStore, I: IndexSource> FlightSurety<S, I> {
  /// Insure the caller on `flight` for the attached value.
  ///
  /// Repeat purchases add to the existing policy; the cap applies to the
  /// policy total.
  pub fn buy_insurance(&mut self, ctx: &TxContext, flight: &FlightKey) -> Result<Amount> {
    self.require_operational()?;

    let record = self
      .store
      .flight(flight)
      .ok_or_else(|| Error::FlightNotFound(flight.clone()))?;
    if record.is_resolved() {
      return Err(Error::AlreadyResolved(flight.clone()));
    }
    if ctx.value == 0 {
      return Err(Error::InvalidAmount { got: 0, reason: "insurance requires a premium" });
    }

    let mut policy = self
      .store
      .policy(flight, &ctx.caller)
      .unwrap_or_else(|| InsurancePolicy::new(ctx.caller, flight.clone()));
    let insured = policy
      .insured_amount
      .checked_add(ctx.value)
      .filter(|total| *total <= self.params.max_insurance)
      .ok_or(Error::InvalidAmount {
        got:    ctx.value,
        reason: "policy total would exceed the insurance cap",
      })?;

    self.deposit(ctx.value)?;
    policy.insured_amount = insured;
    self.store.put_policy(policy);
    self.emit(Event::InsurancePurchased {
      flight: flight.clone(),
      passenger: ctx.caller,
      amount: ctx.value,
      insured,
    });
    Ok(insured)
  }

  /// Credit every policy on a flight that just resolved.
  ///
  /// Called only from the one-shot resolution in `submit_oracle_response`,
  /// after the payout amounts were validated by [`Self::planned_payouts`].
  pub(super) fn credit_payouts(&mut self, payouts: Vec<(InsurancePolicy, Amount)>) {
    for (mut policy, amount) in payouts {
      policy.credited_amount = amount;
      policy.resolved = true;
      let event = (amount > 0).then(|| Event::InsureeCredited {
        flight: policy.flight.clone(),
        passenger: policy.passenger,
        amount,
      });
      self.store.put_policy(policy);
      if let Some(event) = event {
        self.emit(event);
      }
    }
  }

  /// Compute what each policy on `flight` is owed if it resolves with a
  /// payout. Fails without side effects on arithmetic overflow.
  pub(super) fn planned_payouts(
    &self,
    flight: &FlightKey,
    pays_out: bool,
  ) -> Result<Vec<(InsurancePolicy, Amount)>> {
    self
      .store
      .policies_for_flight(flight)
      .into_iter()
      .map(|policy| {
        let amount = if pays_out {
          self
            .params
            .payout_for(policy.insured_amount)
            .ok_or(Error::InvalidAmount {
              got:    policy.insured_amount,
              reason: "payout overflows",
            })?
        } else {
          0
        };
        Ok((policy, amount))
      })
      .collect()
  }

  /// Pay out everything credited to the caller.
  ///
  /// The credited balance is zeroed *before* `transfer` runs, so a transfer
  /// that calls back into `withdraw` finds nothing left. If the transfer
  /// fails the ledger is returned to its state before the call, including
  /// anything the transfer itself wrote, and the call fails.
  pub fn withdraw<T>(&mut self, ctx: &TxContext, transfer: &mut T) -> Result<Amount>
  where
    T: Transfer<Self>,
    S: Clone,
    I: Clone,
  {
    self.require_operational()?;

    let credited: Vec<InsurancePolicy> = self
      .store
      .policies_of(&ctx.caller)
      .into_iter()
      .filter(|p| p.credited_amount > 0)
      .collect();
    let amount = credited
      .iter()
      .try_fold(0 as Amount, |acc, p| acc.checked_add(p.credited_amount))
      .ok_or(Error::InvalidAmount { got: Amount::MAX, reason: "payout total overflows" })?;
    if amount == 0 {
      return Err(Error::NothingToWithdraw(ctx.caller));
    }
    if self.reserve < amount {
      return Err(Error::InsufficientReserve { reserve: self.reserve, requested: amount });
    }

    // A re-entering transfer may write anywhere, so a failed transfer
    // restores the whole engine, not just the credits.
    let before = self.clone();

    // Effects.
    self.reserve -= amount;
    for policy in credited {
      self.store.put_policy(InsurancePolicy { credited_amount: 0, ..policy });
    }

    // Interaction.
    if let Err(e) = transfer.send(self, ctx.caller, amount) {
      *self = before;
      return Err(e.into());
    }

    self.emit(Event::PayoutWithdrawn { passenger: ctx.caller, amount });
    Ok(amount)
  }
}
