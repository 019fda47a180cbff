// crates/weir-escrow/src/ledger.rs
//
// The escrowed stake ledger.
//
// Accounts lock settlement-asset principal for a chosen duration and
// receive a non-transferable weight balance of
// principal * boost(duration). Every weight change is checkpointed per
// account and in a parallel total series, so downstream distributors can
// ask "what was this account's weight when that deposit happened".
//
// One lock per account. A lock's principal may only grow and its unlock
// point may only move later; an expired lock must be fully unlocked before
// the account can lock again.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use weir_core::asset::AssetTransfer;
use weir_core::auth::{AuthContext, Capability};
use weir_core::error::WeirError;
use weir_core::oracle::WeightOracle;
use weir_core::types::{AccountId, Amount, SequencePoint};

use crate::boost::{boost_bps, boost_bps_remaining, weight_for, MAX_LOCK_SECS};
use crate::checkpoint::CheckpointSeries;

/// An account's active lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    /// Escrowed principal, always > 0 while the lock exists.
    pub principal: Amount,
    /// Sequence point after which the principal may be withdrawn.
    pub unlock_at: SequencePoint,
}

/// The escrow ledger: locks, weight balances, and checkpoint histories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowLedger {
    /// Account that holds all escrowed principal.
    escrow_account: AccountId,
    /// Active locks, one per account.
    locks: HashMap<AccountId, Lock>,
    /// Current weight balances.
    weights: HashMap<AccountId, Amount>,
    /// Per-account weight history.
    account_checkpoints: HashMap<AccountId, CheckpointSeries>,
    /// History of the sum of all accounts' weight.
    total_checkpoints: CheckpointSeries,
    /// Current sum of all accounts' weight.
    total_weight: Amount,
}

impl EscrowLedger {
    /// Create a ledger whose escrowed principal is held by `escrow_account`.
    pub fn new(escrow_account: AccountId) -> Self {
        Self {
            escrow_account,
            locks: HashMap::new(),
            weights: HashMap::new(),
            account_checkpoints: HashMap::new(),
            total_checkpoints: CheckpointSeries::new(),
            total_weight: 0,
        }
    }

    /// Lock `principal` until `unlock_at`, minting weight.
    ///
    /// Returns the weight minted.
    ///
    /// # Errors
    /// Rejects a zero principal, an existing active lock, and a duration
    /// outside the `[MIN_LOCK_SECS, MAX_LOCK_SECS]` bounds (out-of-bounds
    /// durations are rejected, never clamped).
    pub fn lock(
        &mut self,
        asset: &mut dyn AssetTransfer,
        caller: &AccountId,
        principal: Amount,
        unlock_at: SequencePoint,
        now: SequencePoint,
    ) -> Result<Amount, WeirError> {
        if principal == 0 {
            return Err(WeirError::InvalidInput(
                "lock principal must be greater than zero".to_string(),
            ));
        }
        if self.locks.contains_key(caller) {
            return Err(WeirError::InvalidState(
                "account already holds an active lock".to_string(),
            ));
        }
        if unlock_at <= now {
            return Err(WeirError::InvalidInput(
                "unlock point must be in the future".to_string(),
            ));
        }
        let boost = boost_bps(unlock_at - now)?;
        self.ensure_monotonic(caller, now)?;

        asset.transfer(caller, &self.escrow_account, principal)?;

        let weight = weight_for(principal, boost);
        self.locks.insert(
            *caller,
            Lock {
                principal,
                unlock_at,
            },
        );
        self.set_weight(caller, weight, now)?;
        Ok(weight)
    }

    /// Add principal to the caller's active lock.
    ///
    /// The boost is recomputed for the *remaining* duration, so the new
    /// weight is the total principal times the current boost.
    ///
    /// # Errors
    /// Rejects a zero amount, a missing lock, and an expired lock (which
    /// must be unlocked and re-locked instead of silently revived).
    pub fn increase_amount(
        &mut self,
        asset: &mut dyn AssetTransfer,
        caller: &AccountId,
        add: Amount,
        now: SequencePoint,
    ) -> Result<Amount, WeirError> {
        if add == 0 {
            return Err(WeirError::InvalidInput(
                "additional principal must be greater than zero".to_string(),
            ));
        }
        let lock = self.active_lock(caller, now)?;
        let new_principal = lock.principal + add;
        let boost = boost_bps_remaining(lock.unlock_at - now);
        self.ensure_monotonic(caller, now)?;

        asset.transfer(caller, &self.escrow_account, add)?;

        let weight = weight_for(new_principal, boost);
        self.locks
            .get_mut(caller)
            .ok_or_else(|| WeirError::NotFound("no active lock for account".to_string()))?
            .principal = new_principal;
        self.set_weight(caller, weight, now)?;
        Ok(weight)
    }

    /// Move the caller's unlock point later.
    ///
    /// # Errors
    /// Rejects a missing or expired lock, a non-increasing unlock point,
    /// and an unlock point beyond `now + MAX_LOCK_SECS`.
    pub fn extend_lock(
        &mut self,
        caller: &AccountId,
        new_unlock_at: SequencePoint,
        now: SequencePoint,
    ) -> Result<Amount, WeirError> {
        let lock = self.active_lock(caller, now)?;
        if new_unlock_at <= lock.unlock_at {
            return Err(WeirError::InvalidInput(
                "new unlock point must be later than the current one".to_string(),
            ));
        }
        if new_unlock_at - now > MAX_LOCK_SECS {
            return Err(WeirError::InvalidInput(format!(
                "new unlock point exceeds the maximum lock duration of {}s",
                MAX_LOCK_SECS
            )));
        }
        self.ensure_monotonic(caller, now)?;

        let boost = boost_bps_remaining(new_unlock_at - now);
        let weight = weight_for(lock.principal, boost);
        self.locks
            .get_mut(caller)
            .ok_or_else(|| WeirError::NotFound("no active lock for account".to_string()))?
            .unlock_at = new_unlock_at;
        self.set_weight(caller, weight, now)?;
        Ok(weight)
    }

    /// Withdraw the full principal of an expired lock, burning all weight.
    ///
    /// Principal is returned 1:1; no penalty, no yield.
    ///
    /// # Errors
    /// Rejects a missing lock and a lock whose unlock point has not passed.
    pub fn unlock(
        &mut self,
        asset: &mut dyn AssetTransfer,
        caller: &AccountId,
        now: SequencePoint,
    ) -> Result<Amount, WeirError> {
        let lock = *self
            .locks
            .get(caller)
            .ok_or_else(|| WeirError::NotFound("no active lock for account".to_string()))?;
        if now < lock.unlock_at {
            return Err(WeirError::InvalidState(format!(
                "lock does not expire until sequence point {}",
                lock.unlock_at
            )));
        }
        self.ensure_monotonic(caller, now)?;
        if asset.balance_of(&self.escrow_account) < lock.principal {
            return Err(WeirError::InvalidState(
                "escrow account cannot cover the locked principal".to_string(),
            ));
        }

        // State first, transfer last.
        self.locks.remove(caller);
        self.set_weight(caller, 0, now)?;
        asset.transfer(&self.escrow_account, caller, lock.principal)?;
        Ok(lock.principal)
    }

    /// Administrative weight mint, gated by `Capability::ManageWeight`.
    pub fn mint_weight(
        &mut self,
        auth: &AuthContext,
        account: &AccountId,
        amount: Amount,
        now: SequencePoint,
    ) -> Result<(), WeirError> {
        auth.require(Capability::ManageWeight)?;
        if amount == 0 {
            return Err(WeirError::InvalidInput(
                "mint amount must be greater than zero".to_string(),
            ));
        }
        self.ensure_monotonic(account, now)?;
        let weight = self.current_weight(account) + amount;
        self.set_weight(account, weight, now)
    }

    /// Administrative weight burn, gated by `Capability::ManageWeight`.
    pub fn burn_weight(
        &mut self,
        auth: &AuthContext,
        account: &AccountId,
        amount: Amount,
        now: SequencePoint,
    ) -> Result<(), WeirError> {
        auth.require(Capability::ManageWeight)?;
        if amount == 0 {
            return Err(WeirError::InvalidInput(
                "burn amount must be greater than zero".to_string(),
            ));
        }
        let current = self.current_weight(account);
        if amount > current {
            return Err(WeirError::InvalidState(format!(
                "cannot burn {} weight; account holds {}",
                amount, current
            )));
        }
        self.ensure_monotonic(account, now)?;
        self.set_weight(account, current - amount, now)
    }

    /// Weight balances cannot be moved between accounts.
    ///
    /// Weight is created only by locking principal and destroyed only by
    /// unlocking it (or the gated administrative burn); a direct transfer
    /// always fails.
    pub fn transfer_weight(
        &self,
        _from: &AccountId,
        _to: &AccountId,
        _amount: Amount,
    ) -> Result<(), WeirError> {
        Err(WeirError::NonTransferable(
            "weight balances cannot be transferred between accounts".to_string(),
        ))
    }

    /// The caller's active lock, if any.
    pub fn lock_of(&self, account: &AccountId) -> Option<Lock> {
        self.locks.get(account).copied()
    }

    /// Current sum of all accounts' weight.
    pub fn total_weight(&self) -> Amount {
        self.total_weight
    }

    /// Reject a `now` that would rewind either checkpoint series.
    ///
    /// Called before any state is mutated so a late rejection cannot leave
    /// a half-applied operation behind.
    fn ensure_monotonic(
        &self,
        account: &AccountId,
        now: SequencePoint,
    ) -> Result<(), WeirError> {
        let account_last = self
            .account_checkpoints
            .get(account)
            .and_then(|s| s.last_sequence_point())
            .unwrap_or(0);
        let total_last = self.total_checkpoints.last_sequence_point().unwrap_or(0);
        if now < account_last || now < total_last {
            return Err(WeirError::InvalidInput(format!(
                "sequence point {} precedes recorded history",
                now
            )));
        }
        Ok(())
    }

    /// Set an account's weight balance and checkpoint both series.
    fn set_weight(
        &mut self,
        account: &AccountId,
        weight: Amount,
        now: SequencePoint,
    ) -> Result<(), WeirError> {
        let old = self.weights.get(account).copied().unwrap_or(0);
        if weight == 0 {
            self.weights.remove(account);
        } else {
            self.weights.insert(*account, weight);
        }
        self.total_weight = self.total_weight - old + weight;
        self.account_checkpoints
            .entry(*account)
            .or_default()
            .record(now, weight)?;
        self.total_checkpoints.record(now, self.total_weight)
    }

    /// Active (unexpired) lock lookup for the mutating lifecycle paths.
    fn active_lock(&self, account: &AccountId, now: SequencePoint) -> Result<Lock, WeirError> {
        let lock = self
            .locks
            .get(account)
            .ok_or_else(|| WeirError::NotFound("no active lock for account".to_string()))?;
        if now >= lock.unlock_at {
            return Err(WeirError::InvalidState(
                "lock has expired; unlock and re-lock instead".to_string(),
            ));
        }
        Ok(*lock)
    }
}

impl WeightOracle for EscrowLedger {
    fn weight_at(&self, account: &AccountId, sequence_point: SequencePoint) -> Amount {
        self.account_checkpoints
            .get(account)
            .map(|s| s.value_at(sequence_point))
            .unwrap_or(0)
    }

    fn total_weight_at(&self, sequence_point: SequencePoint) -> Amount {
        self.total_checkpoints.value_at(sequence_point)
    }

    fn current_weight(&self, account: &AccountId) -> Amount {
        self.weights.get(account).copied().unwrap_or(0)
    }
}
