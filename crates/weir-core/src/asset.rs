// crates/weir-core/src/asset.rs
//
// Settlement-asset transfer seam.
//
// The engine never owns token balances; it moves value between opaque
// accounts through this trait. Production deployments adapt their token
// primitive behind it; `MemoryAsset` is the in-memory implementation the
// workspace tests run against.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::WeirError;
use crate::types::{AccountId, Amount};

/// Transfer and balance primitives for a single fungible settlement asset.
pub trait AssetTransfer {
    /// Move `amount` from one account to another.
    ///
    /// # Errors
    /// Returns `WeirError::Transfer` if `from` cannot cover `amount`.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount)
        -> Result<(), WeirError>;

    /// Current balance of an account. Unknown accounts hold zero.
    fn balance_of(&self, account: &AccountId) -> Amount;
}

/// In-memory settlement asset backed by a balance map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryAsset {
    balances: HashMap<AccountId, Amount>,
}

impl MemoryAsset {
    /// Create an empty asset ledger.
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit an account out of thin air. Test/bootstrap helper.
    pub fn mint(&mut self, account: &AccountId, amount: Amount) {
        *self.balances.entry(*account).or_insert(0) += amount;
    }
}

impl AssetTransfer for MemoryAsset {
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), WeirError> {
        if amount == 0 {
            return Ok(());
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(WeirError::Transfer(format!(
                "insufficient balance: account holds {} but transfer needs {}",
                from_balance, amount
            )));
        }
        *self.balances.entry(*from).or_insert(0) -= amount;
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }
}
