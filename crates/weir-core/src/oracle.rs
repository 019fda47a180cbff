// crates/weir-core/src/oracle.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Amount, SequencePoint, VaultId};

/// Historical-weight queries backed by an append-only checkpoint store.
///
/// Implemented by the escrow ledger in weir-escrow. A query at a sequence
/// point before an account's first checkpoint returns 0.
pub trait WeightOracle {
    /// Weight of `account` as of `sequence_point`.
    fn weight_at(&self, account: &AccountId, sequence_point: SequencePoint) -> Amount;

    /// Sum of all accounts' weight as of `sequence_point`.
    fn total_weight_at(&self, sequence_point: SequencePoint) -> Amount;

    /// Weight of `account` right now (the latest checkpoint).
    fn current_weight(&self, account: &AccountId) -> Amount;
}

/// Per-vault stake queries supplied by each registered vault.
///
/// Vault implementations are heterogeneous; the registry only assumes they
/// can answer a member's historical stake and the vault's current total.
pub trait VaultStakeOracle {
    /// Stake of `account` in vault `vault` as of `sequence_point`.
    fn stake_at(
        &self,
        vault: VaultId,
        account: &AccountId,
        sequence_point: SequencePoint,
    ) -> Amount;

    /// Total stake currently held in vault `vault`.
    fn current_stake(&self, vault: VaultId) -> Amount;
}

/// In-memory vault-stake oracle backed by append-only stake histories.
///
/// The workspace's test stand-in for external vault implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryVaultStakes {
    /// Per-(vault, account) history of (sequence_point, stake), in order.
    histories: HashMap<(VaultId, AccountId), Vec<(SequencePoint, Amount)>>,
    /// Current total stake per vault.
    totals: HashMap<VaultId, Amount>,
}

impl MemoryVaultStakes {
    /// Empty oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `account`'s stake in `vault` from `sequence_point` on.
    pub fn set_stake(
        &mut self,
        vault: VaultId,
        account: &AccountId,
        stake: Amount,
        sequence_point: SequencePoint,
    ) {
        let history = self.histories.entry((vault, *account)).or_default();
        let previous = history.last().map(|&(_, s)| s).unwrap_or(0);
        history.push((sequence_point, stake));
        let total = self.totals.entry(vault).or_insert(0);
        *total = *total - previous + stake;
    }
}

impl VaultStakeOracle for MemoryVaultStakes {
    fn stake_at(
        &self,
        vault: VaultId,
        account: &AccountId,
        sequence_point: SequencePoint,
    ) -> Amount {
        self.histories
            .get(&(vault, *account))
            .and_then(|history| {
                history
                    .iter()
                    .rev()
                    .find(|&&(point, _)| point <= sequence_point)
                    .map(|&(_, stake)| stake)
            })
            .unwrap_or(0)
    }

    fn current_stake(&self, vault: VaultId) -> Amount {
        self.totals.get(&vault).copied().unwrap_or(0)
    }
}
