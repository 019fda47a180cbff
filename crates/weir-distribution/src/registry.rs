// crates/weir-distribution/src/registry.rs
//
// The vault distribution registry.
//
// A registry of independently weighted stake pools ("vaults"). Each
// distribution divides the incoming amount across active vaults in
// proportion to their current total stake and appends one epoch per funded
// vault; members later claim pro rata against their vault's own historical
// stake. Unlike the splitter, each epoch stores its denominator at write
// time: vault implementations are heterogeneous and their historical
// total-stake queries may be expensive or unavailable at claim time.
//
// A parallel epoch series per (vault, auxiliary asset) handles revenue
// arriving in assets other than the primary settlement asset, with its own
// cursors so progress on one asset never blocks another.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use weir_core::asset::AssetTransfer;
use weir_core::auth::{AuthContext, Capability};
use weir_core::error::WeirError;
use weir_core::guard::OpGuard;
use weir_core::oracle::VaultStakeOracle;
use weir_core::types::{
    pro_rata, AccountId, Amount, AssetId, ClaimReceipt, DistributeReceipt, SequencePoint, VaultId,
};

use crate::scan::scan_window;

/// A registered vault. Registration is permanent; vaults are only ever
/// deactivated, so historical epochs stay attributable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Registry-assigned unique ID (0..n).
    pub uid: VaultId,
    /// The vault's account, which receives nothing directly; it identifies
    /// the external stake pool behind the oracle.
    pub account: AccountId,
    /// Whether the vault is eligible for new distributions.
    pub active: bool,
    /// Sequence point at which the vault was registered.
    pub registered_at: SequencePoint,
}

/// One allocation to one vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEpoch {
    /// Sequence point of the distribution.
    pub sequence_point: SequencePoint,
    /// Amount allocated to the vault in this epoch.
    pub amount: Amount,
    /// The vault's total stake at distribution time: the claim
    /// denominator, stored rather than recomputed.
    pub total_staked: Amount,
}

/// The vault distribution registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultDistributionRegistry {
    /// Account holding funds awaiting member claims.
    account: AccountId,
    /// All vaults ever registered, indexed by uid.
    vaults: Vec<Vault>,
    /// Vault account -> uid, for duplicate-registration checks.
    vault_index: HashMap<AccountId, VaultId>,
    /// Primary-asset epoch log per vault.
    epochs: HashMap<VaultId, Vec<VaultEpoch>>,
    /// Auxiliary-asset epoch logs per (vault, asset).
    token_epochs: HashMap<(VaultId, AssetId), Vec<VaultEpoch>>,
    /// Primary-asset claim cursors per (account, vault).
    cursors: HashMap<(AccountId, VaultId), u64>,
    /// Auxiliary-asset claim cursors per (account, vault, asset).
    token_cursors: HashMap<(AccountId, VaultId, AssetId), u64>,
    /// Primary-asset value pulled in but never allocated (zero total stake
    /// at distribution time, plus floor-division dust).
    undistributed: Amount,
    /// Same, per auxiliary asset.
    token_undistributed: HashMap<AssetId, Amount>,
    /// Latest distribution sequence point; the epoch logs are monotonic.
    last_sequence_point: SequencePoint,
    paused: bool,
    guard: OpGuard,
}

impl VaultDistributionRegistry {
    /// Create a registry whose claimable funds are held by `account`.
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            vaults: Vec::new(),
            vault_index: HashMap::new(),
            epochs: HashMap::new(),
            token_epochs: HashMap::new(),
            cursors: HashMap::new(),
            token_cursors: HashMap::new(),
            undistributed: 0,
            token_undistributed: HashMap::new(),
            last_sequence_point: 0,
            paused: false,
            guard: OpGuard::new(),
        }
    }

    /// Register a vault, gated by `Capability::RegisterVault`.
    ///
    /// Returns the assigned uid.
    ///
    /// # Errors
    /// Rejects a zero vault account, a duplicate registration, and a full
    /// uid space.
    pub fn register_vault(
        &mut self,
        auth: &AuthContext,
        vault_account: &AccountId,
        now: SequencePoint,
    ) -> Result<VaultId, WeirError> {
        auth.require(Capability::RegisterVault)?;
        if *vault_account == [0u8; 32] {
            return Err(WeirError::InvalidInput(
                "vault account must not be the zero account".to_string(),
            ));
        }
        if self.vault_index.contains_key(vault_account) {
            return Err(WeirError::InvalidState(
                "vault is already registered".to_string(),
            ));
        }
        if self.vaults.len() > VaultId::MAX as usize {
            return Err(WeirError::InvalidState(
                "vault uid space is exhausted".to_string(),
            ));
        }
        let uid = self.vaults.len() as VaultId;
        self.vaults.push(Vault {
            uid,
            account: *vault_account,
            active: true,
            registered_at: now,
        });
        self.vault_index.insert(*vault_account, uid);
        Ok(uid)
    }

    /// Toggle a vault's eligibility for new distributions, gated by
    /// `Capability::RegisterVault`. Existing epochs stay claimable.
    pub fn set_vault_active(
        &mut self,
        auth: &AuthContext,
        uid: VaultId,
        active: bool,
    ) -> Result<(), WeirError> {
        auth.require(Capability::RegisterVault)?;
        let vault = self
            .vaults
            .get_mut(uid as usize)
            .ok_or_else(|| WeirError::NotFound(format!("no vault with uid {}", uid)))?;
        vault.active = active;
        Ok(())
    }

    /// Distribute `amount` of the primary settlement asset across active
    /// vaults in proportion to their current stake.
    pub fn distribute(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn VaultStakeOracle,
        caller: &AccountId,
        amount: Amount,
        now: SequencePoint,
    ) -> Result<DistributeReceipt, WeirError> {
        self.guard.enter()?;
        let result = self.distribute_inner(asset, oracle, caller, amount, now, None);
        self.guard.exit();
        result
    }

    /// Distribute `amount` of an auxiliary asset, writing the parallel
    /// per-(vault, asset) epoch series. `asset` must be the transfer
    /// primitive for `asset_id`.
    pub fn distribute_token(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn VaultStakeOracle,
        caller: &AccountId,
        asset_id: AssetId,
        amount: Amount,
        now: SequencePoint,
    ) -> Result<DistributeReceipt, WeirError> {
        self.guard.enter()?;
        let result = self.distribute_inner(asset, oracle, caller, amount, now, Some(asset_id));
        self.guard.exit();
        result
    }

    /// Claim the caller's pro-rata share of a vault's primary-asset epochs
    /// up to `to_epoch` (clamped to the scan bound).
    pub fn claim(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn VaultStakeOracle,
        caller: &AccountId,
        vault: VaultId,
        to_epoch: u64,
    ) -> Result<ClaimReceipt, WeirError> {
        self.guard.enter()?;
        let result = self.claim_inner(asset, oracle, caller, vault, to_epoch, None);
        self.guard.exit();
        result
    }

    /// Claim against the auxiliary epoch series for `asset_id`. Progress
    /// here never blocks or is blocked by primary-asset claims.
    pub fn claim_token(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn VaultStakeOracle,
        caller: &AccountId,
        vault: VaultId,
        asset_id: AssetId,
        to_epoch: u64,
    ) -> Result<ClaimReceipt, WeirError> {
        self.guard.enter()?;
        let result = self.claim_inner(asset, oracle, caller, vault, to_epoch, Some(asset_id));
        self.guard.exit();
        result
    }

    /// Pause distributions and claims, gated by `Capability::Pause`.
    pub fn pause(&mut self, auth: &AuthContext) -> Result<(), WeirError> {
        auth.require(Capability::Pause)?;
        if self.paused {
            return Err(WeirError::InvalidState("already paused".to_string()));
        }
        self.paused = true;
        Ok(())
    }

    /// Resume distributions and claims, gated by `Capability::Pause`.
    pub fn unpause(&mut self, auth: &AuthContext) -> Result<(), WeirError> {
        auth.require(Capability::Pause)?;
        if !self.paused {
            return Err(WeirError::InvalidState("not paused".to_string()));
        }
        self.paused = false;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read-only views. Available regardless of pause state; never mutate.
    // ------------------------------------------------------------------

    /// The vault with the given uid.
    pub fn vault(&self, uid: VaultId) -> Option<&Vault> {
        self.vaults.get(uid as usize)
    }

    /// Number of vaults ever registered.
    pub fn vault_count(&self) -> u64 {
        self.vaults.len() as u64
    }

    /// A vault's primary-asset epoch by index.
    pub fn epoch(&self, vault: VaultId, index: u64) -> Option<&VaultEpoch> {
        self.epochs.get(&vault)?.get(index as usize)
    }

    /// Length of a vault's primary-asset epoch log.
    pub fn epoch_count(&self, vault: VaultId) -> u64 {
        self.epochs.get(&vault).map(|e| e.len() as u64).unwrap_or(0)
    }

    /// Length of a vault's epoch log for an auxiliary asset.
    pub fn token_epoch_count(&self, vault: VaultId, asset_id: &AssetId) -> u64 {
        self.token_epochs
            .get(&(vault, *asset_id))
            .map(|e| e.len() as u64)
            .unwrap_or(0)
    }

    /// An account's primary-asset claim cursor for a vault.
    pub fn cursor(&self, account: &AccountId, vault: VaultId) -> u64 {
        self.cursors.get(&(*account, vault)).copied().unwrap_or(0)
    }

    /// The half-open range of epochs not yet settled for an account.
    pub fn unclaimed_range(&self, account: &AccountId, vault: VaultId) -> (u64, u64) {
        (self.cursor(account, vault), self.epoch_count(vault))
    }

    /// What the next `claim` call would pay out, without mutating anything.
    pub fn pending(
        &self,
        oracle: &dyn VaultStakeOracle,
        account: &AccountId,
        vault: VaultId,
    ) -> Amount {
        let epochs = self.epochs.get(&vault).map(Vec::as_slice).unwrap_or(&[]);
        let cursor = self.cursor(account, vault);
        let (_, _, payout) =
            scan_vault_payout(epochs, oracle, vault, account, cursor, u64::MAX);
        payout
    }

    /// Value pulled in but never allocated to any vault (primary asset).
    pub fn undistributed(&self) -> Amount {
        self.undistributed
    }

    /// Value pulled in but never allocated, for an auxiliary asset.
    pub fn token_undistributed(&self, asset_id: &AssetId) -> Amount {
        self.token_undistributed
            .get(asset_id)
            .copied()
            .unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn distribute_inner(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn VaultStakeOracle,
        caller: &AccountId,
        amount: Amount,
        now: SequencePoint,
        asset_id: Option<AssetId>,
    ) -> Result<DistributeReceipt, WeirError> {
        if self.paused {
            return Err(WeirError::Paused(
                "registry is paused; distributions are disabled".to_string(),
            ));
        }
        if amount == 0 {
            return Err(WeirError::InvalidInput(
                "distribution amount must be greater than zero".to_string(),
            ));
        }
        if now < self.last_sequence_point {
            return Err(WeirError::InvalidInput(format!(
                "sequence point {} precedes the latest distribution at {}",
                now, self.last_sequence_point
            )));
        }

        asset.transfer(caller, &self.account, amount)?;

        // The snapshot-defining read: current stake of every active vault.
        let stakes: Vec<(VaultId, Amount)> = self
            .vaults
            .iter()
            .filter(|v| v.active)
            .map(|v| (v.uid, oracle.current_stake(v.uid)))
            .collect();
        let total: Amount = stakes.iter().map(|&(_, s)| s).sum();

        let mut distributed: Amount = 0;
        let mut vaults_funded: u32 = 0;
        if total > 0 {
            for (uid, stake) in stakes {
                // Zero-stake vaults get no epoch at all, not a zero-amount one.
                if stake == 0 {
                    continue;
                }
                let share = pro_rata(amount, stake, total);
                if share == 0 {
                    continue;
                }
                let epoch = VaultEpoch {
                    sequence_point: now,
                    amount: share,
                    total_staked: stake,
                };
                match asset_id {
                    Some(id) => self.token_epochs.entry((uid, id)).or_default().push(epoch),
                    None => self.epochs.entry(uid).or_default().push(epoch),
                }
                distributed += share;
                vaults_funded += 1;
            }
        }

        let remainder = amount - distributed;
        match asset_id {
            Some(id) => *self.token_undistributed.entry(id).or_insert(0) += remainder,
            None => self.undistributed += remainder,
        }
        self.last_sequence_point = now;

        Ok(DistributeReceipt {
            sequence_point: now,
            amount,
            vaults_funded,
            remainder,
        })
    }

    fn claim_inner(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn VaultStakeOracle,
        caller: &AccountId,
        vault: VaultId,
        to_epoch: u64,
        asset_id: Option<AssetId>,
    ) -> Result<ClaimReceipt, WeirError> {
        if self.paused {
            return Err(WeirError::Paused(
                "registry is paused; claims are disabled".to_string(),
            ));
        }
        if self.vaults.get(vault as usize).is_none() {
            return Err(WeirError::NotFound(format!("no vault with uid {}", vault)));
        }

        let epochs: &[VaultEpoch] = match asset_id {
            Some(id) => self
                .token_epochs
                .get(&(vault, id))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => self.epochs.get(&vault).map(Vec::as_slice).unwrap_or(&[]),
        };
        let previous = match asset_id {
            Some(id) => self
                .token_cursors
                .get(&(*caller, vault, id))
                .copied()
                .unwrap_or(0),
            None => self.cursor(caller, vault),
        };

        let (start, end, payout) =
            scan_vault_payout(epochs, oracle, vault, caller, previous, to_epoch);

        // Cursor first, transfer last; roll the cursor back if the
        // transfer cannot complete so the epochs are not marked settled
        // without having been paid.
        match asset_id {
            Some(id) => {
                self.token_cursors.insert((*caller, vault, id), end);
            }
            None => {
                self.cursors.insert((*caller, vault), end);
            }
        }
        if payout > 0 {
            if let Err(e) = asset.transfer(&self.account, caller, payout) {
                match asset_id {
                    Some(id) => {
                        self.token_cursors.insert((*caller, vault, id), previous);
                    }
                    None => {
                        self.cursors.insert((*caller, vault), previous);
                    }
                }
                return Err(e);
            }
        }

        Ok(ClaimReceipt {
            account: *caller,
            from_epoch: start,
            to_epoch: end,
            amount: payout,
        })
    }
}

/// Fold the claimable window `[cursor, to_epoch)` of a vault's epoch log
/// into a payout, using the stored per-epoch denominator.
///
/// Returns `(start, end, payout)` where `end` is the clamped window end the
/// cursor should advance to.
fn scan_vault_payout(
    epochs: &[VaultEpoch],
    oracle: &dyn VaultStakeOracle,
    vault: VaultId,
    account: &AccountId,
    cursor: u64,
    to_epoch: u64,
) -> (u64, u64, Amount) {
    let (start, end) = scan_window(cursor, to_epoch, epochs.len() as u64);
    let mut payout: Amount = 0;
    for epoch in &epochs[start as usize..end as usize] {
        let stake = oracle.stake_at(vault, account, epoch.sequence_point);
        if stake == 0 {
            continue;
        }
        payout += pro_rata(epoch.amount, stake, epoch.total_staked);
    }
    (start, end, payout)
}
