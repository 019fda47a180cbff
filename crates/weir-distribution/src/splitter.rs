// crates/weir-distribution/src/splitter.rs
//
// The revenue splitter: single entry point for all protocol revenue.
//
// Each deposit is split three ways by fixed basis-point proportions:
// the registry share is forwarded to the vault distribution registry, the
// escrow share becomes one epoch claimable pro rata by weight holders, and
// the treasury share settles immediately. The first two shares use floor
// division and the third is the subtraction remainder, so no unit of any
// deposit is ever lost to rounding.
//
// The splitter's epochs store no denominator; the total weight at each
// epoch's sequence point is recomputed from the escrow ledger's checkpoint
// oracle at claim time. Writes happen on every deposit, reads rarely per
// user, so the log is kept cheap to write.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use weir_core::asset::AssetTransfer;
use weir_core::auth::{AuthContext, Capability};
use weir_core::error::WeirError;
use weir_core::guard::OpGuard;
use weir_core::oracle::{VaultStakeOracle, WeightOracle};
use weir_core::types::{
    bps_share, pro_rata, AccountId, Amount, ClaimReceipt, DepositReceipt, SequencePoint,
    BPS_DENOMINATOR,
};

use crate::registry::VaultDistributionRegistry;
use crate::scan::scan_window;

/// Default registry share: 70%.
pub const REGISTRY_SHARE_BPS: u64 = 7_000;

/// Default escrow share: 15%.
pub const ESCROW_SHARE_BPS: u64 = 1_500;

/// Default treasury share: 15%.
pub const TREASURY_SHARE_BPS: u64 = 1_500;

/// The fixed three-way split, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Share forwarded to the vault distribution registry.
    pub registry_bps: u64,
    /// Share recorded as claimable escrow epochs.
    pub escrow_bps: u64,
    /// Share transferred directly to the treasury.
    pub treasury_bps: u64,
}

impl SplitConfig {
    /// Build a config, rejecting ratios that do not sum to 100%.
    ///
    /// # Errors
    /// Returns `WeirError::InvalidInput` unless the three shares sum to
    /// exactly `BPS_DENOMINATOR`.
    pub fn new(registry_bps: u64, escrow_bps: u64, treasury_bps: u64) -> Result<Self, WeirError> {
        let sum = registry_bps + escrow_bps + treasury_bps;
        if sum != BPS_DENOMINATOR {
            return Err(WeirError::InvalidInput(format!(
                "split ratios sum to {} bps; must be exactly {}",
                sum, BPS_DENOMINATOR
            )));
        }
        Ok(Self {
            registry_bps,
            escrow_bps,
            treasury_bps,
        })
    }

    /// The standard 70/15/15 split.
    pub fn standard() -> Self {
        Self {
            registry_bps: REGISTRY_SHARE_BPS,
            escrow_bps: ESCROW_SHARE_BPS,
            treasury_bps: TREASURY_SHARE_BPS,
        }
    }
}

/// One deposit's escrow-share allocation. Append-only; fields never change
/// once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    /// Sequence point of the deposit, used to snapshot claimant weight.
    pub sequence_point: SequencePoint,
    /// Escrow share of the deposit.
    pub amount: Amount,
}

/// The revenue splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSplitter {
    /// Account holding escrow-share funds awaiting claims.
    account: AccountId,
    /// Treasury sink for the direct-settlement share.
    treasury: AccountId,
    config: SplitConfig,
    /// Append-only epoch log.
    epochs: Vec<Epoch>,
    /// Per-account claim cursors: index of the next unconsidered epoch.
    cursors: HashMap<AccountId, u64>,
    /// Latest deposit sequence point; the epoch log is monotonic.
    last_sequence_point: SequencePoint,
    paused: bool,
    guard: OpGuard,
}

impl RevenueSplitter {
    /// Create a splitter.
    ///
    /// # Errors
    /// Rejects a zero treasury account.
    pub fn new(
        account: AccountId,
        treasury: AccountId,
        config: SplitConfig,
    ) -> Result<Self, WeirError> {
        if treasury == [0u8; 32] {
            return Err(WeirError::InvalidInput(
                "treasury must not be the zero account".to_string(),
            ));
        }
        Ok(Self {
            account,
            treasury,
            config,
            epochs: Vec::new(),
            cursors: HashMap::new(),
            last_sequence_point: 0,
            paused: false,
            guard: OpGuard::new(),
        })
    }

    /// Deposit `amount`, splitting it across the three constituencies.
    ///
    /// Atomic: if the forward to the registry fails, the whole deposit
    /// fails and the pulled funds are returned.
    pub fn deposit(
        &mut self,
        asset: &mut dyn AssetTransfer,
        registry: &mut VaultDistributionRegistry,
        vault_oracle: &dyn VaultStakeOracle,
        caller: &AccountId,
        amount: Amount,
        now: SequencePoint,
    ) -> Result<DepositReceipt, WeirError> {
        self.guard.enter()?;
        let result = self.deposit_inner(asset, registry, vault_oracle, caller, amount, now);
        self.guard.exit();
        result
    }

    /// Claim the caller's pro-rata share of epochs `[from_epoch, to_epoch)`.
    ///
    /// The scan starts at the caller's cursor (a `from_epoch` at or before
    /// the cursor is fine; one past it is rejected, since skipping an
    /// unsettled epoch would mark it paid). The end is clamped to the log
    /// length and to the per-call scan bound, and the cursor advances to
    /// the clamped end whether or not any payout was non-zero.
    pub fn claim(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn WeightOracle,
        caller: &AccountId,
        from_epoch: u64,
        to_epoch: u64,
    ) -> Result<ClaimReceipt, WeirError> {
        self.guard.enter()?;
        let result = self.claim_inner(asset, oracle, caller, from_epoch, to_epoch);
        self.guard.exit();
        result
    }

    /// Claim everything outstanding, up to the per-call scan bound.
    pub fn claim_from_last(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn WeightOracle,
        caller: &AccountId,
    ) -> Result<ClaimReceipt, WeirError> {
        let cursor = self.cursor(caller);
        let len = self.epoch_count();
        self.claim(asset, oracle, caller, cursor, len)
    }

    /// Rotate the treasury sink, gated by `Capability::ManageTreasury`.
    pub fn set_treasury(
        &mut self,
        auth: &AuthContext,
        treasury: AccountId,
    ) -> Result<(), WeirError> {
        auth.require(Capability::ManageTreasury)?;
        if treasury == [0u8; 32] {
            return Err(WeirError::InvalidInput(
                "treasury must not be the zero account".to_string(),
            ));
        }
        self.treasury = treasury;
        Ok(())
    }

    /// Pause deposits and claims, gated by `Capability::Pause`.
    pub fn pause(&mut self, auth: &AuthContext) -> Result<(), WeirError> {
        auth.require(Capability::Pause)?;
        if self.paused {
            return Err(WeirError::InvalidState("already paused".to_string()));
        }
        self.paused = true;
        Ok(())
    }

    /// Resume deposits and claims, gated by `Capability::Pause`.
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

    /// An epoch by index.
    pub fn epoch(&self, index: u64) -> Option<&Epoch> {
        self.epochs.get(index as usize)
    }

    /// Length of the epoch log.
    pub fn epoch_count(&self) -> u64 {
        self.epochs.len() as u64
    }

    /// An account's claim cursor.
    pub fn cursor(&self, account: &AccountId) -> u64 {
        self.cursors.get(account).copied().unwrap_or(0)
    }

    /// The half-open range of epochs not yet settled for an account.
    pub fn unclaimed_range(&self, account: &AccountId) -> (u64, u64) {
        (self.cursor(account), self.epoch_count())
    }

    /// What the next `claim` call would pay out, without mutating anything.
    pub fn pending(&self, oracle: &dyn WeightOracle, account: &AccountId) -> Amount {
        let (start, end) = scan_window(self.cursor(account), u64::MAX, self.epoch_count());
        self.fold_payout(oracle, account, start, end)
    }

    /// The current treasury sink.
    pub fn treasury(&self) -> AccountId {
        self.treasury
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn deposit_inner(
        &mut self,
        asset: &mut dyn AssetTransfer,
        registry: &mut VaultDistributionRegistry,
        vault_oracle: &dyn VaultStakeOracle,
        caller: &AccountId,
        amount: Amount,
        now: SequencePoint,
    ) -> Result<DepositReceipt, WeirError> {
        if self.paused {
            return Err(WeirError::Paused(
                "splitter is paused; deposits are disabled".to_string(),
            ));
        }
        if amount == 0 {
            return Err(WeirError::InvalidInput(
                "deposit amount must be greater than zero".to_string(),
            ));
        }
        if now < self.last_sequence_point {
            return Err(WeirError::InvalidInput(format!(
                "sequence point {} precedes the latest deposit at {}",
                now, self.last_sequence_point
            )));
        }

        asset.transfer(caller, &self.account, amount)?;

        let registry_share = bps_share(amount, self.config.registry_bps);
        let escrow_share = bps_share(amount, self.config.escrow_bps);
        // The remainder lands here so rounding loses nothing.
        let treasury_share = amount - registry_share - escrow_share;

        if registry_share > 0 {
            if let Err(e) =
                registry.distribute(asset, vault_oracle, &self.account, registry_share, now)
            {
                // No partial split: return the pulled funds and fail whole.
                asset.transfer(&self.account, caller, amount)?;
                return Err(e);
            }
        }

        let previous_sequence_point = self.last_sequence_point;
        if escrow_share > 0 {
            self.epochs.push(Epoch {
                sequence_point: now,
                amount: escrow_share,
            });
        }
        self.last_sequence_point = now;

        if treasury_share > 0 {
            // Covered by the pull above for any conforming asset; unwind
            // the epoch append if the transfer still fails.
            if let Err(e) = asset.transfer(&self.account, &self.treasury, treasury_share) {
                if escrow_share > 0 {
                    self.epochs.pop();
                }
                self.last_sequence_point = previous_sequence_point;
                return Err(e);
            }
        }

        Ok(DepositReceipt {
            sequence_point: now,
            amount,
            registry_share,
            escrow_share,
            treasury_share,
        })
    }

    fn claim_inner(
        &mut self,
        asset: &mut dyn AssetTransfer,
        oracle: &dyn WeightOracle,
        caller: &AccountId,
        from_epoch: u64,
        to_epoch: u64,
    ) -> Result<ClaimReceipt, WeirError> {
        if self.paused {
            return Err(WeirError::Paused(
                "splitter is paused; claims are disabled".to_string(),
            ));
        }
        let previous = self.cursor(caller);
        if from_epoch > previous {
            return Err(WeirError::InvalidInput(format!(
                "claims are contiguous: next unconsidered epoch is {}, not {}",
                previous, from_epoch
            )));
        }
        let (start, end) = scan_window(previous, to_epoch, self.epoch_count());
        let payout = self.fold_payout(oracle, caller, start, end);

        // Cursor first, transfer last; roll the cursor back if the
        // transfer cannot complete so the epochs are not marked settled
        // without having been paid.
        self.cursors.insert(*caller, end);
        if payout > 0 {
            if let Err(e) = asset.transfer(&self.account, caller, payout) {
                self.cursors.insert(*caller, previous);
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

    /// Sum the caller's pro-rata entitlement over epochs `[start, end)`,
    /// recomputing each denominator from the checkpoint oracle.
    fn fold_payout(
        &self,
        oracle: &dyn WeightOracle,
        account: &AccountId,
        start: u64,
        end: u64,
    ) -> Amount {
        let mut payout: Amount = 0;
        for epoch in &self.epochs[start as usize..end as usize] {
            let weight = oracle.weight_at(account, epoch.sequence_point);
            if weight == 0 {
                continue;
            }
            let total = oracle.total_weight_at(epoch.sequence_point);
            payout += pro_rata(epoch.amount, weight, total);
        }
        payout
    }
}
