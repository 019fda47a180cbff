// crates/weir-core/src/types.rs
//
// Primitive aliases and basis-point arithmetic shared across the workspace.
//
// All monetary values are tracked in the settlement asset's smallest unit
// as u128, so that pro-rata products (amount * weight) never overflow in
// intermediate form. Proportions are expressed in basis points
// (10,000 bps = 100%) and computed with integer floor division.

use serde::{Deserialize, Serialize};

/// An amount in the settlement asset's smallest unit.
pub type Amount = u128;

/// Opaque 32-byte account identifier.
pub type AccountId = [u8; 32];

/// Opaque 32-byte identifier for an auxiliary settlement asset.
pub type AssetId = [u8; 32];

/// Registry-assigned unique ID for a vault (0..n, append-only).
pub type VaultId = u16;

/// A monotonically increasing marker used to snapshot weight at the moment
/// value was allocated (e.g., a timestamp or block height).
pub type SequencePoint = u64;

/// Denominator for basis-point proportions: 10,000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Compute `amount * bps / 10_000` with floor division.
///
/// Callers that split an amount into several proportional shares must
/// derive the final share by subtraction rather than a third
/// multiplication, so that no unit is lost to rounding.
pub fn bps_share(amount: Amount, bps: u64) -> Amount {
    amount * bps as Amount / BPS_DENOMINATOR as Amount
}

/// Compute `amount * numerator / denominator` with floor division.
///
/// Returns 0 when the denominator is zero; proportional payouts against an
/// empty pool short-circuit to nothing rather than dividing by zero.
pub fn pro_rata(amount: Amount, numerator: Amount, denominator: Amount) -> Amount {
    if denominator == 0 {
        return 0;
    }
    amount * numerator / denominator
}

/// A record of one deposit's three-way split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    /// Sequence point at which the deposit was recorded.
    pub sequence_point: SequencePoint,
    /// Total amount deposited.
    pub amount: Amount,
    /// Share forwarded to the vault distribution registry.
    pub registry_share: Amount,
    /// Share recorded as an escrow epoch.
    pub escrow_share: Amount,
    /// Share transferred directly to the treasury.
    pub treasury_share: Amount,
}

/// A record of one claim call's settled range and payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    /// The claiming account.
    pub account: AccountId,
    /// First epoch index folded into this claim.
    pub from_epoch: u64,
    /// One past the last epoch index folded into this claim (the new cursor).
    pub to_epoch: u64,
    /// Total payout transferred.
    pub amount: Amount,
}

/// A record of one distribution call across vaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributeReceipt {
    /// Sequence point at which the distribution was recorded.
    pub sequence_point: SequencePoint,
    /// Total amount pulled from the caller.
    pub amount: Amount,
    /// Number of vaults that received an epoch (zero-stake vaults are skipped).
    pub vaults_funded: u32,
    /// Amount left undistributed (zero total stake, or floor-division dust).
    pub remainder: Amount,
}
