// crates/weir-core/src/lib.rs
//
// weir-core: Core types, errors, and collaborator traits for the Weir
// revenue engine.
//
// This is the leaf crate the escrow ledger and the distributors depend on.
// It defines the primitive aliases, the engine-wide error type, the
// settlement-asset and historical-weight seams, the capability context,
// and the re-entrancy guard.

pub mod asset;
pub mod auth;
pub mod error;
pub mod guard;
pub mod oracle;
pub mod types;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use weir_core::WeirError;`

pub use asset::{AssetTransfer, MemoryAsset};
pub use auth::{AuthContext, Capability};
pub use error::WeirError;
pub use guard::OpGuard;
pub use oracle::{MemoryVaultStakes, VaultStakeOracle, WeightOracle};
pub use types::{
    bps_share, pro_rata, AccountId, Amount, AssetId, ClaimReceipt, DepositReceipt,
    DistributeReceipt, SequencePoint, VaultId, BPS_DENOMINATOR,
};
