// crates/weir-distribution/src/lib.rs
//
// weir-distribution: the revenue splitter and vault distribution registry
// for the Weir revenue engine.
//
// Both distributors share one design: append-only epoch logs, historical
// weight queries against the moment value arrived, and monotonic per-user
// claim cursors bounded to a fixed number of epochs per call.

pub mod registry;
pub mod scan;
pub mod splitter;

// Re-export key types for ergonomic access from downstream crates.
pub use registry::{Vault, VaultDistributionRegistry, VaultEpoch};
pub use scan::{scan_window, MAX_EPOCHS_PER_CLAIM};
pub use splitter::{
    Epoch, RevenueSplitter, SplitConfig, ESCROW_SHARE_BPS, REGISTRY_SHARE_BPS,
    TREASURY_SHARE_BPS,
};
