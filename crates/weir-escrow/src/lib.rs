// crates/weir-escrow/src/lib.rs
//
// weir-escrow: the escrowed stake ledger for the Weir revenue engine.
//
// Locked principal earns a non-transferable, duration-boosted weight
// balance; every weight change is checkpointed so the distributors in
// weir-distribution can query weight as of any past sequence point.

pub mod boost;
pub mod checkpoint;
pub mod ledger;

// Re-export key types for ergonomic access from downstream crates.
pub use boost::{
    boost_bps, boost_bps_remaining, weight_for, BOOST_MAX_BPS, BOOST_MIN_BPS, MAX_LOCK_SECS,
    MIN_LOCK_SECS,
};
pub use checkpoint::{Checkpoint, CheckpointSeries};
pub use ledger::{EscrowLedger, Lock};
