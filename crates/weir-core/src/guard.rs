// crates/weir-core/src/guard.rs
//
// Re-entrancy guard for state-mutating distributor operations.
//
// Deposits and claims transfer the settlement asset to accounts that may
// call back into the same distributor before the first call finishes.
// Every mutating entry point marks itself busy on entry and rejects nested
// invocation; combined with state-before-transfer ordering this rules out
// double payment.

use serde::{Deserialize, Serialize};

use crate::error::WeirError;

/// Busy flag guarding a component's mutating entry points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpGuard {
    entered: bool,
}

impl OpGuard {
    /// Fresh, un-entered guard.
    pub fn new() -> Self {
        Self { entered: false }
    }

    /// Mark the component busy.
    ///
    /// # Errors
    /// Returns `WeirError::InvalidState` if an operation is already in
    /// progress, i.e. a nested invocation.
    pub fn enter(&mut self) -> Result<(), WeirError> {
        if self.entered {
            return Err(WeirError::InvalidState(
                "reentrant call: an operation is already in progress".to_string(),
            ));
        }
        self.entered = true;
        Ok(())
    }

    /// Clear the busy flag. Must be called on every exit path of an
    /// operation that entered.
    pub fn exit(&mut self) {
        self.entered = false;
    }
}
