// crates/weir-core/src/auth.rs
//
// Capability-based authorization context.
//
// Gated operations take an explicit AuthContext instead of consulting a
// global admin singleton; the role system that issues capabilities is an
// external collaborator.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::WeirError;
use crate::types::AccountId;

/// Capabilities that gate administrative operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Pause and unpause a distributor.
    Pause,
    /// Rotate the splitter's treasury account.
    ManageTreasury,
    /// Register vaults and toggle their active flag.
    RegisterVault,
    /// Administrative weight mint/burn on the escrow ledger.
    ManageWeight,
}

/// The calling context for a gated operation: who is calling and which
/// capabilities they hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// The calling account.
    pub account: AccountId,
    /// Capabilities held by the caller.
    pub capabilities: HashSet<Capability>,
}

impl AuthContext {
    /// Context with no capabilities.
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            capabilities: HashSet::new(),
        }
    }

    /// Context holding the given capabilities.
    pub fn with_capabilities(account: AccountId, capabilities: &[Capability]) -> Self {
        Self {
            account,
            capabilities: capabilities.iter().copied().collect(),
        }
    }

    /// Require a capability.
    ///
    /// # Errors
    /// Returns `WeirError::Unauthorized` if the context does not hold it.
    pub fn require(&self, capability: Capability) -> Result<(), WeirError> {
        if self.capabilities.contains(&capability) {
            Ok(())
        } else {
            Err(WeirError::Unauthorized(format!(
                "caller lacks the {:?} capability",
                capability
            )))
        }
    }
}
