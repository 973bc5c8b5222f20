use delegation_common::Identity;
use serde::{Deserialize, Serialize};

use crate::{Scope, ScopeKind};

/// One active delegation: `delegate` may act for the vault of `scope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DelegationInfo {
    /// Who received the grant
    pub delegate: Identity,
    /// Where the grant applies, including the granting vault
    pub scope: Scope,
}

impl DelegationInfo {
    /// Create a new delegation record.
    pub fn new(delegate: Identity, scope: Scope) -> Self {
        Self { delegate, scope }
    }

    /// The granting vault.
    pub fn vault(&self) -> &Identity {
        self.scope.vault()
    }

    /// The granularity of the grant.
    pub fn kind(&self) -> ScopeKind {
        self.scope.kind()
    }
}
