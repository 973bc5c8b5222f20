use std::collections::HashMap;

use delegation_common::Identity;

use crate::{GrantKey, Scope, Target};

/// The canonical boolean state of every `(delegate, scope)` combination.
///
/// Records are kept in a flat table keyed by [`GrantKey`]. Only active records
/// are stored: a revoke removes the key, so a key that was never written and a
/// key that was revoked both read as `false`, and the table never holds more
/// entries than there are active grants.
#[derive(Debug, Clone, Default)]
pub struct GrantStore {
    records: HashMap<GrantKey, bool>,
}

impl GrantStore {
    /// Record `active` for `delegate` at `target`, with `caller` as the vault.
    ///
    /// Returns the scope that was written. The write always happens, even
    /// when the record already holds `active`.
    pub fn set_grant(
        &mut self,
        caller: &Identity,
        delegate: &Identity,
        target: Target,
        active: bool,
    ) -> Scope {
        let scope = target.within(*caller);
        self.write(delegate, &scope, active);
        scope
    }

    /// Raw read of the record for `delegate` at exactly `scope`. No fallback
    /// to broader scopes.
    pub fn raw_check(&self, delegate: &Identity, scope: &Scope) -> bool {
        self.records
            .get(&GrantKey::derive(delegate, scope))
            .copied()
            .unwrap_or(false)
    }

    /// The number of records currently holding `true`.
    pub fn active_grants(&self) -> usize {
        self.records.len()
    }

    /// Write a record for a scope whose vault has already been established.
    /// Returns the previous value.
    pub(crate) fn write(&mut self, delegate: &Identity, scope: &Scope, active: bool) -> bool {
        let key = GrantKey::derive(delegate, scope);
        let previous = if active {
            self.records.insert(key, true)
        } else {
            self.records.remove(&key)
        };

        previous.unwrap_or(false)
    }
}
