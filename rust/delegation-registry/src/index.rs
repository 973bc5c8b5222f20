//! Enumeration index over the grant store.
//!
//! The grant store is keyed by opaque digests and cannot be listed, so this
//! index keeps, for every exact scope coordinate, the set of delegates whose
//! record there is active. There is one nested keyed-set structure per scope
//! kind, keyed by the coordinate path down to the delegate set, and a reverse
//! structure keyed by delegate.
//!
//! The index is only correct if [`EnumerationIndex::sync_membership`] is
//! called with the same arguments as every store write; the registry does
//! both under one lock.

use std::hash::Hash;

use delegation_common::{Identity, ItemId};
use indexmap::{IndexMap, IndexSet};

use crate::{DelegationInfo, Scope, ScopeKind};

type Members = IndexSet<Identity>;

/// Per-coordinate sets of active delegates.
#[derive(Debug, Clone, Default)]
pub struct EnumerationIndex {
    all: IndexMap<Identity, Members>,
    collection: IndexMap<Identity, IndexMap<Identity, Members>>,
    item: IndexMap<Identity, IndexMap<Identity, IndexMap<ItemId, Members>>>,
    by_delegate: IndexMap<Identity, IndexSet<Scope>>,
}

impl EnumerationIndex {
    /// Add `delegate` to the set at `scope` when `active`, remove it
    /// otherwise. Both directions are idempotent.
    ///
    /// Returns whether membership changed.
    pub fn sync_membership(&mut self, scope: &Scope, delegate: &Identity, active: bool) -> bool {
        if active {
            self.by_delegate
                .entry(*delegate)
                .or_default()
                .insert(*scope);
            self.members_mut(scope).insert(*delegate)
        } else {
            remove_member(&mut self.by_delegate, delegate, scope);
            self.remove(scope, delegate)
        }
    }

    /// The delegates currently active at exactly `scope`. Empty if none.
    pub fn list_members(&self, scope: &Scope) -> Vec<Identity> {
        self.members(scope)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every active delegation naming `delegate`, across all vaults.
    pub fn delegations_by_delegate(&self, delegate: &Identity) -> Vec<DelegationInfo> {
        self.by_delegate
            .get(delegate)
            .map(|scopes| {
                scopes
                    .iter()
                    .map(|scope| DelegationInfo::new(*delegate, *scope))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every active delegation of `vault` at one granularity.
    pub fn delegations_at(&self, vault: &Identity, kind: ScopeKind) -> Vec<DelegationInfo> {
        let vault = *vault;
        let mut delegations = Vec::new();

        match kind {
            ScopeKind::All => {
                let scope = Scope::All { vault };
                for delegate in self.all.get(&vault).into_iter().flatten() {
                    delegations.push(DelegationInfo::new(*delegate, scope));
                }
            }
            ScopeKind::Collection => {
                for (collection, members) in self.collection.get(&vault).into_iter().flatten() {
                    let scope = Scope::Collection {
                        vault,
                        collection: *collection,
                    };
                    for delegate in members {
                        delegations.push(DelegationInfo::new(*delegate, scope));
                    }
                }
            }
            ScopeKind::Item => {
                for (collection, items) in self.item.get(&vault).into_iter().flatten() {
                    for (item, members) in items {
                        let scope = Scope::Item {
                            vault,
                            collection: *collection,
                            item: *item,
                        };
                        for delegate in members {
                            delegations.push(DelegationInfo::new(*delegate, scope));
                        }
                    }
                }
            }
        }

        delegations
    }

    /// Every active delegation of every vault, broadest scopes first within
    /// each vault.
    pub fn delegations(&self) -> Vec<DelegationInfo> {
        let mut vaults: IndexSet<Identity> = IndexSet::new();
        vaults.extend(self.all.keys().copied());
        vaults.extend(self.collection.keys().copied());
        vaults.extend(self.item.keys().copied());

        vaults
            .iter()
            .flat_map(|vault| {
                ScopeKind::BROAD_TO_NARROW
                    .into_iter()
                    .flat_map(move |kind| self.delegations_at(vault, kind))
            })
            .collect()
    }

    fn members(&self, scope: &Scope) -> Option<&Members> {
        match scope {
            Scope::All { vault } => self.all.get(vault),
            Scope::Collection { vault, collection } => self.collection.get(vault)?.get(collection),
            Scope::Item {
                vault,
                collection,
                item,
            } => self.item.get(vault)?.get(collection)?.get(item),
        }
    }

    fn members_mut(&mut self, scope: &Scope) -> &mut Members {
        match *scope {
            Scope::All { vault } => self.all.entry(vault).or_default(),
            Scope::Collection { vault, collection } => self
                .collection
                .entry(vault)
                .or_default()
                .entry(collection)
                .or_default(),
            Scope::Item {
                vault,
                collection,
                item,
            } => self
                .item
                .entry(vault)
                .or_default()
                .entry(collection)
                .or_default()
                .entry(item)
                .or_default(),
        }
    }

    /// Remove a member and prune any set or map left empty behind it.
    fn remove(&mut self, scope: &Scope, delegate: &Identity) -> bool {
        match *scope {
            Scope::All { vault } => remove_member(&mut self.all, &vault, delegate),
            Scope::Collection { vault, collection } => {
                let Some(collections) = self.collection.get_mut(&vault) else {
                    return false;
                };
                let removed = remove_member(collections, &collection, delegate);
                if collections.is_empty() {
                    self.collection.swap_remove(&vault);
                }
                removed
            }
            Scope::Item {
                vault,
                collection,
                item,
            } => {
                let Some(collections) = self.item.get_mut(&vault) else {
                    return false;
                };
                let Some(items) = collections.get_mut(&collection) else {
                    return false;
                };
                let removed = remove_member(items, &item, delegate);
                if items.is_empty() {
                    collections.swap_remove(&collection);
                }
                if collections.is_empty() {
                    self.item.swap_remove(&vault);
                }
                removed
            }
        }
    }
}

fn remove_member<K, V>(sets: &mut IndexMap<K, IndexSet<V>>, key: &K, value: &V) -> bool
where
    K: Hash + Eq,
    V: Hash + Eq,
{
    let Some(members) = sets.get_mut(key) else {
        return false;
    };
    let removed = members.swap_remove(value);
    if members.is_empty() {
        sets.swap_remove(key);
    }
    removed
}
