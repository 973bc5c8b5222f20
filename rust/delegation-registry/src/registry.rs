use std::sync::Arc;

use delegation_common::{Identity, ItemId};
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::{
    DelegationEvent, DelegationInfo, DelegationRegistryError, EnumerationIndex, EventBus,
    GrantStore, RegistryConfig, RegistrySnapshot, Scope, ScopeKind, Target, lookup,
};

/// The grant store and its enumeration index. They are only ever touched
/// together, under one write lock.
#[derive(Debug, Default)]
struct RegistryState {
    store: GrantStore,
    index: EnumerationIndex,
}

impl RegistryState {
    fn apply(&mut self, delegate: &Identity, scope: &Scope, active: bool) {
        self.store.write(delegate, scope, active);
        self.index.sync_membership(scope, delegate, active);
    }
}

/// A shared delegation registry.
///
/// Vaults grant and revoke delegates at [`Scope`]s of their own; anyone can
/// enumerate and check the result. Clones share the same state, and every
/// write updates the grant store, the enumeration index and the event stream
/// in one step, so readers on any clone never see one without the others.
///
/// ```rust
/// use delegation_common::{Identity, ItemId};
/// use delegation_registry::DelegationRegistry;
///
/// # fn main() -> Result<(), delegation_registry::DelegationRegistryError> {
/// let registry = DelegationRegistry::default();
/// let vault = Identity::from([1; 20]);
/// let delegate = Identity::from([2; 20]);
/// let collection = Identity::from([3; 20]);
///
/// registry.delegate_for_all(&vault, &delegate, true)?;
///
/// assert!(registry.check_item(&delegate, &vault, &collection, &ItemId::from(42u64)));
/// assert_eq!(registry.delegates_for_all(&vault), vec![delegate]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DelegationRegistry {
    state: Arc<RwLock<RegistryState>>,
    events: EventBus,
    config: RegistryConfig,
}

impl Default for DelegationRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl DelegationRegistry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            events: EventBus::new(config.event_capacity),
            config,
        }
    }

    /// Rebuild a registry from a snapshot.
    ///
    /// The delegations are replayed as they were recorded, vault included,
    /// without emitting events. Fails without producing a registry if the
    /// snapshot holds more delegations than `config` allows.
    pub fn restore(
        config: RegistryConfig,
        snapshot: RegistrySnapshot,
    ) -> Result<Self, DelegationRegistryError> {
        let registry = Self::new(config);
        {
            let mut state = registry.state.write();
            for delegation in &snapshot.delegations {
                registry.ensure_capacity(&state.store, &delegation.delegate, &delegation.scope)?;
                state.apply(&delegation.delegate, &delegation.scope, true);
            }
        }

        tracing::debug!(
            delegations = snapshot.delegations.len(),
            "Restored delegation registry"
        );

        Ok(registry)
    }

    /// The settings this registry was created with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Receive a [`DelegationEvent`] for every write made from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DelegationEvent> {
        self.events.subscribe()
    }

    /// Set the grant of `delegate` at `target`, with `caller` as the vault.
    ///
    /// This is the single write path: the vault is always the caller, so no
    /// identity can write on behalf of another. The record is written even
    /// when it already holds `active`, and an event is emitted either way.
    ///
    /// Returns the scope that was written. Fails with
    /// [`DelegationRegistryError::CapacityExhausted`], leaving all state
    /// untouched, when activating the record would exceed
    /// [`RegistryConfig::max_active_grants`].
    pub fn set_grant(
        &self,
        caller: &Identity,
        delegate: &Identity,
        target: Target,
        active: bool,
    ) -> Result<Scope, DelegationRegistryError> {
        let mut state = self.state.write();

        if active {
            self.ensure_capacity(&state.store, delegate, &target.within(*caller))?;
        }

        let scope = state.store.set_grant(caller, delegate, target, active);
        state.index.sync_membership(&scope, delegate, active);
        self.events
            .publish(DelegationEvent::new(*delegate, scope, active));

        tracing::debug!(
            vault = %caller,
            %delegate,
            scope = %scope.kind(),
            active,
            "Set grant"
        );

        Ok(scope)
    }

    /// Grant or revoke `delegate` for everything the caller owns.
    pub fn delegate_for_all(
        &self,
        caller: &Identity,
        delegate: &Identity,
        value: bool,
    ) -> Result<(), DelegationRegistryError> {
        self.set_grant(caller, delegate, Target::All, value)
            .map(|_| ())
    }

    /// Grant or revoke `delegate` for one collection of the caller.
    pub fn delegate_for_collection(
        &self,
        caller: &Identity,
        delegate: &Identity,
        collection: &Identity,
        value: bool,
    ) -> Result<(), DelegationRegistryError> {
        let target = Target::Collection {
            collection: *collection,
        };
        self.set_grant(caller, delegate, target, value).map(|_| ())
    }

    /// Grant or revoke `delegate` for one item of a collection of the caller.
    pub fn delegate_for_item(
        &self,
        caller: &Identity,
        delegate: &Identity,
        collection: &Identity,
        item: &ItemId,
        value: bool,
    ) -> Result<(), DelegationRegistryError> {
        let target = Target::Item {
            collection: *collection,
            item: *item,
        };
        self.set_grant(caller, delegate, target, value).map(|_| ())
    }

    /// Revoke every active grant the caller has given `delegate`, at every
    /// scope. Grants of other vaults are untouched.
    ///
    /// Each revoked record emits its own event. Returns the revoked scopes.
    pub fn revoke_delegate(&self, caller: &Identity, delegate: &Identity) -> Vec<Scope> {
        let mut state = self.state.write();
        let scopes: Vec<Scope> = state
            .index
            .delegations_by_delegate(delegate)
            .into_iter()
            .map(|delegation| delegation.scope)
            .filter(|scope| scope.vault() == caller)
            .collect();

        for scope in &scopes {
            self.revoke(&mut state, delegate, scope);
        }

        tracing::debug!(vault = %caller, %delegate, revoked = scopes.len(), "Revoked delegate");

        scopes
    }

    /// Revoke every active grant the caller has given anyone.
    ///
    /// Each revoked record emits its own event. Returns what was revoked.
    pub fn revoke_all_delegates(&self, caller: &Identity) -> Vec<DelegationInfo> {
        let mut state = self.state.write();
        let delegations: Vec<DelegationInfo> = ScopeKind::BROAD_TO_NARROW
            .into_iter()
            .flat_map(|kind| state.index.delegations_at(caller, kind))
            .collect();

        for delegation in &delegations {
            self.revoke(&mut state, &delegation.delegate, &delegation.scope);
        }

        tracing::debug!(vault = %caller, revoked = delegations.len(), "Revoked all delegates");

        delegations
    }

    /// Raw read of the record for `delegate` at exactly `scope`.
    pub fn raw_check(&self, delegate: &Identity, scope: &Scope) -> bool {
        self.state.read().store.raw_check(delegate, scope)
    }

    /// Whether `delegate` may act at `scope`, counting broader grants of the
    /// same vault.
    pub fn check(&self, delegate: &Identity, scope: &Scope) -> bool {
        lookup::check(&self.state.read().store, delegate, scope)
    }

    /// The narrowest scope at or above `scope` that authorizes `delegate`.
    pub fn resolve(&self, delegate: &Identity, scope: &Scope) -> Option<Scope> {
        lookup::resolve(&self.state.read().store, delegate, scope)
    }

    /// Whether `delegate` may act for `vault` across everything.
    pub fn check_all(&self, delegate: &Identity, vault: &Identity) -> bool {
        lookup::check_all(&self.state.read().store, delegate, vault)
    }

    /// Whether `delegate` may act for `vault` within `collection`.
    pub fn check_collection(
        &self,
        delegate: &Identity,
        vault: &Identity,
        collection: &Identity,
    ) -> bool {
        lookup::check_collection(&self.state.read().store, delegate, vault, collection)
    }

    /// Whether `delegate` may act for `vault` on `item` of `collection`.
    pub fn check_item(
        &self,
        delegate: &Identity,
        vault: &Identity,
        collection: &Identity,
        item: &ItemId,
    ) -> bool {
        lookup::check_item(
            &self.state.read().store,
            delegate,
            vault,
            collection,
            item,
        )
    }

    /// The delegates currently active at exactly `scope`.
    pub fn list_members(&self, scope: &Scope) -> Vec<Identity> {
        self.state.read().index.list_members(scope)
    }

    /// The delegates of `vault` for everything.
    pub fn delegates_for_all(&self, vault: &Identity) -> Vec<Identity> {
        self.list_members(&Scope::All { vault: *vault })
    }

    /// The delegates of `vault` for exactly `collection`.
    pub fn delegates_for_collection(&self, vault: &Identity, collection: &Identity) -> Vec<Identity> {
        self.list_members(&Scope::Collection {
            vault: *vault,
            collection: *collection,
        })
    }

    /// The delegates of `vault` for exactly `item` of `collection`.
    pub fn delegates_for_item(
        &self,
        vault: &Identity,
        collection: &Identity,
        item: &ItemId,
    ) -> Vec<Identity> {
        self.list_members(&Scope::Item {
            vault: *vault,
            collection: *collection,
            item: *item,
        })
    }

    /// Every active delegation naming `delegate`, across all vaults.
    pub fn delegations_by_delegate(&self, delegate: &Identity) -> Vec<DelegationInfo> {
        self.state.read().index.delegations_by_delegate(delegate)
    }

    /// Every active delegation `vault` has given, broadest scopes first.
    pub fn delegations_by_vault(&self, vault: &Identity) -> Vec<DelegationInfo> {
        let state = self.state.read();
        ScopeKind::BROAD_TO_NARROW
            .into_iter()
            .flat_map(|kind| state.index.delegations_at(vault, kind))
            .collect()
    }

    /// The active collection-level delegations of `vault`.
    pub fn collection_delegations(&self, vault: &Identity) -> Vec<DelegationInfo> {
        self.state
            .read()
            .index
            .delegations_at(vault, ScopeKind::Collection)
    }

    /// The active item-level delegations of `vault`.
    pub fn item_delegations(&self, vault: &Identity) -> Vec<DelegationInfo> {
        self.state.read().index.delegations_at(vault, ScopeKind::Item)
    }

    /// The number of active grant records.
    pub fn active_grants(&self) -> usize {
        self.state.read().store.active_grants()
    }

    /// Capture every active delegation.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::new(self.state.read().index.delegations())
    }

    fn revoke(&self, state: &mut RegistryState, delegate: &Identity, scope: &Scope) {
        state.apply(delegate, scope, false);
        self.events
            .publish(DelegationEvent::new(*delegate, *scope, false));
    }

    fn ensure_capacity(
        &self,
        store: &GrantStore,
        delegate: &Identity,
        scope: &Scope,
    ) -> Result<(), DelegationRegistryError> {
        let Some(limit) = self.config.max_active_grants else {
            return Ok(());
        };

        if store.active_grants() >= limit && !store.raw_check(delegate, scope) {
            tracing::warn!(
                vault = %scope.vault(),
                %delegate,
                scope = %scope.kind(),
                limit,
                "Refused grant, registry is at capacity"
            );
            return Err(DelegationRegistryError::CapacityExhausted { limit });
        }

        Ok(())
    }
}
