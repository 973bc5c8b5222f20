use delegation_common::{Identity, ItemId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{Scope, ScopeKind};

/// Notification emitted for every grant write, so observers can replay the
/// history of the registry without scanning its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelegationEvent {
    /// `All(vault)` was set for `delegate`
    DelegateForAll {
        /// The writing vault
        vault: Identity,
        /// The delegate whose record was written
        delegate: Identity,
        /// The new value of the record
        value: bool,
    },
    /// `Collection(vault, collection)` was set for `delegate`
    DelegateForCollection {
        /// The writing vault
        vault: Identity,
        /// The delegate whose record was written
        delegate: Identity,
        /// The collection identifier
        collection: Identity,
        /// The new value of the record
        value: bool,
    },
    /// `Item(vault, collection, item)` was set for `delegate`
    DelegateForItem {
        /// The writing vault
        vault: Identity,
        /// The delegate whose record was written
        delegate: Identity,
        /// The collection identifier
        collection: Identity,
        /// The item within the collection
        item: ItemId,
        /// The new value of the record
        value: bool,
    },
}

impl DelegationEvent {
    /// Describe a write of `value` for `delegate` at `scope`.
    pub fn new(delegate: Identity, scope: Scope, value: bool) -> Self {
        match scope {
            Scope::All { vault } => DelegationEvent::DelegateForAll {
                vault,
                delegate,
                value,
            },
            Scope::Collection { vault, collection } => DelegationEvent::DelegateForCollection {
                vault,
                delegate,
                collection,
                value,
            },
            Scope::Item {
                vault,
                collection,
                item,
            } => DelegationEvent::DelegateForItem {
                vault,
                delegate,
                collection,
                item,
                value,
            },
        }
    }

    /// The delegate whose record was written.
    pub fn delegate(&self) -> &Identity {
        match self {
            DelegationEvent::DelegateForAll { delegate, .. }
            | DelegationEvent::DelegateForCollection { delegate, .. }
            | DelegationEvent::DelegateForItem { delegate, .. } => delegate,
        }
    }

    /// The written scope, including the vault.
    pub fn scope(&self) -> Scope {
        match *self {
            DelegationEvent::DelegateForAll { vault, .. } => Scope::All { vault },
            DelegationEvent::DelegateForCollection {
                vault, collection, ..
            } => Scope::Collection { vault, collection },
            DelegationEvent::DelegateForItem {
                vault,
                collection,
                item,
                ..
            } => Scope::Item {
                vault,
                collection,
                item,
            },
        }
    }

    /// The writing vault.
    pub fn vault(&self) -> &Identity {
        match self {
            DelegationEvent::DelegateForAll { vault, .. }
            | DelegationEvent::DelegateForCollection { vault, .. }
            | DelegationEvent::DelegateForItem { vault, .. } => vault,
        }
    }

    /// The new value of the record.
    pub fn value(&self) -> bool {
        match self {
            DelegationEvent::DelegateForAll { value, .. }
            | DelegationEvent::DelegateForCollection { value, .. }
            | DelegationEvent::DelegateForItem { value, .. } => *value,
        }
    }

    /// The granularity of the write.
    pub fn kind(&self) -> ScopeKind {
        match self {
            DelegationEvent::DelegateForAll { .. } => ScopeKind::All,
            DelegationEvent::DelegateForCollection { .. } => ScopeKind::Collection,
            DelegationEvent::DelegateForItem { .. } => ScopeKind::Item,
        }
    }
}

/// Fan-out of [`DelegationEvent`]s to any number of subscribers.
///
/// Publishing never blocks. A subscriber that falls more than the channel
/// capacity behind observes [`broadcast::error::RecvError::Lagged`].
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DelegationEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DelegationEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: DelegationEvent) {
        // Only fails when nobody is listening
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn identity(seed: u8) -> Identity {
        Identity::from([seed; 20])
    }

    #[test]
    fn it_describes_writes_at_each_scope() {
        let (vault, delegate, collection) = (identity(1), identity(2), identity(3));
        let item = ItemId::from(42u64);

        for scope in [
            Scope::All { vault },
            Scope::Collection { vault, collection },
            Scope::Item {
                vault,
                collection,
                item,
            },
        ] {
            let event = DelegationEvent::new(delegate, scope, true);

            assert_eq!(event.scope(), scope);
            assert_eq!(event.kind(), scope.kind());
            assert_eq!(event.vault(), &vault);
            assert_eq!(event.delegate(), &delegate);
            assert!(event.value());
        }
    }

    #[test]
    fn it_delivers_events_to_every_subscriber_in_order() -> TestResult {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let grant = DelegationEvent::new(identity(2), Scope::All { vault: identity(1) }, true);
        let revoke = DelegationEvent::new(identity(2), Scope::All { vault: identity(1) }, false);

        bus.publish(grant);
        bus.publish(revoke);

        assert_eq!(first.try_recv()?, grant);
        assert_eq!(first.try_recv()?, revoke);
        assert_eq!(second.try_recv()?, grant);
        assert_eq!(second.try_recv()?, revoke);

        Ok(())
    }

    #[test]
    fn it_publishes_without_subscribers() -> TestResult {
        let bus = EventBus::new(0);
        let event = DelegationEvent::new(identity(2), Scope::All { vault: identity(1) }, true);
        bus.publish(event);

        let mut late = bus.subscribe();
        bus.publish(event);

        assert_eq!(late.try_recv()?, event);
        assert!(late.try_recv().is_err());

        Ok(())
    }

    #[test]
    fn it_serializes_events_with_named_fields() -> TestResult {
        let event = DelegationEvent::new(
            identity(2),
            Scope::Collection {
                vault: identity(1),
                collection: identity(3),
            },
            false,
        );
        let json = serde_json::to_value(event)?;

        assert_eq!(json["DelegateForCollection"]["value"], false);
        assert_eq!(serde_json::from_value::<DelegationEvent>(json)?, event);

        Ok(())
    }
}
