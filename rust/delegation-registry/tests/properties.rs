//! Properties of arbitrary write sequences, checked against a plain set model.
mod properties {
    use std::collections::HashSet;

    use delegation_common::{Identity, ItemId};
    use delegation_registry::{DelegationRegistry, Scope, Target};
    use proptest::prelude::*;

    const IDENTITIES: u8 = 3;
    const ITEMS: u64 = 2;

    fn identity(seed: u8) -> Identity {
        Identity::from([seed; 20])
    }

    fn arb_identity() -> impl Strategy<Value = Identity> {
        (0..IDENTITIES).prop_map(identity)
    }

    fn arb_target() -> impl Strategy<Value = Target> {
        prop_oneof![
            Just(Target::All),
            arb_identity().prop_map(|collection| Target::Collection { collection }),
            (arb_identity(), 0..ITEMS).prop_map(|(collection, item)| Target::Item {
                collection,
                item: ItemId::from(item),
            }),
        ]
    }

    fn arb_write() -> impl Strategy<Value = Write> {
        (arb_identity(), arb_identity(), arb_target(), any::<bool>())
    }

    /// Every scope the strategies above can produce.
    fn every_scope() -> Vec<Scope> {
        let mut scopes = Vec::new();
        for vault in (0..IDENTITIES).map(identity) {
            scopes.push(Scope::All { vault });
            for collection in (0..IDENTITIES).map(identity) {
                scopes.push(Scope::Collection { vault, collection });
                for item in (0..ITEMS).map(ItemId::from) {
                    scopes.push(Scope::Item {
                        vault,
                        collection,
                        item,
                    });
                }
            }
        }
        scopes
    }

    type Write = (Identity, Identity, Target, bool);

    fn replay(writes: &[Write]) -> (DelegationRegistry, HashSet<(Identity, Scope)>) {
        let registry = DelegationRegistry::default();
        let mut model = HashSet::new();

        for (caller, delegate, target, active) in writes {
            let scope = registry
                .set_grant(caller, delegate, *target, *active)
                .expect("unbounded registry accepts every write");
            if *active {
                model.insert((*delegate, scope));
            } else {
                model.remove(&(*delegate, scope));
            }
        }

        (registry, model)
    }

    proptest! {
        /// Raw checks see exactly the writes made to their own tuple
        #[test]
        fn raw_checks_match_the_model(writes in prop::collection::vec(arb_write(), 0..48)) {
            let (registry, model) = replay(&writes);

            for scope in every_scope() {
                for delegate in (0..IDENTITIES).map(identity) {
                    prop_assert_eq!(
                        registry.raw_check(&delegate, &scope),
                        model.contains(&(delegate, scope))
                    );
                }
            }
            prop_assert_eq!(registry.active_grants(), model.len());
        }

        /// Enumeration lists exactly the delegates whose raw check is true
        #[test]
        fn members_match_raw_checks(writes in prop::collection::vec(arb_write(), 0..48)) {
            let (registry, _) = replay(&writes);

            for scope in every_scope() {
                let mut members = registry.list_members(&scope);
                members.sort();
                let expected: Vec<Identity> = (0..IDENTITIES)
                    .map(identity)
                    .filter(|delegate| registry.raw_check(delegate, &scope))
                    .collect();

                prop_assert_eq!(members, expected);
            }
        }

        /// A vault-wide grant authorizes every narrower scope of that vault
        #[test]
        fn vault_wide_grants_cover_everything(writes in prop::collection::vec(arb_write(), 0..48)) {
            let (registry, _) = replay(&writes);

            for scope in every_scope() {
                for delegate in (0..IDENTITIES).map(identity) {
                    if registry.check_all(&delegate, scope.vault()) {
                        prop_assert!(registry.check(&delegate, &scope));
                    }
                }
            }
        }

        /// Writing the same value twice is indistinguishable from writing it once
        #[test]
        fn repeated_writes_are_idempotent(
            writes in prop::collection::vec(arb_write(), 0..24),
            last in arb_write()
        ) {
            let mut once = writes.clone();
            once.push(last);
            let mut twice = once.clone();
            twice.push(last);

            let (once, _) = replay(&once);
            let (twice, _) = replay(&twice);

            prop_assert_eq!(once.active_grants(), twice.active_grants());
            for scope in every_scope() {
                let mut left = once.list_members(&scope);
                let mut right = twice.list_members(&scope);
                left.sort();
                right.sort();
                prop_assert_eq!(left, right);
            }
        }

        /// A snapshot restores to a registry answering every check the same way
        #[test]
        fn snapshots_restore_every_answer(writes in prop::collection::vec(arb_write(), 0..48)) {
            let (registry, _) = replay(&writes);
            let restored = DelegationRegistry::restore(
                registry.config().clone(),
                registry.snapshot(),
            ).expect("unbounded registry restores every snapshot");

            for scope in every_scope() {
                for delegate in (0..IDENTITIES).map(identity) {
                    prop_assert_eq!(
                        restored.check(&delegate, &scope),
                        registry.check(&delegate, &scope)
                    );
                }
            }
        }
    }
}
