use delegation_common::{Blake3Hash, Identity};

use crate::Scope;

/// BLAKE3 key-derivation context for grant keys. Changing it changes every
/// key, so it is versioned rather than edited.
const GRANT_KEY_CONTEXT: &str = "delegation-registry 2026-10-18 grant key v1";

/// Content address of one `(delegate, scope)` combination in the grant store.
///
/// Every input is fixed-width and the scope variant is tagged ahead of its
/// parameters, so the encoded preimage is injective and the key is unique for
/// as long as BLAKE3 is collision resistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrantKey(Blake3Hash);

impl GrantKey {
    /// Derive the key for `delegate` acting at `scope`.
    pub fn derive(delegate: &Identity, scope: &Scope) -> Self {
        let tag = [scope.kind() as u8];
        let mut parts: Vec<&[u8]> =
            vec![tag.as_slice(), delegate.as_ref(), scope.vault().as_ref()];

        if let Some(collection) = scope.collection() {
            parts.push(collection.as_ref());
        }
        if let Some(item) = scope.item() {
            parts.push(item.as_ref());
        }

        Self(Blake3Hash::derive(GRANT_KEY_CONTEXT, parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delegation_common::ItemId;
    use std::collections::HashSet;

    fn identity(seed: u8) -> Identity {
        Identity::from([seed; 20])
    }

    #[test]
    fn it_derives_the_same_key_for_the_same_tuple() {
        let scope = Scope::Collection {
            vault: identity(1),
            collection: identity(2),
        };

        assert_eq!(
            GrantKey::derive(&identity(3), &scope),
            GrantKey::derive(&identity(3), &scope)
        );
    }

    #[test]
    fn it_derives_distinct_keys_for_distinct_tuples() {
        let a = identity(1);
        let b = identity(2);
        let item = ItemId::from(5u64);

        let keys = [
            GrantKey::derive(&a, &Scope::All { vault: b }),
            GrantKey::derive(&b, &Scope::All { vault: a }),
            GrantKey::derive(&a, &Scope::All { vault: a }),
            GrantKey::derive(
                &a,
                &Scope::Collection {
                    vault: b,
                    collection: a,
                },
            ),
            GrantKey::derive(
                &a,
                &Scope::Collection {
                    vault: b,
                    collection: b,
                },
            ),
            GrantKey::derive(
                &a,
                &Scope::Item {
                    vault: b,
                    collection: a,
                    item,
                },
            ),
            GrantKey::derive(
                &a,
                &Scope::Item {
                    vault: b,
                    collection: a,
                    item: ItemId::from(6u64),
                },
            ),
        ];

        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn it_keys_the_zero_identity_like_any_other() {
        let zero = Identity::ZERO;

        assert_ne!(
            GrantKey::derive(&zero, &Scope::All { vault: zero }),
            GrantKey::derive(&identity(1), &Scope::All { vault: zero })
        );
    }
}
