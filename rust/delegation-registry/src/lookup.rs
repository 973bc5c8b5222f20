//! Checked lookups: authorization with broader-implies-narrower fallback.
//!
//! A check walks [`Scope::fallback`] from the requested scope up to
//! `All(vault)` and stops at the first active record. Revoking a narrow
//! record never hides a broader grant that still covers it.

use delegation_common::{Identity, ItemId};

use crate::{GrantStore, Scope};

/// Anything that can answer a raw, exact-scope grant check.
pub trait GrantSource {
    /// Whether the record for `delegate` at exactly `scope` is active.
    fn raw_check(&self, delegate: &Identity, scope: &Scope) -> bool;
}

impl GrantSource for GrantStore {
    fn raw_check(&self, delegate: &Identity, scope: &Scope) -> bool {
        GrantStore::raw_check(self, delegate, scope)
    }
}

/// The narrowest scope at or above `scope` where `delegate` holds an active
/// grant, or `None` if every level is inactive.
pub fn resolve<S>(source: &S, delegate: &Identity, scope: &Scope) -> Option<Scope>
where
    S: GrantSource + ?Sized,
{
    let resolved = scope
        .fallback()
        .find(|candidate| source.raw_check(delegate, candidate));

    match &resolved {
        Some(by) => tracing::trace!(%delegate, requested = %scope, %by, "Delegate authorized"),
        None => tracing::trace!(%delegate, requested = %scope, "Delegate not authorized"),
    }

    resolved
}

/// Whether `delegate` may act for `vault` at `scope`, counting broader grants.
pub fn check<S>(source: &S, delegate: &Identity, scope: &Scope) -> bool
where
    S: GrantSource + ?Sized,
{
    resolve(source, delegate, scope).is_some()
}

/// `All(vault)` only.
pub fn check_all<S>(source: &S, delegate: &Identity, vault: &Identity) -> bool
where
    S: GrantSource + ?Sized,
{
    check(source, delegate, &Scope::All { vault: *vault })
}

/// `Collection(vault, collection)`, then `All(vault)`.
pub fn check_collection<S>(
    source: &S,
    delegate: &Identity,
    vault: &Identity,
    collection: &Identity,
) -> bool
where
    S: GrantSource + ?Sized,
{
    check(
        source,
        delegate,
        &Scope::Collection {
            vault: *vault,
            collection: *collection,
        },
    )
}

/// `Item(vault, collection, item)`, then `Collection(vault, collection)`,
/// then `All(vault)`.
pub fn check_item<S>(
    source: &S,
    delegate: &Identity,
    vault: &Identity,
    collection: &Identity,
    item: &ItemId,
) -> bool
where
    S: GrantSource + ?Sized,
{
    check(
        source,
        delegate,
        &Scope::Item {
            vault: *vault,
            collection: *collection,
            item: *item,
        },
    )
}
