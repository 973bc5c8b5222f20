//! Grant scopes and the narrow-to-broad order they are resolved in.
//!
//! A [`Scope`] is a full coordinate: it names the vault along with the
//! collection and item parameters of the grant. A [`Target`] carries only the
//! parameters; writes turn a target into a scope by pinning it to the
//! caller's own identity with [`Target::within`], which is the only way a
//! write path ever obtains a vault.

use std::fmt::{Display, Formatter};

use delegation_common::{Identity, ItemId};
use serde::{Deserialize, Serialize};

/// Granularity of a grant, ordered from broadest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// Everything the vault owns
    All,
    /// One collection of the vault
    Collection,
    /// One item within one collection of the vault
    Item,
}

impl ScopeKind {
    /// Every kind, broadest first.
    pub const BROAD_TO_NARROW: [ScopeKind; 3] =
        [ScopeKind::All, ScopeKind::Collection, ScopeKind::Item];

    /// Lowercase name used in logs and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::All => "all",
            ScopeKind::Collection => "collection",
            ScopeKind::Item => "item",
        }
    }
}

impl Display for ScopeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parameters of a grant without the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Act for the vault across everything
    All,
    /// Act for the vault within one collection
    Collection {
        /// The collection identifier
        collection: Identity,
    },
    /// Act for the vault on one item of a collection
    Item {
        /// The collection identifier
        collection: Identity,
        /// The item within the collection
        item: ItemId,
    },
}

impl Target {
    /// Pin these parameters to a vault.
    pub fn within(self, vault: Identity) -> Scope {
        match self {
            Target::All => Scope::All { vault },
            Target::Collection { collection } => Scope::Collection { vault, collection },
            Target::Item { collection, item } => Scope::Item {
                vault,
                collection,
                item,
            },
        }
    }

    /// The granularity of this target.
    pub fn kind(&self) -> ScopeKind {
        match self {
            Target::All => ScopeKind::All,
            Target::Collection { .. } => ScopeKind::Collection,
            Target::Item { .. } => ScopeKind::Item,
        }
    }
}

/// A full grant coordinate: the vault plus the parameters of the grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// `All(vault)`
    All {
        /// The granting vault
        vault: Identity,
    },
    /// `Collection(vault, collection)`
    Collection {
        /// The granting vault
        vault: Identity,
        /// The collection identifier
        collection: Identity,
    },
    /// `Item(vault, collection, item)`
    Item {
        /// The granting vault
        vault: Identity,
        /// The collection identifier
        collection: Identity,
        /// The item within the collection
        item: ItemId,
    },
}

impl Scope {
    /// The vault this scope belongs to.
    pub fn vault(&self) -> &Identity {
        match self {
            Scope::All { vault }
            | Scope::Collection { vault, .. }
            | Scope::Item { vault, .. } => vault,
        }
    }

    /// The collection, for collection and item scopes.
    pub fn collection(&self) -> Option<&Identity> {
        match self {
            Scope::All { .. } => None,
            Scope::Collection { collection, .. } | Scope::Item { collection, .. } => {
                Some(collection)
            }
        }
    }

    /// The item, for item scopes.
    pub fn item(&self) -> Option<&ItemId> {
        match self {
            Scope::Item { item, .. } => Some(item),
            _ => None,
        }
    }

    /// The granularity of this scope.
    pub fn kind(&self) -> ScopeKind {
        self.target().kind()
    }

    /// This scope without its vault.
    pub fn target(&self) -> Target {
        match *self {
            Scope::All { .. } => Target::All,
            Scope::Collection { collection, .. } => Target::Collection { collection },
            Scope::Item {
                collection, item, ..
            } => Target::Item { collection, item },
        }
    }

    /// The next broader scope of the same vault, if any.
    pub fn broader(&self) -> Option<Scope> {
        match *self {
            Scope::All { .. } => None,
            Scope::Collection { vault, .. } => Some(Scope::All { vault }),
            Scope::Item {
                vault, collection, ..
            } => Some(Scope::Collection { vault, collection }),
        }
    }

    /// This scope followed by every broader scope of the same vault, from
    /// narrowest to broadest. This is the order checked lookups resolve in.
    ///
    /// ```rust
    /// use delegation_common::{Identity, ItemId};
    /// use delegation_registry::{Scope, ScopeKind};
    ///
    /// let scope = Scope::Item {
    ///     vault: Identity::from([1; 20]),
    ///     collection: Identity::from([2; 20]),
    ///     item: ItemId::from(42u64),
    /// };
    /// let kinds: Vec<_> = scope.fallback().map(|scope| scope.kind()).collect();
    ///
    /// assert_eq!(kinds, [ScopeKind::Item, ScopeKind::Collection, ScopeKind::All]);
    /// ```
    pub fn fallback(&self) -> impl Iterator<Item = Scope> + use<> {
        std::iter::successors(Some(*self), Scope::broader)
    }

    /// Whether a grant at this scope authorizes acting at `other`.
    ///
    /// A scope covers itself and every narrower scope of the same vault that
    /// it is a prefix of.
    pub fn covers(&self, other: &Scope) -> bool {
        other.fallback().any(|scope| scope == *self)
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::All { vault } => write!(f, "all({vault})"),
            Scope::Collection { vault, collection } => {
                write!(f, "collection({vault}, {collection})")
            }
            Scope::Item {
                vault,
                collection,
                item,
            } => write!(f, "item({vault}, {collection}, {item})"),
        }
    }
}
