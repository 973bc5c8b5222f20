#![warn(missing_docs)]

//! A shared registry of delegations.
//!
//! Each vault (an account identity) may authorize delegates to act on its
//! behalf at one of three nested scopes: everything it owns, one collection,
//! or one item of a collection. Grants are boolean records keyed by a digest
//! of the delegate and the full scope coordinate, and a checked lookup lets a
//! broader grant authorize any narrower scope beneath it.
//!
//! Next to the records sits an [`EnumerationIndex`] that answers "who holds
//! this exact scope?", a stream of [`DelegationEvent`]s for every write, and
//! [`RegistrySnapshot`]s that persist the active delegations as DAG-CBOR.
//!
//! ```rust
//! use delegation_common::{Identity, ItemId};
//! use delegation_registry::{DelegationRegistry, Scope};
//!
//! # fn main() -> Result<(), delegation_registry::DelegationRegistryError> {
//! let registry = DelegationRegistry::default();
//! let vault = Identity::from([1; 20]);
//! let delegate = Identity::from([2; 20]);
//! let collection = Identity::from([3; 20]);
//! let item = ItemId::from(7u64);
//!
//! registry.delegate_for_item(&vault, &delegate, &collection, &item, true)?;
//!
//! assert!(registry.check_item(&delegate, &vault, &collection, &item));
//! assert!(!registry.check_collection(&delegate, &vault, &collection));
//! assert_eq!(
//!     registry.resolve(&delegate, &Scope::Item { vault, collection, item }),
//!     Some(Scope::Item { vault, collection, item })
//! );
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod config;
pub use config::*;

mod scope;
pub use scope::*;

mod key;
pub use key::*;

mod store;
pub use store::*;

mod delegation;
pub use delegation::*;

mod index;
pub use index::*;

pub mod lookup;
pub use lookup::GrantSource;

mod event;
pub use event::*;

mod snapshot;
pub use snapshot::*;

mod registry;
pub use registry::*;
