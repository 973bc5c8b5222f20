#![warn(missing_docs)]

//! Light weight primitives shared by the delegation registry crates: opaque
//! fixed-width identities, item identifiers and the BLAKE3 digest that grant
//! keys are built from. Nothing in here interprets the bytes it carries.

mod error;
pub use error::*;

mod hash;
pub use hash::*;

mod identity;
pub use identity::*;
