use thiserror::Error;

/// Errors produced when parsing the primitives of this crate from text or
/// raw bytes.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DelegationCommonError {
    /// The input could not be read as a 20 byte identity
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// The input could not be read as a 32 byte item id
    #[error("Invalid item id: {0}")]
    InvalidItemId(String),
}
