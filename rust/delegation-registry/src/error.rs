use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DelegationRegistryError {
    /// A grant would push the number of active records past the configured
    /// ceiling. Nothing was written.
    #[error("Registry capacity exhausted: at most {limit} active grants allowed")]
    CapacityExhausted {
        /// The configured ceiling
        limit: usize,
    },

    /// An error that occurs while encoding a snapshot
    #[error("Failed to encode a snapshot: {0}")]
    EncodeFailed(String),

    /// An error that occurs while decoding a snapshot
    #[error("Failed to decode a snapshot: {0}")]
    DecodeFailed(String),
}
