use serde::{Deserialize, Serialize};

use crate::{DelegationInfo, DelegationRegistryError};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Every active delegation of a registry at one point in time.
///
/// Inactive records are not captured: reading a missing record yields the
/// same `false` as reading a revoked one, so they carry no information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Format version, see [`SNAPSHOT_VERSION`]
    pub version: u16,
    /// The active delegations
    pub delegations: Vec<DelegationInfo>,
}

impl RegistrySnapshot {
    /// Wrap a list of active delegations.
    pub fn new(delegations: Vec<DelegationInfo>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            delegations,
        }
    }

    /// Encode as DAG-CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>, DelegationRegistryError> {
        serde_ipld_dagcbor::to_vec(self)
            .map_err(|error| DelegationRegistryError::EncodeFailed(error.to_string()))
    }

    /// Decode from DAG-CBOR, rejecting unknown format versions.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, DelegationRegistryError> {
        let snapshot: RegistrySnapshot = serde_ipld_dagcbor::from_slice(bytes)
            .map_err(|error| DelegationRegistryError::DecodeFailed(error.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DelegationRegistryError::DecodeFailed(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }

        Ok(snapshot)
    }
}

impl Default for RegistrySnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
