use serde::{Deserialize, Serialize};

/// Default buffer of the event channel, per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Settings of a [`DelegationRegistry`](crate::DelegationRegistry).
///
/// ```rust
/// use delegation_registry::RegistryConfig;
///
/// let config = RegistryConfig::default()
///     .with_max_active_grants(10_000)
///     .with_event_capacity(64);
///
/// assert_eq!(config.max_active_grants, Some(10_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Ceiling on simultaneously active grant records. Writes that would
    /// activate a record beyond it are refused. `None` is unbounded.
    pub max_active_grants: Option<usize>,
    /// How many events each subscriber may fall behind before lagging.
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_active_grants: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Cap the number of active grant records.
    pub fn with_max_active_grants(mut self, limit: usize) -> Self {
        self.max_active_grants = Some(limit);
        self
    }

    /// Set the per-subscriber event buffer.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}
