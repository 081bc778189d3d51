use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name a queue is registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueueId(pub String);

impl QueueId {
    /// Create a queue ID from a string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for QueueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for QueueId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<&QueueId> for QueueId {
    fn from(id: &QueueId) -> Self {
        id.clone()
    }
}

/// Identity of one engine instance, distinct even for equal queue ids in
/// separate registries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineId(pub Uuid);

impl EngineId {
    /// Generate a new unique engine ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_id_conversions() {
        let a = QueueId::from("uploads");
        let b = QueueId::from("uploads".to_string());
        let c = QueueId::from(&a);

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.as_str(), "uploads");
        assert_eq!(a.to_string(), "uploads");
    }

    #[test]
    fn test_engine_ids_are_unique() {
        assert_ne!(EngineId::new(), EngineId::new());
    }
}
