/// ID-based handle system for sessions.
/// Sessions are owned by the collection; everything else refers to them by handle.
use std::fmt;

/// Unique identifier for a document session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub usize);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id() {
        let id1 = SessionId(0);
        let id2 = SessionId(1);
        assert_ne!(id1, id2);
        assert_eq!(id1.0, 0);
        assert_eq!(format!("{}", id1), "Session(0)");
    }

    #[test]
    fn test_id_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        let id = SessionId(42);
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
