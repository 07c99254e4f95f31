//! Identifier minting for blocks and pages
//!
//! Ids only need to be unique within one post; nothing orders or looks up by them.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of fresh block/page identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Monotonic counter ids (`b1`, `b2`, ...), handy for tests and logs
#[derive(Debug, Default)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}

/// Random v4 UUID ids, used by the application
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids_are_unique_and_prefixed() {
        let ids = SequentialIds::new("b");
        assert_eq!(ids.next_id(), "b1");
        assert_eq!(ids.next_id(), "b2");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = UuidIds;
        let minted: HashSet<String> = (0..64).map(|_| ids.next_id()).collect();
        assert_eq!(minted.len(), 64);
    }
}
