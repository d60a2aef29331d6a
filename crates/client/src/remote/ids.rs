//! Client-side product ID synthesis.

use std::sync::atomic::{AtomicI64, Ordering};

use vitrine_core::ProductId;

/// Source of locally synthesized product IDs.
///
/// IDs are based on the millisecond wall clock and strictly increase for
/// the lifetime of the source, so two synthesized IDs never collide even
/// within the same millisecond. They sit far above the ranges catalog
/// services hand out.
#[derive(Debug, Default)]
pub struct LocalIdSource {
    last: AtomicI64,
}

impl LocalIdSource {
    /// Create a new ID source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Synthesize the next unique ID.
    pub fn next_id(&self) -> ProductId {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        ProductId::new(now.max(previous.saturating_add(1)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let source = LocalIdSource::new();
        let ids: Vec<ProductId> = (0..1000).map(|_| source.next_id()).collect();

        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
    }

    #[test]
    fn test_ids_follow_the_clock() {
        let before = chrono::Utc::now().timestamp_millis();
        let id = LocalIdSource::new().next_id();
        assert!(id.as_i64() >= before);
    }
}
