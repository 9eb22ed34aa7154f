//! Track-based unique counting.

use std::collections::HashSet;

use tracing::debug;

use crate::counting::detection::Detection;
use crate::counting::filter::CountFilter;

/// Counts distinct tracker identities that pass a [`CountFilter`].
///
/// The running count is always the size of the seen-id set: an id that
/// qualifies once is counted once for the rest of the run, no matter how
/// many frames it stays visible for.
#[derive(Debug, Clone, Default)]
pub struct UniqueCounter {
    filter: CountFilter,
    seen: HashSet<u64>,
}

impl UniqueCounter {
    pub fn new(filter: CountFilter) -> Self {
        Self {
            filter,
            seen: HashSet::new(),
        }
    }

    /// Apply one detection and return the running count afterwards.
    pub fn observe(&mut self, detection: &Detection) -> usize {
        if !self.filter.counts(detection) {
            return self.count();
        }
        if let Some(track_id) = detection.track_id {
            if self.seen.insert(track_id) {
                debug!(track_id, count = self.seen.len(), "new {}", self.filter.target_class);
            }
        }
        self.count()
    }

    /// Observe every detection of a frame in order.
    pub fn observe_all<'a, I>(&mut self, detections: I) -> usize
    where
        I: IntoIterator<Item = &'a Detection>,
    {
        for detection in detections {
            self.observe(detection);
        }
        self.count()
    }

    pub fn count(&self) -> usize {
        self.seen.len()
    }

    pub fn has_seen(&self, track_id: u64) -> bool {
        self.seen.contains(&track_id)
    }

    /// Counted identities, in no particular order.
    pub fn seen_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.seen.iter().copied()
    }

    pub fn filter(&self) -> &CountFilter {
        &self.filter
    }
}
