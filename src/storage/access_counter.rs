//! Segment access statistics
//!
//! Every iterator handed out by a segment records how it reads the data.
//! An adaptive re-encoding component consumes these tallies to decide
//! whether a segment should move to a codec with cheaper point access.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Access pattern of a single read request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    /// A single position
    Point,
    /// Consecutive ascending positions
    Sequential,
    /// Ascending positions with gaps or repeats
    Monotonic,
    /// Any other order
    Random,
}

impl AccessType {
    pub const ALL: [AccessType; 4] = [
        AccessType::Point,
        AccessType::Sequential,
        AccessType::Monotonic,
        AccessType::Random,
    ];

    /// Classifies the access pattern of a position list
    pub fn classify(positions: &[usize]) -> Self {
        if positions.len() <= 1 {
            return AccessType::Point;
        }

        let mut consecutive = true;
        for pair in positions.windows(2) {
            if pair[1] < pair[0] {
                return AccessType::Random;
            }
            if pair[1] != pair[0] + 1 {
                consecutive = false;
            }
        }

        if consecutive {
            AccessType::Sequential
        } else {
            AccessType::Monotonic
        }
    }

    fn slot(self) -> usize {
        match self {
            AccessType::Point => 0,
            AccessType::Sequential => 1,
            AccessType::Monotonic => 2,
            AccessType::Random => 3,
        }
    }
}

/// Snapshot of a segment's access tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCounts {
    pub point: u64,
    pub sequential: u64,
    pub monotonic: u64,
    pub random: u64,
}

impl AccessCounts {
    pub fn total(&self) -> u64 {
        self.point + self.sequential + self.monotonic + self.random
    }
}

/// Per-segment access tallies, updated through shared references
#[derive(Debug, Default)]
pub struct SegmentAccessCounter {
    counters: [AtomicU64; 4],
}

impl SegmentAccessCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` accesses of `access_type`
    pub fn increment(&self, access_type: AccessType, count: u64) {
        self.counters[access_type.slot()].fetch_add(count, Ordering::Relaxed);
    }

    /// Records a position-list access, classified by its order
    pub fn record_positions(&self, positions: &[usize]) -> AccessType {
        let access_type = AccessType::classify(positions);
        self.increment(access_type, positions.len() as u64);
        access_type
    }

    pub fn get(&self, access_type: AccessType) -> u64 {
        self.counters[access_type.slot()].load(Ordering::Relaxed)
    }

    pub fn counts(&self) -> AccessCounts {
        AccessCounts {
            point: self.get(AccessType::Point),
            sequential: self.get(AccessType::Sequential),
            monotonic: self.get(AccessType::Monotonic),
            random: self.get(AccessType::Random),
        }
    }

    pub fn reset(&self) {
        for counter in &self.counters {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Clone for SegmentAccessCounter {
    fn clone(&self) -> Self {
        let copy = Self::new();
        for access_type in AccessType::ALL {
            copy.increment(access_type, self.get(access_type));
        }
        copy
    }
}
