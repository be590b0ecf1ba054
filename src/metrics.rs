//! Timing and memory figures for one processor run.

use crate::transaction::Transaction;
use std::fmt;
use std::mem::size_of;
use std::time::Duration;

/// Backing representation of a processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Array,
    LinkedList,
}

impl Representation {
    pub fn name(&self) -> &'static str {
        match self {
            Representation::Array => "Array",
            Representation::LinkedList => "LinkedList",
        }
    }

    /// Per-element link overhead in bytes.
    pub fn link_overhead(&self) -> usize {
        match self {
            Representation::Array => 0,
            Representation::LinkedList => size_of::<usize>(),
        }
    }

    /// Resident size of `count` elements.
    pub fn footprint(&self, count: usize) -> usize {
        count * (size_of::<Transaction>() + self.link_overhead())
    }

    /// Estimated peak working set of a merge sort over `count` elements.
    ///
    /// The array merges through copied halves; the list only rewires links
    /// and carries a second pointer per node while splitting.
    pub fn sort_footprint(&self, count: usize) -> usize {
        match self {
            Representation::Array => count * size_of::<Transaction>() * 2,
            Representation::LinkedList => {
                count * (size_of::<Transaction>() + size_of::<usize>() * 2)
            }
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters collected by one processor.
///
/// A fresh value is created for every run; batch runs are folded together
/// with [`PerformanceMetrics::accumulate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceMetrics {
    pub representation: Representation,
    pub element_count: usize,
    /// Time spent copying the dataset into the representation.
    pub build_time: Duration,
    /// Channel sort plus every per-group sort.
    pub sort_time: Duration,
    /// Sum of the per-group filter scans.
    pub search_time: Duration,
    /// Wall time of the whole grouped search.
    pub total_time: Duration,
    pub channels_processed: usize,
    pub results_displayed: usize,
}

impl PerformanceMetrics {
    pub fn new(representation: Representation) -> Self {
        PerformanceMetrics {
            representation,
            element_count: 0,
            build_time: Duration::ZERO,
            sort_time: Duration::ZERO,
            search_time: Duration::ZERO,
            total_time: Duration::ZERO,
            channels_processed: 0,
            results_displayed: 0,
        }
    }

    /// Bytes held by the dataset in this representation.
    pub fn memory_usage(&self) -> usize {
        self.representation.footprint(self.element_count)
    }

    pub fn sort_memory(&self) -> usize {
        self.representation.sort_footprint(self.element_count)
    }

    /// Adds another run of the same representation into this one.
    pub fn accumulate(&mut self, other: &PerformanceMetrics) {
        debug_assert_eq!(self.representation, other.representation);
        self.element_count += other.element_count;
        self.build_time += other.build_time;
        self.sort_time += other.sort_time;
        self.search_time += other.search_time;
        self.total_time += other.total_time;
        self.channels_processed += other.channels_processed;
        self.results_displayed += other.results_displayed;
    }
}
