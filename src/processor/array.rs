//! Contiguous-array processor.

use super::{ChannelGroup, GroupedProcessor};
use crate::metrics::{PerformanceMetrics, Representation};
use crate::ordering::{takes_left, Comparator, SortPolicy};
use crate::transaction::Transaction;
use log::debug;
use std::time::{Duration, Instant};

/// Grouped search over an owned `Vec<Transaction>`.
pub struct ArrayProcessor {
    items: Vec<Transaction>,
    policy: SortPolicy,
    metrics: PerformanceMetrics,
}

impl ArrayProcessor {
    /// Copies `transactions` into a new processor.
    pub fn new(transactions: &[Transaction]) -> Self {
        Self::from_vec(transactions.to_vec())
    }

    /// Takes ownership of an already built vector.
    pub fn from_vec(items: Vec<Transaction>) -> Self {
        let mut metrics = PerformanceMetrics::new(Representation::Array);
        metrics.element_count = items.len();
        ArrayProcessor {
            items,
            policy: SortPolicy::default(),
            metrics,
        }
    }

    pub fn with_policy(mut self, policy: SortPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Held transactions in their current order.
    pub fn as_slice(&self) -> &[Transaction] {
        &self.items
    }
}

impl GroupedProcessor for ArrayProcessor {
    fn representation(&self) -> Representation {
        Representation::Array
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn group_sort_search(&mut self, search_key: &str) -> Vec<ChannelGroup> {
        let mut metrics = PerformanceMetrics::new(Representation::Array);
        metrics.element_count = self.items.len();
        metrics.build_time = self.metrics.build_time;

        if self.items.is_empty() {
            self.metrics = metrics;
            return Vec::new();
        }

        let started = Instant::now();

        let sort_start = Instant::now();
        merge_sort(&mut self.items, self.policy.primary);
        let mut sort_time = sort_start.elapsed();
        let mut search_time = Duration::ZERO;

        let mut groups = Vec::new();
        let mut start = 0;
        while start < self.items.len() {
            let channel = self.items[start].channel();
            let run = self.items[start..]
                .iter()
                .take_while(|tx| tx.channel() == channel)
                .count();
            let end = start + run;

            let search_start = Instant::now();
            let mut matches: Vec<Transaction> = self.items[start..end]
                .iter()
                .filter(|tx| tx.category() == search_key)
                .cloned()
                .collect();
            search_time += search_start.elapsed();

            if !matches.is_empty() {
                let group_sort_start = Instant::now();
                merge_sort(&mut matches, self.policy.secondary);
                sort_time += group_sort_start.elapsed();

                debug!("Array: channel {} has {} matches", channel, matches.len());
                groups.push(ChannelGroup {
                    channel: channel.to_string(),
                    entries: matches,
                });
            }

            metrics.channels_processed += 1;
            start = end;
        }

        metrics.sort_time = sort_time;
        metrics.search_time = search_time;
        metrics.total_time = started.elapsed();
        self.metrics = metrics;
        groups
    }

    fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    fn metrics_mut(&mut self) -> &mut PerformanceMetrics {
        &mut self.metrics
    }
}

/// Stable top-down merge sort over index ranges of a slice.
fn merge_sort(items: &mut [Transaction], cmp: Comparator) {
    if items.len() <= 1 {
        return;
    }
    let mid = items.len() / 2;
    merge_sort(&mut items[..mid], cmp);
    merge_sort(&mut items[mid..], cmp);
    merge(items, mid, cmp);
}

/// Merges the sorted halves `items[..mid]` and `items[mid..]` through
/// temporary copies of each half.
fn merge(items: &mut [Transaction], mid: usize, cmp: Comparator) {
    let mut left = items[..mid].to_vec().into_iter().peekable();
    let mut right = items[mid..].to_vec().into_iter().peekable();

    for slot in items.iter_mut() {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => takes_left(cmp, l, r),
            (Some(_), None) => true,
            (None, _) => false,
        };
        let next = if take_left { left.next() } else { right.next() };
        if let Some(tx) = next {
            *slot = tx;
        }
    }
}
