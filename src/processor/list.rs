//! Singly linked list processor.
//!
//! Nodes are owned boxes. Sorting never copies a transaction: the merge
//! sort splits a chain by taking ownership of its second half and merges by
//! moving whole nodes onto the tail of the output chain.

use super::{ChannelGroup, GroupedProcessor};
use crate::metrics::{PerformanceMetrics, Representation};
use crate::ordering::{takes_left, Comparator, SortPolicy};
use crate::transaction::Transaction;
use log::debug;
use std::iter::{self, FromIterator};
use std::time::{Duration, Instant};

type Link = Option<Box<Node>>;

struct Node {
    tx: Transaction,
    next: Link,
}

/// An owning singly linked sequence of transactions.
pub struct TransactionList {
    head: Link,
    len: usize,
}

impl TransactionList {
    pub fn new() -> Self {
        TransactionList { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Stable merge sort by relinking nodes.
    pub fn sort_by(&mut self, cmp: Comparator) {
        let head = self.head.take();
        self.head = merge_sort(head, self.len, cmp);
    }

    /// Moves the transactions out in list order.
    pub fn into_vec(mut self) -> Vec<Transaction> {
        let mut out = Vec::with_capacity(self.len);
        let mut link = self.head.take();
        while let Some(boxed) = link {
            let node = *boxed;
            link = node.next;
            out.push(node.tx);
        }
        self.len = 0;
        out
    }
}

impl Default for TransactionList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Transaction> for TransactionList {
    fn from_iter<I: IntoIterator<Item = Transaction>>(items: I) -> Self {
        let mut list = TransactionList::new();
        let mut tail = &mut list.head;
        for tx in items {
            tail = &mut tail.insert(Box::new(Node { tx, next: None })).next;
            list.len += 1;
        }
        list
    }
}

// Unlink iteratively; the default recursive drop would overflow on long chains.
impl Drop for TransactionList {
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

/// Borrowing iterator over a [`TransactionList`].
pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Transaction;

    fn next(&mut self) -> Option<&'a Transaction> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.tx
        })
    }
}

/// Sorts a chain of `len` nodes. Recursion depth is `O(log len)`.
fn merge_sort(head: Link, len: usize, cmp: Comparator) -> Link {
    if len <= 1 {
        return head;
    }
    let mid = len / 2;
    let (left, right) = split_after(head, mid);
    let left = merge_sort(left, mid, cmp);
    let right = merge_sort(right, len - mid, cmp);
    merge(left, right, cmp)
}

/// Detaches everything after the first `count` nodes.
fn split_after(mut head: Link, count: usize) -> (Link, Link) {
    if count == 0 {
        return (None, head);
    }
    let mut cursor = head.as_mut();
    for _ in 1..count {
        cursor = cursor.and_then(|node| node.next.as_mut());
    }
    let rest = cursor.and_then(|node| node.next.take());
    (head, rest)
}

/// Merges two sorted chains, moving nodes onto the tail of the result.
fn merge(mut left: Link, mut right: Link, cmp: Comparator) -> Link {
    let mut head: Link = None;
    let mut tail = &mut head;

    loop {
        let take_left = match (left.as_deref(), right.as_deref()) {
            (Some(l), Some(r)) => takes_left(cmp, &l.tx, &r.tx),
            _ => break,
        };
        let source = if take_left { &mut left } else { &mut right };
        let Some(mut node) = source.take() else {
            break;
        };
        *source = node.next.take();
        tail = &mut tail.insert(node).next;
    }

    *tail = if left.is_some() { left } else { right };
    head
}

/// Grouped search over an owned [`TransactionList`].
pub struct ListProcessor {
    list: TransactionList,
    policy: SortPolicy,
    metrics: PerformanceMetrics,
}

impl ListProcessor {
    /// Copies `transactions` into a freshly linked list.
    pub fn new(transactions: &[Transaction]) -> Self {
        Self::from_list(transactions.iter().cloned().collect())
    }

    pub fn from_list(list: TransactionList) -> Self {
        let mut metrics = PerformanceMetrics::new(Representation::LinkedList);
        metrics.element_count = list.len();
        ListProcessor {
            list,
            policy: SortPolicy::default(),
            metrics,
        }
    }

    pub fn with_policy(mut self, policy: SortPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn list(&self) -> &TransactionList {
        &self.list
    }
}

impl GroupedProcessor for ListProcessor {
    fn representation(&self) -> Representation {
        Representation::LinkedList
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn group_sort_search(&mut self, search_key: &str) -> Vec<ChannelGroup> {
        let mut metrics = PerformanceMetrics::new(Representation::LinkedList);
        metrics.element_count = self.list.len();
        metrics.build_time = self.metrics.build_time;

        if self.list.is_empty() {
            self.metrics = metrics;
            return Vec::new();
        }

        let started = Instant::now();

        let sort_start = Instant::now();
        self.list.sort_by(self.policy.primary);
        let mut sort_time = sort_start.elapsed();
        let mut search_time = Duration::ZERO;

        let mut groups = Vec::new();
        let mut cursor = self.list.iter().peekable();
        while let Some(first) = cursor.peek() {
            let channel = first.channel().to_string();

            // Consume exactly this channel's run, keeping matches in encounter order.
            let search_start = Instant::now();
            let mut group: TransactionList =
                iter::from_fn(|| cursor.next_if(|tx| tx.channel() == channel))
                    .filter(|tx| tx.category() == search_key)
                    .cloned()
                    .collect();
            search_time += search_start.elapsed();

            if !group.is_empty() {
                let group_sort_start = Instant::now();
                group.sort_by(self.policy.secondary);
                sort_time += group_sort_start.elapsed();

                debug!("LinkedList: channel {} has {} matches", channel, group.len());
                groups.push(ChannelGroup {
                    channel,
                    entries: group.into_vec(),
                });
            }

            metrics.channels_processed += 1;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::ordering::{by_amount_desc_then_location, by_channel};

    fn tx(id: &str, channel: &str, amount: u64, location: &str) -> Transaction {
        Transaction::new(
            id,
            "A",
            "B",
            Amount::from_units(amount),
            "deposit",
            location,
            channel,
            false,
        )
    }

    fn ids(list: &TransactionList) -> Vec<&str> {
        list.iter().map(|t| t.id()).collect()
    }

    #[test]
    fn test_from_iter_preserves_order() {
        let list: TransactionList = vec![tx("1", "a", 1, "x"), tx("2", "b", 1, "x")]
            .into_iter()
            .collect();
        assert_eq!(list.len(), 2);
        assert_eq!(ids(&list), vec!["1", "2"]);
    }

    #[test]
    fn test_split_after() {
        let mut list: TransactionList = (0..5).map(|i| tx(&i.to_string(), "a", 1, "x")).collect();
        let head = list.head.take();
        let (left, right) = split_after(head, 2);
        let left = TransactionList { head: left, len: 2 };
        let right = TransactionList { head: right, len: 3 };
        assert_eq!(ids(&left), vec!["0", "1"]);
        assert_eq!(ids(&right), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_sort_by_channel_is_stable() {
        let mut list: TransactionList = vec![
            tx("1", "ATM", 1, "x"),
            tx("2", "ONLINE", 1, "x"),
            tx("3", "ATM", 1, "x"),
            tx("4", "BRANCH", 1, "x"),
        ]
        .into_iter()
        .collect();
        list.sort_by(by_channel);
        assert_eq!(ids(&list), vec!["1", "3", "4", "2"]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_sort_by_amount_then_location() {
        let mut list: TransactionList = vec![
            tx("1", "a", 10, "Rome"),
            tx("2", "a", 30, "Oslo"),
            tx("3", "a", 10, "Baku"),
            tx("4", "a", 30, "Oslo"),
            tx("5", "a", 20, "Apia"),
        ]
        .into_iter()
        .collect();
        list.sort_by(by_amount_desc_then_location);
        assert_eq!(ids(&list), vec!["2", "4", "5", "3", "1"]);
    }

    #[test]
    fn test_long_list_drops_without_overflow() {
        let list: TransactionList = (0..200_000)
            .map(|i| tx(&i.to_string(), if i % 2 == 0 { "a" } else { "b" }, 1, "x"))
            .collect();
        assert_eq!(list.len(), 200_000);
        drop(list);
    }

    #[test]
    fn test_into_vec() {
        let list: TransactionList = vec![tx("1", "a", 1, "x"), tx("2", "a", 1, "x")]
            .into_iter()
            .collect();
        let items = list.into_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id(), "2");
    }
}
