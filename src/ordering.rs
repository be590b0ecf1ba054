//! Sort policy shared by both processors.
//!
//! Each processor supplies its own merge mechanics; what "ordered" means is
//! defined only here. Merges take the left element whenever
//! [`takes_left`] holds, which keeps every sort stable.

use crate::transaction::Transaction;
use std::cmp::Ordering;

/// A total order over transactions.
pub type Comparator = fn(&Transaction, &Transaction) -> Ordering;

/// Payment channel, ascending.
pub fn by_channel(a: &Transaction, b: &Transaction) -> Ordering {
    a.channel().cmp(b.channel())
}

/// Amount descending, then location ascending.
pub fn by_amount_desc_then_location(a: &Transaction, b: &Transaction) -> Ordering {
    b.amount()
        .cmp(&a.amount())
        .then_with(|| a.location().cmp(b.location()))
}

/// Whether a merge should emit `left` before `right`. Ties go left.
#[inline]
pub fn takes_left(cmp: Comparator, left: &Transaction, right: &Transaction) -> bool {
    cmp(left, right) != Ordering::Greater
}

/// The pair of orders used by a grouped search.
#[derive(Clone, Copy)]
pub struct SortPolicy {
    /// Orders the whole dataset before grouping.
    pub primary: Comparator,
    /// Orders each filtered group.
    pub secondary: Comparator,
}

impl Default for SortPolicy {
    fn default() -> Self {
        SortPolicy {
            primary: by_channel,
            secondary: by_amount_desc_then_location,
        }
    }
}
