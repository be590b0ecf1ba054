//! Grouped search over two interchangeable representations.
//!
//! A grouped search sorts the dataset by payment channel, walks each
//! channel run once to pick out the transactions of the requested category,
//! then orders every non-empty group by amount (descending) and location.
//! [`ArrayProcessor`] and [`ListProcessor`] implement the same steps with
//! the same [`SortPolicy`](crate::ordering::SortPolicy); only the storage
//! and merge mechanics differ, so their timings are comparable.

mod array;
mod list;

pub use array::ArrayProcessor;
pub use list::{ListProcessor, TransactionList};

use crate::error::Result;
use crate::metrics::{PerformanceMetrics, Representation};
use crate::transaction::Transaction;
use std::io::Write;

/// Matches of one payment channel, in report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub channel: String,
    pub entries: Vec<Transaction>,
}

impl ChannelGroup {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first `n` entries.
    pub fn top(&self, n: usize) -> &[Transaction] {
        &self.entries[..n.min(self.entries.len())]
    }
}

/// Common contract of the array and linked-list processors.
pub trait GroupedProcessor {
    fn representation(&self) -> Representation;

    /// Number of transactions held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the grouped search without producing any output.
    ///
    /// Leaves the held data sorted by channel and resets the metrics to the
    /// figures of this call. Empty input is a no-op with zeroed metrics.
    /// Channels without a match produce no group.
    fn group_sort_search(&mut self, search_key: &str) -> Vec<ChannelGroup>;

    fn metrics(&self) -> &PerformanceMetrics;

    fn metrics_mut(&mut self) -> &mut PerformanceMetrics;

    /// Runs the grouped search, then renders the report to `out`.
    ///
    /// Rendering happens after the timed search, so the metrics hold the
    /// same figures as a silent run.
    fn print_grouped(
        &mut self,
        search_key: &str,
        out: &mut dyn Write,
        top_n: usize,
    ) -> Result<Vec<ChannelGroup>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let groups = self.group_sort_search(search_key);
        let displayed = render_groups(out, &groups, top_n)?;
        self.metrics_mut().results_displayed = displayed;
        Ok(groups)
    }
}

const RULE: &str = "========================================";

/// Writes the grouped report, at most `top_n` rows per channel.
///
/// Returns the number of rows written.
pub fn render_groups(out: &mut dyn Write, groups: &[ChannelGroup], top_n: usize) -> Result<usize> {
    writeln!(out, "\n{}", RULE)?;
    writeln!(out, "Grouped Transactions by Payment Channel")?;

    let mut displayed = 0;
    for group in groups {
        writeln!(out, "\n{}", RULE)?;
        writeln!(out, "Payment Channel: {}", group.channel)?;
        writeln!(out, "{}", RULE)?;
        writeln!(
            out,
            "TransactionID | SenderAccount | ReceiverAccount | Amount | TransactionType | Location | Fraud Status"
        )?;
        writeln!(out, "{}", "-".repeat(104))?;

        for tx in group.top(top_n) {
            writeln!(
                out,
                "{} | {} | {} | {} | {} | {} | {}",
                tx.id(),
                tx.sender(),
                tx.receiver(),
                tx.amount(),
                tx.category(),
                tx.location(),
                tx.fraud_label()
            )?;
            displayed += 1;
        }
    }

    if groups.is_empty() {
        writeln!(out, "\nNo matching transactions.")?;
    }
    Ok(displayed)
}

/// The first `limit` results across groups, in report order.
pub fn top_results(groups: &[ChannelGroup], limit: usize) -> impl Iterator<Item = &Transaction> {
    groups.iter().flat_map(|g| g.entries.iter()).take(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::ordering::SortPolicy;
    use std::str::FromStr;

    fn tx(id: &str, amount: &str, category: &str, location: &str, channel: &str) -> Transaction {
        Transaction::new(
            id,
            format!("S{}", id),
            format!("R{}", id),
            Amount::from_str(amount).unwrap(),
            category,
            location,
            channel,
            id.ends_with('f'),
        )
    }

    fn dataset() -> Vec<Transaction> {
        vec![
            tx("1", "100", "deposit", "Paris", "online"),
            tx("2", "250", "deposit", "Oslo", "ATM"),
            tx("3", "75", "transfer", "Rome", "ATM"),
            tx("4f", "250", "deposit", "Lima", "ATM"),
            tx("5", "40", "deposit", "Kyiv", "branch"),
            tx("6", "300", "transfer", "Cairo", "online"),
            tx("7", "100", "deposit", "Dubai", "online"),
            tx("8", "100", "deposit", "Paris", "online"),
        ]
    }

    fn ids(group: &ChannelGroup) -> Vec<&str> {
        group.entries.iter().map(|t| t.id()).collect()
    }

    fn check_grouped(groups: &[ChannelGroup]) {
        let channels: Vec<&str> = groups.iter().map(|g| g.channel.as_str()).collect();
        assert_eq!(channels, vec!["ATM", "branch", "online"]);
        assert_eq!(ids(&groups[0]), vec!["4f", "2"]);
        assert_eq!(ids(&groups[1]), vec!["5"]);
        assert_eq!(ids(&groups[2]), vec!["7", "1", "8"]);
    }

    #[test]
    fn test_array_grouped_search() {
        let mut processor = ArrayProcessor::new(&dataset());
        let groups = processor.group_sort_search("deposit");
        check_grouped(&groups);
        assert_eq!(processor.metrics().channels_processed, 3);
        assert_eq!(processor.metrics().element_count, 8);
    }

    #[test]
    fn test_list_grouped_search() {
        let mut processor = ListProcessor::new(&dataset());
        let groups = processor.group_sort_search("deposit");
        check_grouped(&groups);
        assert_eq!(processor.metrics().channels_processed, 3);
        assert_eq!(processor.metrics().representation, Representation::LinkedList);
    }

    #[test]
    fn test_both_processors_agree() {
        let data = dataset();
        for key in ["deposit", "transfer", "payment"] {
            let from_array = ArrayProcessor::new(&data).group_sort_search(key);
            let from_list = ListProcessor::new(&data).group_sort_search(key);
            assert_eq!(from_array, from_list, "key {}", key);
        }
    }

    #[test]
    fn test_empty_input_is_noop() {
        let mut array = ArrayProcessor::new(&[]);
        let mut list = ListProcessor::new(&[]);
        let mut out = Vec::new();

        assert!(array.print_grouped("deposit", &mut out, 10).unwrap().is_empty());
        assert!(list.group_sort_search("deposit").is_empty());
        assert!(out.is_empty());
        assert_eq!(array.metrics().total_time, std::time::Duration::ZERO);
        assert_eq!(list.metrics().sort_time, std::time::Duration::ZERO);
        assert_eq!(array.metrics().memory_usage(), 0);
    }

    #[test]
    fn test_no_match_yields_no_groups() {
        let mut processor = ArrayProcessor::new(&dataset());
        assert!(processor.group_sort_search("refund").is_empty());
        assert_eq!(processor.metrics().channels_processed, 3);
    }

    #[test]
    fn test_print_grouped_limits_rows() {
        let mut processor = ArrayProcessor::new(&dataset());
        let mut out = Vec::new();
        let groups = processor.print_grouped("deposit", &mut out, 2).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(processor.metrics().results_displayed, 5);
        assert!(text.contains("Payment Channel: ATM"));
        assert!(text.contains("4f | S4f | R4f | 250.00 | deposit | Lima | Fraud"));
        assert!(text.contains("7 | S7 | R7 | 100.00 | deposit | Dubai | Not Fraud"));
        assert!(!text.contains("8 | S8"));
    }

    #[test]
    fn test_top_results_follow_report_order() {
        let groups = ArrayProcessor::new(&dataset()).group_sort_search("deposit");
        let top: Vec<&str> = top_results(&groups, 4).map(|t| t.id()).collect();
        assert_eq!(top, vec!["4f", "2", "5", "7"]);
    }

    fn channel_desc(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
        b.channel().cmp(a.channel())
    }

    fn by_id(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
        a.id().cmp(b.id())
    }

    #[test]
    fn test_custom_policy_reaches_both_processors() {
        let policy = SortPolicy {
            primary: channel_desc,
            secondary: by_id,
        };
        let data = dataset();
        let mut array = ArrayProcessor::new(&data).with_policy(policy);
        let mut list = ListProcessor::new(&data).with_policy(policy);

        let processors: [&mut dyn GroupedProcessor; 2] = [&mut array, &mut list];
        for processor in processors {
            let groups = processor.group_sort_search("deposit");
            let channels: Vec<&str> = groups.iter().map(|g| g.channel.as_str()).collect();
            assert_eq!(channels, vec!["online", "branch", "ATM"], "{}", processor.representation());
            assert_eq!(ids(&groups[0]), vec!["1", "7", "8"]);
            assert_eq!(ids(&groups[2]), vec!["2", "4f"]);
        }
        assert_eq!(array.representation(), Representation::Array);
        assert_eq!(list.representation(), Representation::LinkedList);
    }

    /// Writer that stalls on every call and counts them.
    struct StallingWriter {
        delay: std::time::Duration,
        calls: u32,
    }

    impl Write for StallingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            std::thread::sleep(self.delay);
            self.calls += 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_print_grouped_timing_excludes_rendering() {
        let mut writer = StallingWriter {
            delay: std::time::Duration::from_millis(2),
            calls: 0,
        };
        let mut processor = ArrayProcessor::new(&dataset());
        processor.print_grouped("deposit", &mut writer, 10).unwrap();

        let stalled = writer.delay * writer.calls;
        assert!(writer.calls > 0);
        assert!(processor.metrics().total_time < stalled);
        assert_eq!(processor.metrics().results_displayed, 6);
    }
}
