//! Side-by-side comparison of the array and linked-list processors.

use crate::config::{ComparisonMode, ReportConfig};
use crate::error::Result;
use crate::metrics::{PerformanceMetrics, Representation};
use crate::processor::{ArrayProcessor, ChannelGroup, GroupedProcessor, ListProcessor};
use crate::transaction::Transaction;
use log::{debug, info};
use std::io::Write;
use std::time::{Duration, Instant};

const RULE: &str = "========================================";
const MIB: f64 = 1024.0 * 1024.0;

/// Which side was faster in one phase, and by how much.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speedup {
    pub faster: Representation,
    /// `slower / faster`, always `>= 1.0`.
    pub ratio: f64,
}

/// Compares two durations. `None` unless both are non-zero.
pub fn speedup(array: Duration, list: Duration) -> Option<Speedup> {
    if array.is_zero() || list.is_zero() {
        return None;
    }
    let (faster, fast, slow) = if array <= list {
        (Representation::Array, array, list)
    } else {
        (Representation::LinkedList, list, array)
    };
    Some(Speedup {
        faster,
        ratio: slow.as_secs_f64() / fast.as_secs_f64(),
    })
}

/// Outcome of one comparison run.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub search_key: String,
    pub array: PerformanceMetrics,
    pub list: PerformanceMetrics,
    /// Number of linked-list batches the list side was split into.
    pub list_batches: usize,
    /// Grouped results of the array side.
    pub groups: Vec<ChannelGroup>,
}

impl Comparison {
    pub fn search_speedup(&self) -> Option<Speedup> {
        speedup(self.array.search_time, self.list.search_time)
    }

    pub fn sort_speedup(&self) -> Option<Speedup> {
        speedup(self.array.sort_time, self.list.sort_time)
    }

    pub fn total_speedup(&self) -> Option<Speedup> {
        speedup(self.array.total_time, self.list.total_time)
    }

    /// Extra memory of the list over the array, in percent.
    pub fn memory_overhead_percent(&self) -> Option<f64> {
        let array = self.array.memory_usage();
        if array == 0 {
            return None;
        }
        Some(100.0 * self.list.memory_usage() as f64 / array as f64 - 100.0)
    }

    /// Writes the comparison summary.
    pub fn render(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "\n{}", RULE)?;
        writeln!(out, "PERFORMANCE COMPARISON ({})", self.search_key)?;
        writeln!(out, "{}", RULE)?;
        writeln!(
            out,
            "Transactions: {} (linked list in {} batch{})",
            self.array.element_count,
            self.list_batches,
            if self.list_batches == 1 { "" } else { "es" }
        )?;
        writeln!(out, "Search Algorithm:")?;
        writeln!(out, "  Array: Linear Search O(n)")?;
        writeln!(out, "  LinkedList: Linear Search O(n)")?;
        writeln!(out, "Sort Algorithm:")?;
        writeln!(out, "  Array: Merge Sort O(n log n), O(n) auxiliary buffers")?;
        writeln!(out, "  LinkedList: Merge Sort O(n log n), node relinking")?;

        writeln!(out, "\n{}", RULE)?;
        writeln!(out, "ALGORITHM PERFORMANCE TIMINGS:")?;
        write_phase(
            out,
            "Search Time",
            self.array.search_time,
            self.list.search_time,
        )?;
        write_phase(out, "Sort Time", self.array.sort_time, self.list.sort_time)?;
        write_phase(
            out,
            "Total Processing Time",
            self.array.total_time,
            self.list.total_time,
        )?;
        writeln!(out, "\nBuild Time:")?;
        writeln!(out, "  Array: {}", format_duration(self.array.build_time))?;
        writeln!(out, "  LinkedList: {}", format_duration(self.list.build_time))?;

        writeln!(out, "\n{}", RULE)?;
        writeln!(out, "MEMORY USAGE:")?;
        writeln!(out, "Sort Working Set:")?;
        writeln!(
            out,
            "  Array: {:.4} MB (temporary arrays)",
            self.array.sort_memory() as f64 / MIB
        )?;
        writeln!(
            out,
            "  LinkedList: {:.4} MB (pointer manipulation)",
            self.list.sort_memory() as f64 / MIB
        )?;
        writeln!(out, "Dataset:")?;
        writeln!(
            out,
            "  Array: {:.4} MB",
            self.array.memory_usage() as f64 / MIB
        )?;
        writeln!(
            out,
            "  LinkedList: {:.4} MB",
            self.list.memory_usage() as f64 / MIB
        )?;
        if let Some(overhead) = self.memory_overhead_percent() {
            writeln!(
                out,
                "  Difference: LinkedList uses {:.2}% more memory",
                overhead
            )?;
        }
        writeln!(out, "{}", RULE)?;
        Ok(())
    }
}

/// Runs both processors over one dataset and collects their metrics.
///
/// Each processor gets its own copy of the data. The reporter itself keeps
/// no transactions between runs.
pub struct ComparisonReporter {
    config: ReportConfig,
}

impl ComparisonReporter {
    pub fn new(config: ReportConfig) -> Self {
        ComparisonReporter { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Compares the processors on `transactions` for `search_key`.
    ///
    /// In [`ComparisonMode::PrintArray`] the array side renders the grouped
    /// report to `out`; the list side always runs silently.
    pub fn compare(
        &self,
        transactions: &[Transaction],
        search_key: &str,
        out: &mut dyn Write,
    ) -> Result<Comparison> {
        info!(
            "Comparing representations over {} transactions for '{}'",
            transactions.len(),
            search_key
        );

        let (array, groups) = self.run_array(transactions, search_key, out)?;
        let (list, list_batches) = self.run_list(transactions, search_key);

        Ok(Comparison {
            search_key: search_key.to_string(),
            array,
            list,
            list_batches,
            groups,
        })
    }

    fn run_array(
        &self,
        transactions: &[Transaction],
        search_key: &str,
        out: &mut dyn Write,
    ) -> Result<(PerformanceMetrics, Vec<ChannelGroup>)> {
        let build_start = Instant::now();
        let mut processor = ArrayProcessor::new(transactions);
        processor.metrics_mut().build_time = build_start.elapsed();

        let groups = match self.config.mode {
            ComparisonMode::PrintArray => {
                processor.print_grouped(search_key, out, self.config.top_n)?
            }
            ComparisonMode::Silent => processor.group_sort_search(search_key),
        };
        debug!(
            "{} run finished in {:?}",
            processor.representation(),
            processor.metrics().total_time
        );
        Ok((processor.metrics().clone(), groups))
    }

    fn run_list(&self, transactions: &[Transaction], search_key: &str) -> (PerformanceMetrics, usize) {
        let mut totals = PerformanceMetrics::new(Representation::LinkedList);
        if transactions.is_empty() {
            return (totals, 0);
        }

        let batch_size = self
            .config
            .list_batch_size
            .filter(|&n| n > 0)
            .unwrap_or(transactions.len());

        let mut batches = 0;
        for batch in transactions.chunks(batch_size) {
            let build_start = Instant::now();
            let mut processor = ListProcessor::new(batch);
            processor.metrics_mut().build_time = build_start.elapsed();

            processor.group_sort_search(search_key);
            totals.accumulate(processor.metrics());
            batches += 1;
        }
        debug!(
            "LinkedList run finished in {:?} over {} batches",
            totals.total_time, batches
        );
        (totals, batches)
    }
}

impl Default for ComparisonReporter {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

fn write_phase(out: &mut dyn Write, label: &str, array: Duration, list: Duration) -> Result<()> {
    writeln!(out, "\n{}:", label)?;
    writeln!(out, "  Array: {}", format_duration(array))?;
    writeln!(out, "  LinkedList: {}", format_duration(list))?;
    if let Some(s) = speedup(array, list) {
        writeln!(out, "  Winner: {} ({:.2}x faster)", s.faster, s.ratio)?;
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    format!("{:.3} ms", d.as_secs_f64() * 1000.0)
}
