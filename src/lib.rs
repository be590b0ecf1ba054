//! # Transaction Report
//!
//! Groups financial transactions by payment channel, filters each channel by
//! transaction type and ranks the matches, running the same algorithm over a
//! contiguous array and a singly linked list to compare the two.
//!
//! ## Design Principles
//!
//! - **Bounded memory**: records are streamed; a search counts its matches in
//!   one pass and loads exactly that many in a second pass
//! - **Exact amounts**: amounts are `rust_decimal` values with a total order
//! - **One sort policy**: both representations use the same stable
//!   comparators, so their results are identical
//! - **Skip, don't fail**: invalid records are counted and skipped
//!
//! ## Example
//!
//! ```no_run
//! use transaction_report::{ComparisonReporter, RecordSource, ReportConfig};
//!
//! let mut source = RecordSource::open("transactions.csv");
//! let matches = source.collect_matching(|tx| tx.category() == "deposit").unwrap();
//!
//! let reporter = ComparisonReporter::new(ReportConfig::default());
//! let mut stdout = std::io::stdout();
//! let comparison = reporter.compare(&matches, "deposit", &mut stdout).unwrap();
//! comparison.render(&mut stdout).unwrap();
//! ```

pub mod amount;
pub mod comparison;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod ordering;
pub mod processor;
pub mod source;
pub mod transaction;

pub use amount::Amount;
pub use comparison::{Comparison, ComparisonReporter, Speedup};
pub use config::{ComparisonMode, ReportConfig, SourceConfig, ValidationLimits};
pub use error::{RecordError, ReportError, Result, SkipKind};
pub use metrics::{PerformanceMetrics, Representation};
pub use processor::{ArrayProcessor, ChannelGroup, GroupedProcessor, ListProcessor};
pub use source::{RecordSource, ScanSummary, SkipStats};
pub use transaction::Transaction;
