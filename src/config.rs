//! Tunables for loading and reporting.

use crate::amount::Amount;

/// Field bounds applied to every input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_id_len: usize,
    pub max_account_len: usize,
    pub max_category_len: usize,
    pub max_location_len: usize,
    pub max_channel_len: usize,
    /// Inclusive upper bound; the lower bound is always "strictly positive".
    pub max_amount: Amount,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            max_id_len: 50,
            max_account_len: 30,
            max_category_len: 20,
            max_location_len: 50,
            max_channel_len: 30,
            max_amount: Amount::from_units(1_000_000),
        }
    }
}

/// Settings for a [`RecordSource`](crate::source::RecordSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Maximum number of valid records returned by one page.
    pub page_size: usize,
    pub limits: ValidationLimits,
}

impl SourceConfig {
    pub const DEFAULT_PAGE_SIZE: usize = 1000;

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            page_size: Self::DEFAULT_PAGE_SIZE,
            limits: ValidationLimits::default(),
        }
    }
}

/// Which processors print while a comparison runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    /// Array prints the grouped report, list runs silently.
    #[default]
    PrintArray,
    /// Both run silently; only the comparison summary is rendered.
    Silent,
}

/// Settings for a [`ComparisonReporter`](crate::comparison::ComparisonReporter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Rows shown per channel in the grouped report.
    pub top_n: usize,
    /// When set, the linked-list side runs over consecutive batches of this size.
    pub list_batch_size: Option<usize>,
    pub mode: ComparisonMode,
}

impl ReportConfig {
    pub const DEFAULT_TOP_N: usize = 10;
    pub const DEFAULT_LIST_BATCH_SIZE: usize = 1000;
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            top_n: Self::DEFAULT_TOP_N,
            list_batch_size: Some(Self::DEFAULT_LIST_BATCH_SIZE),
            mode: ComparisonMode::default(),
        }
    }
}
