//! Bounded-memory record source.
//!
//! Reads a 16-column delimited file and yields validated [`Transaction`]s
//! without holding the whole file in memory. Two retrieval modes share the
//! same validation:
//!
//! - **Paged**: [`RecordSource::load_next_page`] fills a page of at most
//!   `page_size` valid records, replacing the previous page.
//! - **Streaming**: [`RecordSource::initialize_streaming`] opens a fresh pass
//!   over the file and [`RecordSource::next_streamed_transaction`] yields one
//!   record at a time. A stream is not restartable; a second pass reopens the
//!   file. [`RecordSource::collect_matching`] builds on this to count first and
//!   then fill an exactly sized buffer.
//!
//! Invalid lines are skipped and tallied in [`SkipStats`]. Only failing to
//! open or read the file is an error.

use crate::config::SourceConfig;
use crate::error::{ReportError, Result, SkipKind};
use crate::transaction::Transaction;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

type CsvReader = csv::Reader<BufReader<File>>;

/// Skipped-record tallies for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipStats {
    pub malformed: u64,
    pub validation: u64,
    pub parse: u64,
}

impl SkipStats {
    pub fn total(&self) -> u64 {
        self.malformed + self.validation + self.parse
    }

    fn record(&mut self, kind: SkipKind) {
        match kind {
            SkipKind::Malformed => self.malformed += 1,
            SkipKind::Validation => self.validation += 1,
            SkipKind::Parse => self.parse += 1,
        }
    }
}

/// Totals of the most recent counting pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Valid transactions seen.
    pub transactions: u64,
    /// Transactions accepted by the predicate.
    pub matches: u64,
    pub skipped: SkipStats,
}

/// Cursor over a delimited transaction file.
///
/// All position state lives on the instance, so independent sources over
/// the same or different files never interfere.
pub struct RecordSource {
    path: Option<PathBuf>,
    config: SourceConfig,

    page_reader: Option<CsvReader>,
    pages_exhausted: bool,
    page: Vec<Transaction>,
    pages_loaded: usize,

    stream: Option<CsvReader>,
    streamed: u64,

    stats: SkipStats,
    last_scan: Option<ScanSummary>,
    scratch: StringRecord,
}

impl RecordSource {
    /// Creates a source with no path and default settings.
    pub fn new() -> Self {
        Self::with_config(SourceConfig::default())
    }

    pub fn with_config(config: SourceConfig) -> Self {
        RecordSource {
            path: None,
            config,
            page_reader: None,
            pages_exhausted: false,
            page: Vec::new(),
            pages_loaded: 0,
            stream: None,
            streamed: 0,
            stats: SkipStats::default(),
            last_scan: None,
            scratch: StringRecord::new(),
        }
    }

    /// Creates a source already pointed at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let mut source = Self::new();
        source.set_source(path);
        source
    }

    /// Points the source at a new file and resets every cursor.
    pub fn set_source(&mut self, path: impl AsRef<Path>) {
        self.path = Some(path.as_ref().to_path_buf());
        self.reset_pages();
        self.close_stream();
        self.streamed = 0;
        self.stats = SkipStats::default();
        self.last_scan = None;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Skip tallies of the current (or most recent) scan.
    pub fn skip_stats(&self) -> SkipStats {
        self.stats
    }

    /// Summary of the last completed [`count_matching`](Self::count_matching)
    /// pass. The second pass of [`collect_matching`](Self::collect_matching)
    /// stops early, so this is the figure to report for a whole-file scan.
    pub fn last_scan(&self) -> Option<ScanSummary> {
        self.last_scan
    }

    // ---- paged mode ----

    /// Loads the page after the one previously returned.
    ///
    /// Returns `Ok(false)` once a page comes back with no valid records; the
    /// current page is then empty. The previous page is always discarded.
    pub fn load_next_page(&mut self) -> Result<bool> {
        self.page.clear();
        if self.pages_exhausted {
            return Ok(false);
        }

        if self.page_reader.is_none() {
            self.page_reader = Some(self.open_reader()?);
            self.stats = SkipStats::default();
        }

        let page_size = self.config.page_size.max(1);
        let mut page = Vec::with_capacity(page_size);
        if let Some(reader) = self.page_reader.as_mut() {
            while page.len() < page_size {
                match read_valid(reader, &mut self.scratch, &self.config, &mut self.stats)? {
                    Some(tx) => page.push(tx),
                    None => break,
                }
            }
        }
        self.page = page;

        if self.page.is_empty() {
            self.pages_exhausted = true;
            self.page_reader = None;
            info!(
                "Paging finished after {} pages ({} records skipped)",
                self.pages_loaded,
                self.stats.total()
            );
            return Ok(false);
        }

        self.pages_loaded += 1;
        debug!(
            "Loaded page {} with {} transactions",
            self.pages_loaded,
            self.page.len()
        );
        Ok(true)
    }

    /// Number of transactions in the current page.
    pub fn current_page_count(&self) -> usize {
        self.page.len()
    }

    pub fn current_page(&self) -> &[Transaction] {
        &self.page
    }

    /// Number of non-empty pages returned since the last reset.
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// Rewinds paging so the next call returns the first page again.
    pub fn reset_pages(&mut self) {
        self.page_reader = None;
        self.pages_exhausted = false;
        self.page.clear();
        self.pages_loaded = 0;
    }

    // ---- streaming mode ----

    /// Opens a fresh pass over the file, positioned after the header.
    ///
    /// Any stream already open is dropped. On failure nothing is opened and
    /// the error carries the path.
    pub fn initialize_streaming(&mut self) -> Result<()> {
        self.close_stream();
        let reader = self.open_reader()?;
        self.stream = Some(reader);
        self.streamed = 0;
        self.stats = SkipStats::default();
        Ok(())
    }

    /// Yields the next valid transaction of the open stream.
    ///
    /// Returns `Ok(None)` at end of input or when no stream is open.
    pub fn next_streamed_transaction(&mut self) -> Result<Option<Transaction>> {
        let Some(reader) = self.stream.as_mut() else {
            return Ok(None);
        };
        match read_valid(reader, &mut self.scratch, &self.config, &mut self.stats) {
            Ok(Some(tx)) => {
                self.streamed += 1;
                Ok(Some(tx))
            }
            Ok(None) => {
                info!(
                    "Stream finished: {} transactions, {} skipped",
                    self.streamed,
                    self.stats.total()
                );
                self.stream = None;
                Ok(None)
            }
            Err(e) => {
                self.stream = None;
                Err(e)
            }
        }
    }

    /// Releases the open stream, if any.
    pub fn close_stream(&mut self) {
        self.stream = None;
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Valid transactions yielded by the current or most recent stream.
    pub fn total_streamed_count(&self) -> u64 {
        self.streamed
    }

    /// Starts a stream and borrows it as an iterator.
    ///
    /// The stream is closed when the iterator is dropped. A read error ends
    /// the iteration and is logged.
    pub fn stream(&mut self) -> Result<Streamed<'_>> {
        self.initialize_streaming()?;
        Ok(Streamed { source: self })
    }

    /// First pass: counts valid transactions matching `pred` without keeping them.
    pub fn count_matching<P>(&mut self, mut pred: P) -> Result<u64>
    where
        P: FnMut(&Transaction) -> bool,
    {
        self.initialize_streaming()?;
        let mut matches = 0u64;
        while let Some(tx) = self.next_streamed_transaction()? {
            if pred(&tx) {
                matches += 1;
            }
        }
        self.close_stream();
        self.last_scan = Some(ScanSummary {
            transactions: self.streamed,
            matches,
            skipped: self.stats,
        });
        info!("Scanned {} transactions, {} match", self.streamed, matches);
        Ok(matches)
    }

    /// Two passes: count the matches, then re-stream into a buffer of exactly
    /// that size.
    pub fn collect_matching<P>(&mut self, mut pred: P) -> Result<Vec<Transaction>>
    where
        P: FnMut(&Transaction) -> bool,
    {
        let expected = self.count_matching(&mut pred)?;
        if expected == 0 {
            return Ok(Vec::new());
        }

        let capacity = usize::try_from(expected).unwrap_or(usize::MAX);
        let mut matches = Vec::with_capacity(capacity);

        self.initialize_streaming()?;
        while matches.len() < capacity {
            match self.next_streamed_transaction()? {
                Some(tx) if pred(&tx) => matches.push(tx),
                Some(_) => {}
                None => break,
            }
        }
        self.close_stream();

        if matches.len() != capacity {
            warn!(
                "Second pass found {} matches, first pass counted {}",
                matches.len(),
                expected
            );
        }
        Ok(matches)
    }

    fn open_reader(&self) -> Result<CsvReader> {
        let path = self.path.as_ref().ok_or(ReportError::NoSource)?;
        let file = File::open(path).map_err(|source| {
            warn!("Cannot open {}: {}", path.display(), source);
            ReportError::SourceUnavailable {
                path: path.clone(),
                source,
            }
        })?;
        // Records are line based: a stray quote must not swallow the lines after it.
        Ok(ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(BufReader::new(file)))
    }
}

impl Default for RecordSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over an open stream. See [`RecordSource::stream`].
pub struct Streamed<'a> {
    source: &'a mut RecordSource,
}

impl Iterator for Streamed<'_> {
    type Item = Transaction;

    fn next(&mut self) -> Option<Transaction> {
        match self.source.next_streamed_transaction() {
            Ok(tx) => tx,
            Err(e) => {
                warn!("Stream aborted: {}", e);
                None
            }
        }
    }
}

impl Drop for Streamed<'_> {
    fn drop(&mut self) {
        self.source.close_stream();
    }
}

/// Reads records until one validates, counting the ones that do not.
fn read_valid(
    reader: &mut CsvReader,
    record: &mut StringRecord,
    config: &SourceConfig,
    stats: &mut SkipStats,
) -> Result<Option<Transaction>> {
    loop {
        match reader.read_record(record) {
            Ok(false) => return Ok(None),
            Ok(true) => {}
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                debug!("Line {}: unreadable record skipped: {}", line, e);
                stats.record(SkipKind::Malformed);
                continue;
            }
        }

        match Transaction::from_record(record, &config.limits) {
            Ok(tx) => return Ok(Some(tx)),
            Err(e) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                debug!("Line {}: skipped: {}", line, e);
                stats.record(e.kind());
            }
        }
    }
}
