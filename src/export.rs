//! JSON export of top results.

use crate::error::Result;
use crate::transaction::{ExportRecord, Transaction};
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes up to `limit` transactions as a pretty-printed JSON array.
///
/// Returns the number of records written. An empty input still produces
/// a valid (empty) array.
pub fn write_top_json<'a, W, I>(writer: W, transactions: I, limit: usize) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let records: Vec<ExportRecord<'a>> = transactions
        .into_iter()
        .take(limit)
        .map(Transaction::to_export)
        .collect();
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(records.len())
}

/// Writes the export to `path`, creating parent directories as needed.
pub fn export_to_path<'a, I>(path: impl AsRef<Path>, transactions: I, limit: usize) -> Result<usize>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    let written = write_top_json(&mut writer, transactions, limit)?;
    writer.flush()?;
    info!("Exported {} records to {}", written, path.display());
    Ok(written)
}
