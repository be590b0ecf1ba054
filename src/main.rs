//! Transaction Report CLI
//!
//! Streams a transaction CSV, loads the transactions of one type, and prints
//! the grouped report followed by the array vs linked-list comparison.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transactions.csv deposit > report.txt
//! cargo run -- transactions.csv            # lists the available types
//! cargo run -- transactions.csv transfer --export exports/top_results.json --top 5
//! ```
//!
//! # Options
//!
//! - `--export <path>`: write the top results as JSON
//! - `--top <n>`: rows per channel and exported records (default 10)
//! - `--batch <n>`: linked-list batch size, `0` for a single batch (default 1000)
//! - `--silent`: print only the comparison summary
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `info` to control logging verbosity

use log::info;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use transaction_report::export::export_to_path;
use transaction_report::processor::top_results;
use transaction_report::transaction::distinct_categories;
use transaction_report::{
    ComparisonMode, ComparisonReporter, RecordSource, ReportConfig, ReportError, Result,
};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

struct Options {
    input: PathBuf,
    category: Option<String>,
    export: Option<PathBuf>,
    report: ReportConfig,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut positional = Vec::new();
    let mut export = None;
    let mut report = ReportConfig::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--export" => {
                let path = iter
                    .next()
                    .ok_or_else(|| ReportError::InvalidArgument("--export needs a path".into()))?;
                export = Some(PathBuf::from(path));
            }
            "--top" => report.top_n = parse_number(iter.next(), "--top")?,
            "--batch" => {
                let size = parse_number(iter.next(), "--batch")?;
                report.list_batch_size = if size == 0 { None } else { Some(size) };
            }
            "--silent" => report.mode = ComparisonMode::Silent,
            flag if flag.starts_with("--") => {
                return Err(ReportError::InvalidArgument(format!("unknown option {}", flag)));
            }
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let input = positional.next().ok_or(ReportError::MissingArgument)?;
    let category = positional.next();
    if let Some(extra) = positional.next() {
        return Err(ReportError::InvalidArgument(format!("unexpected argument {}", extra)));
    }

    Ok(Options {
        input: PathBuf::from(input),
        category,
        export,
        report,
    })
}

fn parse_number(value: Option<&String>, flag: &str) -> Result<usize> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ReportError::InvalidArgument(format!("{} needs a non-negative number", flag)))
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut source = RecordSource::open(&options.input);
    if !source.load_next_page()? {
        writeln!(out, "No valid transactions found in {}", options.input.display())?;
        return Ok(());
    }

    let Some(category) = options.category else {
        writeln!(out, "Available transaction types:")?;
        for (idx, category) in distinct_categories(source.current_page()).iter().enumerate() {
            writeln!(out, "{}- {}", idx + 1, category)?;
        }
        writeln!(out, "Pass one as the second argument to run a search.")?;
        return Ok(());
    };

    let matches = source.collect_matching(|tx| tx.category() == category)?;
    let scan = source.last_scan().unwrap_or_default();
    info!(
        "Loaded {} '{}' transactions ({} scanned, {} skipped)",
        matches.len(),
        category,
        scan.transactions,
        scan.skipped.total()
    );
    writeln!(
        out,
        "Found {} matching transactions for type '{}' in {} rows.",
        matches.len(),
        category,
        scan.transactions
    )?;

    if matches.is_empty() {
        writeln!(out, "No matching transactions found to process.")?;
        if let Some(path) = &options.export {
            // Nothing to rank; fall back to the first page as loaded.
            let written = export_to_path(path, source.current_page(), options.report.top_n)?;
            writeln!(out, "Exported {} results to {}", written, path.display())?;
        }
        return Ok(());
    }

    let top_n = options.report.top_n;
    let reporter = ComparisonReporter::new(options.report);
    let comparison = reporter.compare(&matches, &category, &mut out)?;
    comparison.render(&mut out)?;

    if let Some(path) = &options.export {
        let written = export_to_path(path, top_results(&comparison.groups, top_n), top_n)?;
        writeln!(out, "Exported {} results to {}", written, path.display())?;
    }

    out.flush()?;
    Ok(())
}
