pub mod aggregate;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod header;
pub mod ingest;
pub mod io_utils;
pub mod mapping;
pub mod normalize;
pub mod report;
pub mod table;
pub mod workbook;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs, OutputFormat},
    config::NormalizerConfig,
    error::IngestError,
    filter::PriceFilter,
    ingest::PriceBook,
    mapping::BindingSource,
    report::{HistoryRow, LatestRow},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("po_prices", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Latest(args) => handle_latest(&args),
        Commands::History(args) => handle_history(&args),
        Commands::Products(args) => handle_list(&args, ListKind::Products),
        Commands::Suppliers(args) => handle_list(&args, ListKind::Suppliers),
        Commands::Inspect(args) => handle_inspect(&args),
        Commands::Config => handle_config(),
    }
}

/// Suggestion for the user when `err` stems from a failed upload.
pub fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<IngestError>())
        .map(IngestError::hint)
}

struct Session {
    book: PriceBook,
    currency: String,
}

fn load_session(args: &InputArgs) -> Result<Session> {
    let config = match &args.config {
        Some(path) => NormalizerConfig::load(path)?,
        None => NormalizerConfig::default(),
    };
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let bytes = io_utils::read_input(&args.input, config.max_input_bytes)?;
    let format = io_utils::resolve_input_format(&args.input, &bytes);
    info!(
        "Reading '{}' as {:?} ({} byte(s))",
        args.input.display(),
        format,
        bytes.len()
    );
    let book = PriceBook::load(&bytes, format, encoding, &config, args.skip_rows)
        .with_context(|| format!("Processing {:?}", args.input))?;
    let currency = args
        .currency
        .clone()
        .unwrap_or_else(|| config.currency_symbol.clone());
    Ok(Session { book, currency })
}

fn handle_latest(args: &cli::LatestArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    let filter = PriceFilter::new(args.supplier.as_deref(), args.search.as_deref());
    debug!("Latest-price filter: {filter:?}");
    let (entries, summary) = session.book.filtered_latest_prices(&filter);
    info!(
        "Loaded {} unique product-supplier combination(s)",
        summary.total
    );
    let rows = entries.iter().map(LatestRow::from_entry).collect::<Vec<_>>();
    let mut out = io_utils::open_output(args.output.as_deref())?;
    report::write_latest(&mut out, &rows, args.format, &session.currency)?;
    out.flush()?;
    if summary.is_filtered() {
        info!(
            "Showing {} of {} matching combination(s)",
            summary.shown, summary.total
        );
    }
    Ok(())
}

fn handle_history(args: &cli::HistoryArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    let records = session.book.history(&args.product);
    if records.is_empty() {
        info!(
            "No rows found for product '{}'; run `products` to list exact names",
            args.product
        );
    }
    let rows = records
        .into_iter()
        .map(HistoryRow::from_record)
        .collect::<Vec<_>>();
    let mut out = io_utils::open_output(args.output.as_deref())?;
    report::write_history(&mut out, &rows, args.format, &session.currency)?;
    out.flush()?;
    info!(
        "Displayed {} history row(s) for '{}'",
        rows.len(),
        args.product
    );
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Products,
    Suppliers,
}

fn handle_list(args: &cli::ListArgs, kind: ListKind) -> Result<()> {
    let session = load_session(&args.input)?;
    let (header, values) = match kind {
        ListKind::Products => ("Product", session.book.products()),
        ListKind::Suppliers => ("Supplier", session.book.suppliers()),
    };
    let mut out = std::io::stdout();
    report::write_values(&mut out, header, &values, args.format)?;
    info!("Listed {} distinct value(s)", values.len());
    Ok(())
}

fn handle_inspect(args: &cli::ListArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    let report = session.book.report();
    let mut out = std::io::stdout();
    if args.format == OutputFormat::Json {
        serde_json::to_writer_pretty(&mut out, report).context("Writing JSON output")?;
        writeln!(out)?;
        return Ok(());
    }

    let detection = if args.input.skip_rows.is_some() {
        "override"
    } else if report.header.fell_back {
        "fallback"
    } else {
        "detected"
    };
    writeln!(out, "Header offset: {} ({detection})", report.header.offset)?;
    writeln!(out, "Columns: {:?}", report.header.columns)?;
    writeln!(out)?;
    let headers = ["Field", "Index", "Column", "Matched by"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let rows = report
        .mapping
        .bindings()
        .map(|binding| {
            let source = match &binding.source {
                BindingSource::Alias { alias } => format!("alias '{alias}'"),
                BindingSource::Fallback => "position".to_string(),
            };
            vec![
                binding.field.to_string(),
                binding.index.to_string(),
                binding.label(),
                source,
            ]
        })
        .collect::<Vec<_>>();
    write!(out, "{}", table::render_table(&headers, &rows))?;
    writeln!(out)?;
    writeln!(
        out,
        "Rows loaded: {} (dropped {} blank, {} without product)",
        report.rows_loaded, report.blank_rows, report.rows_without_product
    )?;
    for diagnostic in &report.diagnostics {
        writeln!(out, "warning: {diagnostic}")?;
    }
    Ok(())
}

fn handle_config() -> Result<()> {
    let yaml = NormalizerConfig::default().to_yaml_string()?;
    print!("{yaml}");
    Ok(())
}
