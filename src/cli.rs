use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Latest purchase prices from purchase-order spreadsheets",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the latest price for every product and supplier pair
    Latest(LatestArgs),
    /// Show the full price history of one product across suppliers
    History(HistoryArgs),
    /// List the distinct product names found in the upload
    Products(ListArgs),
    /// List the distinct supplier names found in the upload
    Suppliers(ListArgs),
    /// Report how the upload was read: header row, column mapping and warnings
    Inspect(ListArgs),
    /// Print the default normalizer configuration as YAML
    Config,
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Purchase-order spreadsheet (.xlsx, .xls, .ods) or CSV/TSV file; '-' reads stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML file overriding header tokens, column aliases and fallbacks
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Skip this many rows before the header instead of detecting it
    #[arg(long = "skip-rows")]
    pub skip_rows: Option<usize>,
    /// Character encoding of CSV/TSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Currency symbol used when rendering prices
    #[arg(long = "currency")]
    pub currency: Option<String>,
}

#[derive(Debug, Args)]
pub struct LatestArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Only show products from this supplier (exact match)
    #[arg(short = 's', long = "supplier")]
    pub supplier: Option<String>,
    /// Only show products whose name contains this text (case-insensitive)
    #[arg(short = 'q', long = "search")]
    pub search: Option<String>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Product name exactly as listed by the `products` command
    #[arg(short = 'p', long = "product")]
    pub product: String,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}
