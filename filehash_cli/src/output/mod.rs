mod formatters;

pub use formatters::{CsvFormatter, JsonFormatter, TextFormatter};

use anyhow::Result;
use filehash_core::{AlgorithmConfig, FileIdentity, ResultRecord, ResultStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `File:`/`Size:`/... blocks, same as the export file
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_string(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => anyhow::bail!("Unknown output format: {s}"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

pub trait OutputFormatter: Send + Sync {
    /// Format the record of one file
    fn format_single(&self, identity: &FileIdentity, record: &ResultRecord) -> Result<String>;

    /// Format every record, in store order
    fn format_batch(&self, store: &ResultStore) -> Result<String>;
}

/// Formatter for `format`, showing only the fields enabled in `visible`
pub fn create_formatter(
    format: OutputFormat,
    visible: AlgorithmConfig,
    use_color: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(visible, use_color)),
        OutputFormat::Json => Box::new(JsonFormatter::new(visible, true)),
        OutputFormat::Csv => Box::new(CsvFormatter::new(visible)),
    }
}
