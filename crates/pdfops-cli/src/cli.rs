use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pdfops_core::{InterpretOptions, PdfFlavour};

/// Inspect the operators and transparency of PDF content streams.
#[derive(Debug, Parser)]
#[command(name = "pdfops", about, version)]
pub struct Cli {
    /// Log filter directive (e.g. `debug`, `pdfops_parse=trace`).
    /// Overrides RUST_LOG; defaults to `warn`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every operator with its color spaces, font and glyphs
    Ops {
        #[command(flatten)]
        args: AnalyzeArgs,
    },
    /// Report whether each page paints with transparency
    Transparency {
        #[command(flatten)]
        args: AnalyzeArgs,
    },
}

/// Options shared by the analysis subcommands.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Path to the PDF file
    pub file: PathBuf,

    /// Page range (e.g. "1,3-5")
    #[arg(long)]
    pub pages: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Target PDF/A flavour (e.g. "2b", "PDF/A-1a")
    #[arg(long)]
    pub flavour: Option<PdfFlavour>,

    /// Maximum nesting of form XObjects followed for transparency
    #[arg(long, default_value_t = 10)]
    pub max_depth: usize,

    /// Do not collect warnings (they are still logged)
    #[arg(long)]
    pub no_warnings: bool,
}

impl AnalyzeArgs {
    pub fn options(&self) -> InterpretOptions {
        InterpretOptions {
            max_recursion_depth: self.max_depth,
            collect_warnings: !self.no_warnings,
            flavour: self.flavour,
        }
    }
}

/// Output format for analysis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated table
    Text,
    /// JSON document
    Json,
}
