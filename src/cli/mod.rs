//! Command-line interface.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use pagetext::config::Config;
use pagetext::ocr::OcrBackendType;

#[derive(Parser)]
#[command(name = "pagetext")]
#[command(about = "Extract text from PDFs, using OCR only where pages need it")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// OCR engine selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    Tesseract,
    Paddle,
}

impl From<EngineArg> for OcrBackendType {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Tesseract => OcrBackendType::Tesseract,
            EngineArg::Paddle => OcrBackendType::PaddleOcr,
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a PDF and write a report
    Extract {
        /// PDF file to process
        pdf: PathBuf,
        /// OCR language code (repeatable, e.g. -l en -l fr)
        #[arg(short, long = "lang")]
        languages: Vec<String>,
        /// Minimum embedded characters for a page to skip OCR (default: 50)
        #[arg(long)]
        threshold: Option<usize>,
        /// Rasterization resolution for OCR pages (default: 200)
        #[arg(long)]
        dpi: Option<u32>,
        /// OCR engine
        #[arg(long, value_enum)]
        engine: Option<EngineArg>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Output file (default: <stem>_extracted.txt next to the PDF)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Reject files larger than this many megabytes (default: 100)
        #[arg(long)]
        max_size_mb: Option<u64>,
        /// Preserve the physical layout of the embedded text layer
        #[arg(long)]
        layout: bool,
        /// Tesseract page segmentation mode (e.g. 6 for a single text block)
        #[arg(long)]
        psm: Option<u8>,
    },

    /// Check availability of the external tools and OCR languages
    Check,

    /// List supported OCR language codes
    Languages,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => {
            let mut config = Config::load_from_path(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => Config::load().await,
    };
    if let Some(ref path) = config.source_path {
        tracing::info!("Using config file {}", path.display());
    }

    match cli.command {
        Commands::Extract {
            pdf,
            languages,
            threshold,
            dpi,
            engine,
            format,
            output,
            max_size_mb,
            layout,
            psm,
        } => {
            let args = commands::ExtractArgs {
                pdf,
                languages,
                threshold,
                dpi,
                engine: engine.map(Into::into),
                format,
                output,
                max_size_mb,
                layout,
                psm,
            };
            commands::cmd_extract(&config, args).await
        }
        Commands::Check => commands::cmd_check(&config).await,
        Commands::Languages => commands::cmd_languages(),
    }
}
