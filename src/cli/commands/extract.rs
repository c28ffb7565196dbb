//! The `extract` command: run the page pipeline over one PDF.

use std::path::{Path, PathBuf};

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::cli::OutputFormat;
use pagetext::config::{split_languages, Config, ExtractionConfig};
use pagetext::models::DocumentReport;
use pagetext::ocr::{build_engine, OcrBackendType};
use pagetext::pdf::{DocumentLoader, PopplerLoader, PopplerRasterizer, PopplerTextLayer};
use pagetext::pipeline::{aggregate, CancellationToken, PageEvent, PageOrchestrator};
use pagetext::report::{render_json, render_text};

/// Command-line overrides for a single extraction.
pub struct ExtractArgs {
    pub pdf: PathBuf,
    pub languages: Vec<String>,
    pub threshold: Option<usize>,
    pub dpi: Option<u32>,
    pub engine: Option<OcrBackendType>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub max_size_mb: Option<u64>,
    pub layout: bool,
    pub psm: Option<u8>,
}

impl ExtractArgs {
    /// Layer command-line values over the file/env configuration.
    fn extraction_config(&self, config: &Config) -> ExtractionConfig {
        let mut extraction = config.extraction_config();
        if !self.languages.is_empty() {
            extraction.languages = self
                .languages
                .iter()
                .flat_map(|l| split_languages(l))
                .collect();
        }
        if let Some(threshold) = self.threshold {
            extraction.embedded_text_threshold = threshold;
        }
        if let Some(dpi) = self.dpi {
            extraction.raster_resolution = dpi;
        }
        extraction
    }
}

pub async fn cmd_extract(config: &Config, args: ExtractArgs) -> anyhow::Result<()> {
    let extraction = args.extraction_config(config);
    extraction
        .validate_strict()
        .context("Invalid extraction settings")?;

    let engine_type = args.engine.unwrap_or_else(|| config.engine());
    let max_size_mb = args.max_size_mb.unwrap_or_else(|| config.max_file_size_mb());
    let layout = args.layout || config.text_layout();

    let loader = PopplerLoader::new().with_max_size_mb(max_size_mb);
    let document = loader
        .load(&args.pdf)
        .with_context(|| format!("Failed to open {}", args.pdf.display()))?;

    let mut engine_options = config.engine_options();
    if args.psm.is_some() {
        engine_options.psm = args.psm;
    }
    let engine = build_engine(engine_type, &engine_options)?;
    if !engine.is_available() {
        println!(
            "{} {} (pages below the text threshold will fail)",
            style("!").yellow(),
            engine.availability_hint()
        );
    }

    println!(
        "{} Processing {} ({} pages, {:.2} MB) with {} [{}]",
        style("→").cyan(),
        document.filename(),
        document.page_count(),
        document.size_mb(),
        engine.name(),
        extraction.languages.join(", ")
    );

    let orchestrator = PageOrchestrator::new(
        Box::new(PopplerTextLayer::new().with_layout(layout)),
        Box::new(PopplerRasterizer::new()),
        engine,
    );

    let progress = ProgressBar::new(document.page_count() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let task_progress = progress.clone();
    let task_config = extraction.clone();

    // The pipeline is synchronous and shells out per page
    let handle = tokio::task::spawn_blocking(move || {
        let processed = orchestrator.process_document(
            &document,
            &task_config,
            &task_cancel,
            |event| match event {
                PageEvent::Started { index, total } => {
                    task_progress.set_message(format!("Page {}/{}", index, total));
                }
                PageEvent::Completed { result, .. } => {
                    if let Some(ref error) = result.error {
                        task_progress.suspend(|| {
                            println!(
                                "  {} Page {}: {}",
                                style("✗").red(),
                                result.index,
                                error
                            );
                        });
                    }
                    task_progress.inc(1);
                }
            },
        );
        (document, processed)
    });

    let (interrupt_tx, interrupts) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt_tx.send(()).is_err() {
                break;
            }
        }
    });

    let finished = wait_for_pipeline(handle, &cancel, interrupts, || {
        progress.suspend(|| {
            println!(
                "{} Cancelling after the current page (Ctrl-C again to quit now)...",
                style("!").yellow()
            );
        });
    })
    .await?;
    let Some((document, processed)) = finished else {
        progress.abandon();
        println!("{} Interrupted", style("✗").red());
        std::process::exit(130);
    };
    progress.finish_and_clear();

    let report = aggregate(&processed.pages, &extraction);
    let contents = match args.format {
        OutputFormat::Text => render_text(&document, &processed, &report),
        OutputFormat::Json => render_json(&document, &processed, &report)?,
    };

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(document.path(), &document.stem(), args.format));
    tokio::fs::write(&output, contents)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_summary(&report, processed.cancelled);
    println!(
        "{} Report written to {}",
        style("✓").green(),
        output.display()
    );

    Ok(())
}

/// Wait for the pipeline task while listening for interrupts.
///
/// The first interrupt cancels the pipeline, which then stops after the page
/// in flight. A second one gives up on the task and returns `None`.
async fn wait_for_pipeline<T>(
    mut handle: JoinHandle<T>,
    cancel: &CancellationToken,
    mut interrupts: mpsc::UnboundedReceiver<()>,
    on_cancel: impl FnOnce(),
) -> Result<Option<T>, JoinError> {
    tokio::select! {
        joined = &mut handle => return joined.map(Some),
        Some(()) = interrupts.recv() => {
            on_cancel();
            cancel.cancel();
        }
    }

    tokio::select! {
        joined = &mut handle => joined.map(Some),
        Some(()) = interrupts.recv() => Ok(None),
    }
}

/// `<stem>_extracted.<ext>` next to the input file.
fn default_output_path(pdf: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    pdf.with_file_name(format!("{}_extracted.{}", stem, format.extension()))
}

fn print_summary(report: &DocumentReport, cancelled: bool) {
    println!();
    println!("{}", style("Extraction Summary").bold());
    println!("  Pages:      {}", report.total_pages);
    println!(
        "  Direct:     {}  OCR: {}  Hybrid: {}",
        report.direct_pages, report.ocr_pages, report.hybrid_pages
    );
    println!("  Words:      {}", report.total_words());
    println!(
        "  Characters: {} ({} without spaces)",
        report.total_chars_with_spaces(),
        report.total_chars_without_spaces()
    );
    println!("  Confidence: {}", report.overall_confidence_label());

    if report.failed_pages > 0 {
        let failed: Vec<String> = report.failed().map(|p| p.index.to_string()).collect();
        println!(
            "  {} {} page(s) failed: {}",
            style("!").yellow(),
            report.failed_pages,
            failed.join(", ")
        );
    }
    if cancelled {
        println!(
            "  {} Cancelled; the report covers the pages processed so far",
            style("!").yellow()
        );
    }
}
