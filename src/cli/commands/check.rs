//! Environment checks and the language listing.

use console::style;

use pagetext::config::Config;
use pagetext::ocr::{build_engine, languages, TesseractEngine, PADDLE_MODELS};
use pagetext::pdf::{check_binary, POPPLER_TOOLS};

fn mark(ok: bool) -> console::StyledObject<&'static str> {
    if ok {
        style("✓").green()
    } else {
        style("✗").red()
    }
}

pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("External Tools").bold());
    let mut missing = 0;
    for tool in POPPLER_TOOLS.iter().chain(std::iter::once(&"tesseract")) {
        let found = check_binary(tool);
        if !found {
            missing += 1;
        }
        println!("  {} {}", mark(found), tool);
    }
    if missing > 0 {
        println!(
            "  {} Install with: apt install poppler-utils tesseract-ocr",
            style("→").cyan()
        );
    }

    println!("\n{}", style("OCR Engine").bold());
    let options = config.engine_options();
    match build_engine(config.engine(), &options) {
        Ok(engine) => println!(
            "  {} {}: {}",
            mark(engine.is_available()),
            engine.name(),
            engine.availability_hint()
        ),
        Err(e) => println!("  {} {}: {}", mark(false), config.engine(), e),
    }

    println!("\n{}", style("PaddleOCR Models").bold());
    let store = options.paddle_store();
    let missing = store.missing(PADDLE_MODELS);
    for file in PADDLE_MODELS {
        println!("  {} {}", mark(!missing.contains(&file)), file.name);
    }
    println!("  {} {}", style("→").cyan(), store.dir().display());

    println!("\n{}", style("Tesseract Languages").bold());
    let installed = tokio::task::spawn_blocking(TesseractEngine::installed_languages).await?;
    match installed {
        Ok(installed) => {
            for lang in languages::LANGUAGES {
                let found = installed.iter().any(|l| l == lang.tesseract);
                println!(
                    "  {} {:<8} {:<22} ({})",
                    mark(found),
                    lang.code,
                    lang.name,
                    lang.tesseract
                );
            }
        }
        Err(e) => println!("  {} {}", style("!").yellow(), e),
    }

    Ok(())
}

pub fn cmd_languages() -> anyhow::Result<()> {
    println!("\n{}", style("Supported Languages").bold());
    for lang in languages::LANGUAGES {
        println!("  {:<8} {}", style(lang.code).cyan(), lang.name);
    }
    Ok(())
}
