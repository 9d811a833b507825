//! Parse command implementation.

use super::{format_money, load_config, truncate_display};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sowline_core::{category_display_name, LoanType, SowParseResult};
use sowline_parse::{mime_for_extension, SowParser};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::debug;

/// Parse a single file or every supported file under a directory.
pub fn run(
    path: &str,
    file_type: Option<String>,
    ai_only: bool,
    json: bool,
    loan_type: LoanType,
) -> Result<()> {
    let path = Path::new(path);
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let config = load_config()?;
    let parser = SowParser::from_config(&config).context(
        "Failed to set up the AI provider (set GEMINI_API_KEY, or run 'sowline config set llm.provider ollama')",
    )?;
    let rt = Runtime::new().context("Failed to create async runtime")?;

    if path.is_file() {
        let file_type = resolve_file_type(path, file_type.as_deref())?;
        debug!("Parsing {} as {}", path.display(), file_type);
        let buffer = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let pb = spinner(json)?;
        pb.set_message(format!("Parsing {}", path.display()));
        let result = rt.block_on(parse(&parser, &buffer, &file_type, ai_only));
        pb.finish_and_clear();

        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(path, &result, loan_type);
        }
        return Ok(());
    }

    let files = collect_files(path);
    if files.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("{}", "No supported files found.".yellow());
        }
        return Ok(());
    }

    if !json {
        println!("{} {} ({} files)", "Scanning:".cyan(), path.display(), files.len());
    }

    let mut reports = Vec::with_capacity(files.len());
    let mut parsed = 0;
    let mut failed = 0;

    for file in &files {
        let outcome = resolve_file_type(file, file_type.as_deref()).and_then(|file_type| {
            let buffer = std::fs::read(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            Ok((buffer, file_type))
        });
        let (buffer, file_type) = match outcome {
            Ok(ok) => ok,
            Err(e) => {
                eprintln!("{} {}: {:#}", "Skipped:".yellow().bold(), file.display(), e);
                failed += 1;
                continue;
            }
        };

        let pb = spinner(json)?;
        pb.set_message(format!("Parsing {}", file.display()));
        let result = rt.block_on(parse(&parser, &buffer, &file_type, ai_only));
        pb.finish_and_clear();

        if result.success() {
            parsed += 1;
        } else {
            failed += 1;
        }

        if json {
            reports.push(serde_json::json!({
                "file": file.display().to_string(),
                "result": serde_json::to_value(&result)?,
            }));
        } else {
            print_result(file, &result, loan_type);
            println!();
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{} {} files", "Parsed:".green().bold(), parsed);
        if failed > 0 {
            println!("{} {} files", "Failed:".red().bold(), failed);
        }
    }

    Ok(())
}

async fn parse(parser: &SowParser, buffer: &[u8], file_type: &str, ai_only: bool) -> SowParseResult {
    if ai_only {
        parser.parse_with_ai(buffer, file_type).await
    } else {
        parser.parse_template(buffer, file_type).await
    }
}

/// MIME type for a file: the explicit override (a MIME string or a bare
/// extension), otherwise the file's own extension.
fn resolve_file_type(path: &Path, explicit: Option<&str>) -> Result<String> {
    if let Some(explicit) = explicit {
        let explicit = explicit.trim_start_matches('.');
        return Ok(mime_for_extension(explicit)
            .map(str::to_string)
            .unwrap_or_else(|| explicit.to_string()));
    }

    path.extension()
        .and_then(|e| e.to_str())
        .and_then(mime_for_extension)
        .map(str::to_string)
        .with_context(|| {
            format!(
                "Unsupported file type: {} (use --file-type to override)",
                path.display()
            )
        })
}

/// Supported, non-hidden files under `dir`, in a stable order.
fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            !e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.') || n.starts_with("~$"))
                .unwrap_or(false)
        })
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(mime_for_extension)
                .is_some()
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

fn spinner(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn print_result(path: &Path, result: &SowParseResult, loan_type: LoanType) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if result.success() {
        println!(
            "{} {} ({} parsing, {} items)",
            "Parsed:".green().bold(),
            name,
            result.parsing_method(),
            result.items().len()
        );
    } else {
        println!(
            "{} {} ({} parsing)",
            "Failed:".red().bold(),
            name,
            result.parsing_method()
        );
    }

    if !result.items().is_empty() {
        println!();
        println!(
            "  {:<36} {:<34} {:>14}",
            "Item".white().bold(),
            "Category".white().bold(),
            "Budget".white().bold()
        );
        println!("  {}", "─".repeat(86).dimmed());
        for item in result.items() {
            println!(
                "  {:<36} {:<34} {:>14}",
                truncate_display(&item.item_name, 36),
                category_display_name(loan_type, item.category).dimmed(),
                format_money(item.budget_amount)
            );
        }

        println!();
        println!("{}", "Category totals".white().bold());
        for (category, total) in result.category_totals() {
            if total > 0.0 {
                println!(
                    "  {:<36} {:>14}",
                    category_display_name(loan_type, category),
                    format_money(total)
                );
            }
        }
        println!(
            "  {:<36} {:>14}",
            "Total budget".bold(),
            format_money(result.total_budget()).green().bold()
        );
    }

    for warning in &result.warnings {
        println!("  {} {}", "Warning:".yellow(), warning);
    }
    for error in &result.errors {
        println!("  {} {}", "Error:".red(), error);
    }
}
