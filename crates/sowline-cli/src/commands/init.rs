//! Initialize Sowline.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use sowline_config::Config;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() {
        println!("{} Sowline is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Sowline...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    println!();
    println!("{}", "Sowline initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Provide a Gemini key: {} or {}",
        "export GEMINI_API_KEY=...".cyan(),
        "sowline config set llm.provider ollama".cyan()
    );
    println!("  2. Check the provider: {}", "sowline check".cyan());
    println!("  3. Parse a budget: {}", "sowline parse budget.xlsx".cyan());

    Ok(())
}
