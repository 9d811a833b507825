//! Check command - verify the configured AI provider.

use super::load_config;
use anyhow::{Context, Result};
use colored::Colorize;
use sowline_config::ProviderKind;
use sowline_llm::provider_from_config;
use tokio::runtime::Runtime;

pub fn run() -> Result<()> {
    let config = load_config()?;

    let model = match config.llm.provider {
        ProviderKind::Gemini => &config.llm.gemini.model,
        ProviderKind::Ollama => &config.llm.ollama.model,
    };
    println!("{}", "Provider Check".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Provider: {}", config.llm.provider.as_str());
    println!("  Model: {}", model);
    println!("  Timeout: {}s", config.llm.timeout_seconds);
    println!();

    let provider = provider_from_config(&config.llm).context("Failed to create provider")?;
    let rt = Runtime::new().context("Failed to create async runtime")?;

    match rt.block_on(provider.health_check()) {
        Ok(()) => {
            println!("  {} {} is reachable", "✓".green(), provider.name());
            Ok(())
        }
        Err(e) => {
            println!("  {} {}", "✗".red(), e);
            anyhow::bail!("Provider check failed")
        }
    }
}
