//! CLI command implementations.

pub mod categorize;
pub mod check;
pub mod config;
pub mod init;
pub mod parse;
pub mod template;

use anyhow::{Context, Result};
use sowline_config::{AppPaths, Config};

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Honor `ui.color` from the config file. An unreadable config is reported
/// later by the command that needs it.
pub fn apply_color_setting() {
    if let Ok(config) = Config::load() {
        if !config.ui.color {
            colored::control::set_override(false);
        }
    }
}

/// Format an amount as dollars with thousands separators.
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate_display(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
