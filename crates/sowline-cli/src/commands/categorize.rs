//! Categorize command - run the keyword normalizer on free text.

use anyhow::Result;
use colored::Colorize;
use sowline_core::{category_display_name, LoanType};
use sowline_parse::CategoryNormalizer;

pub fn run(text: &str) -> Result<()> {
    let normalizer = CategoryNormalizer::default();

    match normalizer.matching_rule(text) {
        Some((keyword, category)) => {
            println!(
                "{} {} ({})",
                "Category:".green().bold(),
                category.as_str().cyan(),
                category_display_name(LoanType::FixFlip, category)
            );
            println!("  matched keyword: {}", format!("\"{}\"", keyword).dimmed());
        }
        None => {
            println!(
                "{} no keyword matched; items like this default to {}",
                "Category:".yellow().bold(),
                "interior".cyan()
            );
        }
    }

    Ok(())
}
