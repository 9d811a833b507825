//! Template command - default line items for a loan type.

use anyhow::Result;
use colored::Colorize;
use sowline_core::{category_names, sow_template, LoanType};

pub fn run(loan_type: LoanType, json: bool) -> Result<()> {
    let items = sow_template(loan_type);

    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    println!(
        "{} ({} items)",
        format!("Default scope of work: {}", loan_type).cyan().bold(),
        items.len()
    );

    for (category, display_name) in category_names(loan_type) {
        println!();
        println!("{} {}", display_name.white().bold(), format!("[{}]", category).dimmed());

        let mut in_category: Vec<_> = items.iter().filter(|i| i.category == *category).collect();
        in_category.sort_by_key(|i| i.sort_order);
        for item in in_category {
            println!("  {:>2}. {}", item.sort_order, item.item_name);
        }
    }

    Ok(())
}
