//! Column-based parsing of spreadsheet budgets.
//!
//! Headers are matched by keyword, then rows are walked top to bottom with a
//! carried-forward category so that section rows ("Plumbing", "Exterior")
//! label the line items beneath them.

use crate::extract::Grid;
use crate::normalize::CategoryNormalizer;
use regex::Regex;
use sowline_core::{ParsedSowItem, ScopeOfWorkCategory};
use std::sync::LazyLock;
use tracing::debug;

const CATEGORY_KEYWORDS: &[&str] = &["category", "section"];
const ITEM_KEYWORDS: &[&str] = &["item", "description", "name"];
const BUDGET_KEYWORDS: &[&str] = &["budget", "cost", "amount", "total"];
const LABOR_KEYWORDS: &[&str] = &["labor"];
const MATERIAL_KEYWORDS: &[&str] = &["material"];
const QUANTITY_KEYWORDS: &[&str] = &["qty", "quantity"];
const UNIT_KEYWORDS: &[&str] = &["unit"];

/// Column index for each role, resolved from the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub category: Option<usize>,
    pub item: Option<usize>,
    pub budget: Option<usize>,
    pub labor: Option<usize>,
    pub material: Option<usize>,
    pub quantity: Option<usize>,
    pub unit: Option<usize>,
}

impl ColumnMap {
    /// Each role takes the first header containing any of its keywords,
    /// compared case-insensitively.
    pub fn detect(headers: &[String]) -> Self {
        let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let find = |keywords: &[&str]| {
            lowered
                .iter()
                .position(|header| keywords.iter().any(|k| header.contains(k)))
        };

        Self {
            category: find(CATEGORY_KEYWORDS),
            item: find(ITEM_KEYWORDS),
            budget: find(BUDGET_KEYWORDS),
            labor: find(LABOR_KEYWORDS),
            material: find(MATERIAL_KEYWORDS),
            quantity: find(QUANTITY_KEYWORDS),
            unit: find(UNIT_KEYWORDS),
        }
    }

    /// Item and budget columns were both found.
    pub fn has_required(&self) -> bool {
        self.item.is_some() && self.budget.is_some()
    }
}

/// What the template stage concluded. Every variant except `Parsed` sends
/// the document on to the AI parser.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateOutcome {
    Parsed(Vec<ParsedSowItem>),
    ColumnsMissing(ColumnMap),
    ZeroItems,
    Failed(String),
}

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)").expect("valid number regex"));

/// Parse a money-like cell: drop everything but digits, `.` and `-`, then
/// read the longest leading decimal number. `"$12,500.00"` is 12500 and
/// `"1.2.3"` is 1.2; nothing numeric at the front yields `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    LEADING_NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn optional_amount(row: &[String], column: Option<usize>) -> Option<f64> {
    column.and_then(|c| parse_amount(Grid::cell(row, c)))
}

/// Walk a spreadsheet grid and emit line items.
pub fn parse_grid(grid: &Grid, normalizer: &CategoryNormalizer) -> TemplateOutcome {
    let columns = ColumnMap::detect(&grid.headers);
    let (item_col, budget_col) = match (columns.item, columns.budget) {
        (Some(item), Some(budget)) => (item, budget),
        _ => {
            debug!("Required columns missing in headers {:?}", grid.headers);
            return TemplateOutcome::ColumnsMissing(columns);
        }
    };
    debug!("Detected columns: {:?}", columns);

    let mut current = ScopeOfWorkCategory::Interior;
    let mut items = Vec::new();

    for row in &grid.rows {
        if let Some(col) = columns.category {
            let cell = Grid::cell(row, col).trim();
            if let Some(category) = normalizer.normalize(cell) {
                current = category;
            }
        }

        let name = Grid::cell(row, item_col).trim();
        if let Some(category) = normalizer.normalize(name) {
            current = category;
        }

        let budget = match parse_amount(Grid::cell(row, budget_col)) {
            Some(amount) if amount > 0.0 && !name.is_empty() => amount,
            _ => continue,
        };

        let unit = columns
            .unit
            .map(|c| Grid::cell(row, c).trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        items.push(
            ParsedSowItem::new(current, name, budget)
                .with_labor_cost(optional_amount(row, columns.labor))
                .with_material_cost(optional_amount(row, columns.material))
                .with_quantity(optional_amount(row, columns.quantity))
                .with_unit(unit),
        );
    }

    if items.is_empty() {
        TemplateOutcome::ZeroItems
    } else {
        debug!("Template parser produced {} items", items.len());
        TemplateOutcome::Parsed(items)
    }
}
