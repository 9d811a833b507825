//! Core domain types for Sowline.

use crate::error::{Error, Result};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

/// Budget category of a scope-of-work line item.
///
/// The set is closed: every parsed item lands in exactly one of these five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeOfWorkCategory {
    SoftCosts,
    DemoFoundation,
    HvacPlumbingElectrical,
    Interior,
    Exterior,
}

impl ScopeOfWorkCategory {
    /// All categories in canonical display order.
    pub const ALL: [ScopeOfWorkCategory; 5] = [
        ScopeOfWorkCategory::SoftCosts,
        ScopeOfWorkCategory::DemoFoundation,
        ScopeOfWorkCategory::HvacPlumbingElectrical,
        ScopeOfWorkCategory::Interior,
        ScopeOfWorkCategory::Exterior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeOfWorkCategory::SoftCosts => "soft_costs",
            ScopeOfWorkCategory::DemoFoundation => "demo_foundation",
            ScopeOfWorkCategory::HvacPlumbingElectrical => "hvac_plumbing_electrical",
            ScopeOfWorkCategory::Interior => "interior",
            ScopeOfWorkCategory::Exterior => "exterior",
        }
    }

    /// Position of this category in [`ScopeOfWorkCategory::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ScopeOfWorkCategory::SoftCosts => 0,
            ScopeOfWorkCategory::DemoFoundation => 1,
            ScopeOfWorkCategory::HvacPlumbingElectrical => 2,
            ScopeOfWorkCategory::Interior => 3,
            ScopeOfWorkCategory::Exterior => 4,
        }
    }
}

impl Default for ScopeOfWorkCategory {
    fn default() -> Self {
        ScopeOfWorkCategory::Interior
    }
}

impl FromStr for ScopeOfWorkCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ScopeOfWorkCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

impl std::fmt::Display for ScopeOfWorkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which parsing path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsingMethod {
    /// Column-based spreadsheet parsing, no AI involved.
    Template,
    /// Generative-AI extraction.
    Ai,
}

impl ParsingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParsingMethod::Template => "template",
            ParsingMethod::Ai => "ai",
        }
    }
}

impl FromStr for ParsingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "template" => Ok(ParsingMethod::Template),
            "ai" => Ok(ParsingMethod::Ai),
            other => Err(Error::UnknownParsingMethod(other.to_string())),
        }
    }
}

impl std::fmt::Display for ParsingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One construction budget line item extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSowItem {
    pub category: ScopeOfWorkCategory,
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub budget_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ParsedSowItem {
    pub fn new(
        category: ScopeOfWorkCategory,
        item_name: impl Into<String>,
        budget_amount: f64,
    ) -> Self {
        Self {
            category,
            item_name: item_name.into(),
            description: None,
            budget_amount,
            labor_cost: None,
            material_cost: None,
            quantity: None,
            unit: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_labor_cost(mut self, labor_cost: Option<f64>) -> Self {
        self.labor_cost = labor_cost;
        self
    }

    pub fn with_material_cost(mut self, material_cost: Option<f64>) -> Self {
        self.material_cost = material_cost;
        self
    }

    pub fn with_quantity(mut self, quantity: Option<f64>) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit(mut self, unit: Option<String>) -> Self {
        self.unit = unit;
        self
    }

    /// Labor plus material, when both are broken out.
    pub fn breakdown_total(&self) -> Option<f64> {
        match (self.labor_cost, self.material_cost) {
            (Some(labor), Some(material)) => Some(labor + material),
            _ => None,
        }
    }
}

/// Outcome of parsing one scope-of-work document.
///
/// `success` and `total_budget` are derived from `items` on every read, so
/// neither can disagree with the item list.
#[derive(Debug, Clone, PartialEq)]
pub struct SowParseResult {
    items: Vec<ParsedSowItem>,
    parsing_method: ParsingMethod,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl SowParseResult {
    pub fn new(
        parsing_method: ParsingMethod,
        items: Vec<ParsedSowItem>,
        warnings: Vec<String>,
        errors: Vec<String>,
    ) -> Self {
        Self {
            items,
            parsing_method,
            warnings,
            errors,
        }
    }

    /// A result with no items.
    pub fn failed(
        parsing_method: ParsingMethod,
        warnings: Vec<String>,
        errors: Vec<String>,
    ) -> Self {
        Self::new(parsing_method, Vec::new(), warnings, errors)
    }

    pub fn success(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn items(&self) -> &[ParsedSowItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ParsedSowItem> {
        self.items
    }

    pub fn parsing_method(&self) -> ParsingMethod {
        self.parsing_method
    }

    pub fn total_budget(&self) -> f64 {
        self.items.iter().map(|item| item.budget_amount).sum()
    }

    /// Budget subtotal per category, in canonical category order.
    pub fn category_totals(&self) -> Vec<(ScopeOfWorkCategory, f64)> {
        let mut totals = [0.0_f64; 5];
        for item in &self.items {
            totals[item.category.index()] += item.budget_amount;
        }
        ScopeOfWorkCategory::ALL
            .iter()
            .copied()
            .zip(totals)
            .collect()
    }
}

impl Serialize for SowParseResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SowParseResult", 6)?;
        state.serialize_field("success", &self.success())?;
        state.serialize_field("items", &self.items)?;
        state.serialize_field("totalBudget", &self.total_budget())?;
        state.serialize_field("parsingMethod", &self.parsing_method)?;
        state.serialize_field("warnings", &self.warnings)?;
        state.serialize_field("errors", &self.errors)?;
        state.end()
    }
}
