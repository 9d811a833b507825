//! Default scope-of-work templates and category display names per loan type.

use crate::error::{Error, Result};
use crate::types::ScopeOfWorkCategory;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use ScopeOfWorkCategory::{DemoFoundation, Exterior, HvacPlumbingElectrical, Interior, SoftCosts};

/// Loan product a scope of work is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    FixFlip,
    NewConstruction,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::FixFlip => "fix_flip",
            LoanType::NewConstruction => "new_construction",
        }
    }
}

impl Default for LoanType {
    fn default() -> Self {
        LoanType::FixFlip
    }
}

impl FromStr for LoanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fix_flip" => Ok(LoanType::FixFlip),
            "new_construction" => Ok(LoanType::NewConstruction),
            _ => Err(Error::UnknownLoanType(s.to_string())),
        }
    }
}

impl std::fmt::Display for LoanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line item of a blank scope of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SowTemplateItem {
    pub category: ScopeOfWorkCategory,
    pub item_name: &'static str,
    pub sort_order: u32,
}

const fn item(category: ScopeOfWorkCategory, item_name: &'static str, sort_order: u32) -> SowTemplateItem {
    SowTemplateItem {
        category,
        item_name,
        sort_order,
    }
}

static FIX_FLIP_ITEMS: [SowTemplateItem; 25] = [
    item(SoftCosts, "Permits & Fees", 1),
    item(SoftCosts, "Architectural Plans", 2),
    item(SoftCosts, "Engineering", 3),
    item(DemoFoundation, "Demolition & Debris Removal", 1),
    item(DemoFoundation, "Foundation Repair", 2),
    item(DemoFoundation, "Framing", 3),
    item(DemoFoundation, "Roofing", 4),
    item(HvacPlumbingElectrical, "HVAC", 1),
    item(HvacPlumbingElectrical, "Plumbing", 2),
    item(HvacPlumbingElectrical, "Electrical", 3),
    item(HvacPlumbingElectrical, "Insulation", 4),
    item(Interior, "Drywall", 1),
    item(Interior, "Interior Paint", 2),
    item(Interior, "Flooring", 3),
    item(Interior, "Kitchen Cabinets", 4),
    item(Interior, "Countertops", 5),
    item(Interior, "Appliances", 6),
    item(Interior, "Bathrooms", 7),
    item(Interior, "Interior Doors & Trim", 8),
    item(Exterior, "Siding", 1),
    item(Exterior, "Windows", 2),
    item(Exterior, "Exterior Finishes", 3),
    item(Exterior, "Landscaping", 4),
    item(Exterior, "Driveway", 5),
    item(Exterior, "Gutters", 6),
];

static NEW_CONSTRUCTION_ITEMS: [SowTemplateItem; 27] = [
    item(SoftCosts, "Permits & Impact Fees", 1),
    item(SoftCosts, "Architectural Design", 2),
    item(SoftCosts, "Structural Engineering", 3),
    item(SoftCosts, "Pre-Construction Surveys", 4),
    item(DemoFoundation, "Site Work & Clearing", 1),
    item(DemoFoundation, "Excavation & Grading", 2),
    item(DemoFoundation, "Foundation", 3),
    item(DemoFoundation, "Framing", 4),
    item(DemoFoundation, "Roofing", 5),
    item(HvacPlumbingElectrical, "HVAC System", 1),
    item(HvacPlumbingElectrical, "Plumbing Rough-In & Finish", 2),
    item(HvacPlumbingElectrical, "Electrical Rough-In & Finish", 3),
    item(HvacPlumbingElectrical, "Insulation", 4),
    item(Interior, "Drywall", 1),
    item(Interior, "Interior Paint", 2),
    item(Interior, "Flooring", 3),
    item(Interior, "Cabinets", 4),
    item(Interior, "Countertops", 5),
    item(Interior, "Appliances", 6),
    item(Interior, "Bathroom Fixtures", 7),
    item(Interior, "Interior Doors & Trim", 8),
    item(Exterior, "Siding", 1),
    item(Exterior, "Windows", 2),
    item(Exterior, "Garage", 3),
    item(Exterior, "Decks & Fencing", 4),
    item(Exterior, "Driveway", 5),
    item(Exterior, "Landscaping", 6),
];

static FIX_FLIP_CATEGORY_NAMES: [(ScopeOfWorkCategory, &str); 5] = [
    (SoftCosts, "Soft Costs"),
    (DemoFoundation, "Demo & Foundation"),
    (HvacPlumbingElectrical, "HVAC, Plumbing & Electrical"),
    (Interior, "Interior"),
    (Exterior, "Exterior"),
];

static NEW_CONSTRUCTION_CATEGORY_NAMES: [(ScopeOfWorkCategory, &str); 5] = [
    (SoftCosts, "Soft Costs & Pre-Construction"),
    (DemoFoundation, "Site Work & Foundation"),
    (HvacPlumbingElectrical, "Mechanical, Electrical & Plumbing"),
    (Interior, "Interior Finishes"),
    (Exterior, "Exterior Envelope"),
];

/// Default line items used to pre-populate a blank scope of work.
pub fn sow_template(loan_type: LoanType) -> &'static [SowTemplateItem] {
    match loan_type {
        LoanType::FixFlip => &FIX_FLIP_ITEMS,
        LoanType::NewConstruction => &NEW_CONSTRUCTION_ITEMS,
    }
}

/// Display names of the five categories, in canonical category order.
pub fn category_names(loan_type: LoanType) -> &'static [(ScopeOfWorkCategory, &'static str)] {
    match loan_type {
        LoanType::FixFlip => &FIX_FLIP_CATEGORY_NAMES,
        LoanType::NewConstruction => &NEW_CONSTRUCTION_CATEGORY_NAMES,
    }
}

pub fn category_display_name(loan_type: LoanType, category: ScopeOfWorkCategory) -> &'static str {
    category_names(loan_type)[category.index()].1
}
