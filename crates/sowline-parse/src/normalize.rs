//! Keyword-based category matching.

use sowline_core::ScopeOfWorkCategory;

use ScopeOfWorkCategory::{
    DemoFoundation, Exterior, HvacPlumbingElectrical, Interior, SoftCosts,
};

/// Ordered `(keyword, category)` pairs. Matching is a substring test against
/// the lowercased, trimmed input and the first hit in list order wins, so the
/// order of this table is part of its meaning.
pub const CATEGORY_KEYWORDS: &[(&str, ScopeOfWorkCategory)] = &[
    ("soft costs", SoftCosts),
    ("soft_costs", SoftCosts),
    ("pre-construction", SoftCosts),
    ("preconstruction", SoftCosts),
    ("permits", SoftCosts),
    ("architectural", SoftCosts),
    ("engineering", SoftCosts),
    ("demo", DemoFoundation),
    ("demo & removal", DemoFoundation),
    ("demolition", DemoFoundation),
    ("foundation", DemoFoundation),
    ("site work", DemoFoundation),
    ("excavation", DemoFoundation),
    ("grading", DemoFoundation),
    ("framing", DemoFoundation),
    ("structural", DemoFoundation),
    ("roofing", DemoFoundation),
    ("hvac", HvacPlumbingElectrical),
    ("plumbing", HvacPlumbingElectrical),
    ("electrical", HvacPlumbingElectrical),
    ("mep", HvacPlumbingElectrical),
    ("mechanical", HvacPlumbingElectrical),
    ("insulation", HvacPlumbingElectrical),
    ("interior", Interior),
    ("interior finishes", Interior),
    ("kitchens", Interior),
    ("kitchen", Interior),
    ("bathrooms", Interior),
    ("bathroom", Interior),
    ("flooring", Interior),
    ("drywall", Interior),
    ("paint", Interior),
    ("cabinets", Interior),
    ("countertops", Interior),
    ("appliances", Interior),
    ("doors", Interior),
    ("trim", Interior),
    ("exterior", Exterior),
    ("exterior finishes", Exterior),
    ("siding", Exterior),
    ("landscaping", Exterior),
    ("decks", Exterior),
    ("fencing", Exterior),
    ("garage", Exterior),
    ("driveway", Exterior),
    ("windows", Exterior),
    ("gutters", Exterior),
];

/// Maps free text onto one of the five categories.
///
/// Stateless and `Copy`; the default instance uses [`CATEGORY_KEYWORDS`].
#[derive(Debug, Clone, Copy)]
pub struct CategoryNormalizer {
    rules: &'static [(&'static str, ScopeOfWorkCategory)],
}

impl CategoryNormalizer {
    pub const fn new(rules: &'static [(&'static str, ScopeOfWorkCategory)]) -> Self {
        Self { rules }
    }

    /// First category whose keyword occurs in `text`, if any.
    pub fn normalize(&self, text: &str) -> Option<ScopeOfWorkCategory> {
        self.matching_rule(text).map(|(_, category)| category)
    }

    /// The `(keyword, category)` pair that decides [`Self::normalize`].
    pub fn matching_rule(&self, text: &str) -> Option<(&'static str, ScopeOfWorkCategory)> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.rules
            .iter()
            .find(|(keyword, _)| needle.contains(keyword))
            .copied()
    }

    pub fn rules(&self) -> &'static [(&'static str, ScopeOfWorkCategory)] {
        self.rules
    }
}

impl Default for CategoryNormalizer {
    fn default() -> Self {
        Self::new(CATEGORY_KEYWORDS)
    }
}

/// [`CategoryNormalizer::normalize`] with the default keyword table.
pub fn normalize_category(text: &str) -> Option<ScopeOfWorkCategory> {
    CategoryNormalizer::default().normalize(text)
}
