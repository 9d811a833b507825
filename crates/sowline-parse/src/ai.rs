//! Prompt construction and response validation for AI extraction.
//!
//! The model's reply is untrusted text. It goes through three steps: locate
//! a JSON array in the text, parse it, then coerce each element into a
//! [`ParsedSowItem`] or drop it.

use crate::error::AiParseError;
use crate::normalize::CategoryNormalizer;
use regex::Regex;
use serde_json::Value;
use sowline_core::{ParsedSowItem, ScopeOfWorkCategory};
use std::sync::LazyLock;
use tracing::debug;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid fence regex"));

const PROMPT_HEADER: &str = r#"You are a construction scope of work parser. Read the document below and extract its budget line items.

For each line item provide:
1. category: exactly one of "soft_costs", "demo_foundation", "hvac_plumbing_electrical", "interior", "exterior"
2. itemName: name or short description of the work
3. budgetAmount: total cost as a plain number, without currency symbols
4. laborCost: labor cost, if listed separately (optional)
5. materialCost: material cost, if listed separately (optional)
6. quantity: quantity, if given (optional)
7. unit: unit of measure, if given (optional)
8. description: longer notes about the work, if any (optional)

Category guidelines:
- soft_costs: permits, architectural, engineering, insurance, inspections, surveys, design
- demo_foundation: demolition, site prep, excavation, foundation, framing, roofing, structural
- hvac_plumbing_electrical: HVAC, plumbing, electrical, insulation, mechanical systems
- interior: kitchens, bathrooms, flooring, drywall, paint, cabinets, countertops, appliances, doors, trim
- exterior: siding, windows, landscaping, decks, fencing, garage, driveway, gutters

Respond with ONLY a JSON array of objects. No markdown fences and no commentary. Example:
[{"category": "interior", "itemName": "Kitchen Cabinets", "budgetAmount": 5000, "laborCost": 2000, "materialCost": 3000}]

Document content:
"#;

/// The first `max_chars` characters of `text`, and whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Full extraction prompt around an already truncated document excerpt.
pub fn build_prompt(excerpt: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEADER.len() + excerpt.len());
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str(excerpt);
    prompt
}

/// Locate the JSON payload in a model reply: the span from the first `[` to
/// the last `]`, else the inside of a ```` ``` ```` or ```` ```json ```` fence.
pub fn extract_json_payload(response: &str) -> Option<&str> {
    if let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) {
        if start < end {
            return Some(&response[start..=end]);
        }
    }

    FENCED_BLOCK
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Validate a model reply and coerce it into line items.
pub fn items_from_response(
    response: &str,
    normalizer: &CategoryNormalizer,
) -> Result<Vec<ParsedSowItem>, AiParseError> {
    let payload = extract_json_payload(response).ok_or(AiParseError::NoStructuredData)?;
    let value: Value = serde_json::from_str(payload)?;
    let Value::Array(elements) = value else {
        return Err(AiParseError::NotAnArray);
    };

    let total = elements.len();
    let items: Vec<ParsedSowItem> = elements
        .iter()
        .filter_map(|element| item_from_value(element, normalizer))
        .collect();

    debug!("Kept {} of {} AI elements", items.len(), total);
    if items.is_empty() {
        return Err(AiParseError::NoValidItems);
    }
    Ok(items)
}

fn item_from_value(value: &Value, normalizer: &CategoryNormalizer) -> Option<ParsedSowItem> {
    let object = value.as_object()?;

    let name = object.get("itemName").and_then(text_field)?;
    let budget = object
        .get("budgetAmount")
        .and_then(number_field)
        .filter(|n| *n > 0.0)?;

    let category = object
        .get("category")
        .and_then(Value::as_str)
        .and_then(|c| normalizer.normalize(c))
        .unwrap_or(ScopeOfWorkCategory::Interior);

    let optional = |key: &str| {
        object
            .get(key)
            .and_then(number_field)
            .filter(|n| *n != 0.0)
    };

    Some(
        ParsedSowItem::new(category, name, budget)
            .with_description(object.get("description").and_then(text_field))
            .with_labor_cost(optional("laborCost"))
            .with_material_cost(optional("materialCost"))
            .with_quantity(optional("quantity"))
            .with_unit(object.get("unit").and_then(text_field)),
    )
}

/// Strings and numbers as trimmed text; empty strings and other JSON types
/// count as absent.
fn text_field(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Numbers, or strings holding nothing but a number.
fn number_field(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ScopeOfWorkCategory::*;

    fn items(response: &str) -> Result<Vec<ParsedSowItem>, AiParseError> {
        items_from_response(response, &CategoryNormalizer::default())
    }

    #[test]
    fn test_fenced_response_keeps_roof_interior() {
        let response = "Here you go:\n```json\n[{\"category\":\"Roof\",\"itemName\":\"Roof\",\"budgetAmount\":12000}]\n```";
        let parsed = items(response).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].item_name, "Roof");
        assert_eq!(parsed[0].category, Interior);
        assert_eq!(parsed[0].budget_amount, 12000.0);
    }

    #[test]
    fn test_fenced_response_without_category_between_prose() {
        let response = "Here are the line items I found:\n```json\n[{\"itemName\":\"Roof\",\"budgetAmount\":12000}]\n```\nLet me know if you need anything else.";
        assert_eq!(
            extract_json_payload(response),
            Some(r#"[{"itemName":"Roof","budgetAmount":12000}]"#)
        );

        let parsed = items(response).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].item_name, "Roof");
        assert_eq!(parsed[0].category, Interior);
        assert_eq!(parsed[0].budget_amount, 12000.0);
    }

    #[test]
    fn test_bracket_span_is_greedy() {
        let response = "Items: [1] and [2]";
        assert_eq!(extract_json_payload(response), Some("[1] and [2]"));
        assert_eq!(extract_json_payload("[]"), Some("[]"));
    }

    #[test]
    fn test_fence_used_when_no_brackets() {
        let response = "```json\n{\"items\": 3}\n```";
        assert_eq!(extract_json_payload(response).map(str::trim), Some("{\"items\": 3}"));

        let plain = "```\n{\"a\": 1}```";
        assert_eq!(extract_json_payload(plain).map(str::trim), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_no_payload() {
        assert_eq!(extract_json_payload("I could not find any line items."), None);
        assert_eq!(extract_json_payload("] backwards ["), None);
        assert!(matches!(
            items("Sorry, nothing to report."),
            Err(AiParseError::NoStructuredData)
        ));
    }

    #[test]
    fn test_fenced_object_is_not_an_array() {
        let result = items("```json\n{\"itemName\": \"Paint\", \"budgetAmount\": 100}\n```");
        assert!(matches!(result, Err(AiParseError::NotAnArray)));
    }

    #[test]
    fn test_malformed_json() {
        let result = items("[{\"itemName\": \"Paint\", budgetAmount: }]");
        let err = result.unwrap_err();
        assert!(matches!(err, AiParseError::Json(_)));
        assert!(err.to_string().starts_with("AI parsing failed: "));
    }

    #[test]
    fn test_invalid_elements_are_dropped() {
        let response = r#"[
            "just a string",
            42,
            {"itemName": "", "budgetAmount": 100},
            {"itemName": "   ", "budgetAmount": 100},
            {"itemName": "Permits", "budgetAmount": 0},
            {"itemName": "Permits", "budgetAmount": -5},
            {"itemName": "Permits", "budgetAmount": "$1,200"},
            {"itemName": "Permits", "budgetAmount": null},
            {"budgetAmount": 500},
            {"itemName": "Permits", "budgetAmount": "1200"}
        ]"#;
        let parsed = items(response).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].budget_amount, 1200.0);
        assert_eq!(parsed[0].category, Interior);
    }

    #[test]
    fn test_no_valid_items() {
        let result = items(r#"[{"itemName": "Nothing", "budgetAmount": 0}]"#);
        assert!(matches!(result, Err(AiParseError::NoValidItems)));
        assert!(matches!(items("[]"), Err(AiParseError::NoValidItems)));
    }

    #[test]
    fn test_field_coercion() {
        let response = r#"[{
            "category": "HVAC",
            "itemName": 101,
            "description": "  Replace condenser  ",
            "budgetAmount": 6500.5,
            "laborCost": "2500",
            "materialCost": 0,
            "quantity": "two",
            "unit": 1
        }]"#;
        let item = &items(response).unwrap()[0];

        assert_eq!(item.category, HvacPlumbingElectrical);
        assert_eq!(item.item_name, "101");
        assert_eq!(item.description.as_deref(), Some("Replace condenser"));
        assert_eq!(item.budget_amount, 6500.5);
        assert_eq!(item.labor_cost, Some(2500.0));
        assert_eq!(item.material_cost, None);
        assert_eq!(item.quantity, None);
        assert_eq!(item.unit.as_deref(), Some("1"));
    }

    #[test]
    fn test_category_defaults_to_interior() {
        let response = r#"[
            {"itemName": "A", "budgetAmount": 1, "category": 7},
            {"itemName": "B", "budgetAmount": 1, "category": "misc"},
            {"itemName": "C", "budgetAmount": 1},
            {"itemName": "D", "budgetAmount": 1, "category": "exterior"}
        ]"#;
        let categories: Vec<_> = items(response).unwrap().iter().map(|i| i.category).collect();
        assert_eq!(categories, vec![Interior, Interior, Interior, Exterior]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), ("abc", true));
        assert_eq!(truncate_chars("abc", 3), ("abc", false));
        assert_eq!(truncate_chars("", 3), ("", false));
        // multi-byte characters are never split
        assert_eq!(truncate_chars("ééé", 2), ("éé", true));
    }

    #[test]
    fn test_prompt_embeds_excerpt_last() {
        let prompt = build_prompt("Item\tBudget\nRoof\t12000");
        assert!(prompt.ends_with("Document content:\nItem\tBudget\nRoof\t12000"));
        for category in ScopeOfWorkCategory::ALL {
            assert!(prompt.contains(category.as_str()));
        }
        assert!(prompt.contains("budgetAmount"));
    }
}
