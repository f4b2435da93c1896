//! JSON parsing and validation for AI backend responses
//!
//! Models often wrap the JSON payload in extra text; the payload is located
//! with a first-`{` / last-`}` scan before strict parsing. Validation is
//! deliberately unforgiving: a malformed response must never silently
//! become a bad transaction, it must fail this path so the orchestrator
//! falls back to the rule-based parser.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Category, Flow, StructuredRecord};

/// Maximum length of a merchant short name
const SUB_CATEGORY_MAX_CHARS: usize = 60;

/// Locate and parse the JSON object embedded in a model response.
///
/// Tolerates commentary before/after the payload. Failure to find or parse
/// a JSON object is an extraction error.
pub fn extract_json(response: &str) -> Result<Value> {
    let response = response.trim();

    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|err| {
                Error::Extraction(format!("Invalid JSON from AI: {} | Raw: {}", err, truncate(json_str)))
            })
        }
        _ => Err(Error::Extraction(format!(
            "No JSON found in AI response | Raw: {}",
            truncate(response)
        ))),
    }
}

/// Parse and validate a structured record from a model response.
///
/// Field-by-field validation; any violation names the offending field:
/// - `type`: "in" or "out"
/// - `category`: one of the thirteen schema values
/// - `amount`: a non-negative number
/// - `date`: null or a valid `YYYY-MM-DD` calendar date
/// - `sub_category`: null or a string (lower-cased, truncated to 60 chars)
/// - `note`: null or a string
pub fn parse_structured_record(response: &str) -> Result<StructuredRecord> {
    let json = extract_json(response)?;
    let obj = json
        .as_object()
        .ok_or_else(|| Error::Extraction("AI response is not a JSON object".into()))?;

    let flow = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Flow>().ok())
        .ok_or_else(|| field_error("type", obj.get("type")))?;

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Category>().ok())
        .ok_or_else(|| field_error("category", obj.get("category")))?;

    let amount = obj
        .get("amount")
        .and_then(Value::as_f64)
        .filter(|a| *a >= 0.0 && a.is_finite())
        .ok_or_else(|| field_error("amount", obj.get("amount")))?;

    let date = match obj.get("date") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| field_error("date", obj.get("date")))?,
        ),
        other => return Err(field_error("date", other)),
    };

    let sub_category = match obj.get("sub_category") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(normalize_sub_category(s)),
        other => return Err(field_error("sub_category", other)),
    };

    let note = match obj.get("note") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        other => return Err(field_error("note", other)),
    };

    Ok(StructuredRecord {
        date,
        flow,
        category,
        sub_category,
        amount,
        note,
    })
}

/// Lower-case and truncate a merchant short name
fn normalize_sub_category(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .take(SUB_CATEGORY_MAX_CHARS)
        .collect()
}

fn field_error(field: &str, value: Option<&Value>) -> Error {
    match value {
        Some(v) => Error::Extraction(format!("Invalid field '{}' in AI response: {}", field, v)),
        None => Error::Extraction(format!("Missing field '{}' in AI response", field)),
    }
}

fn truncate(s: &str) -> String {
    // Keep error messages bounded for logs
    if s.len() > 200 {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i < 200)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..cut])
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"date": "2025-09-19", "type": "out", "category": "dining", "sub_category": "Starbucks", "amount": 8.75, "note": "latte"}"#;

    #[test]
    fn parses_a_clean_response() {
        let record = parse_structured_record(VALID).unwrap();
        assert_eq!(record.flow, Flow::Out);
        assert_eq!(record.category, Category::Dining);
        assert_eq!(record.amount, 8.75);
        assert_eq!(
            record.date,
            Some(NaiveDate::from_ymd_opt(2025, 9, 19).unwrap())
        );
        // Normalized to lowercase
        assert_eq!(record.sub_category.as_deref(), Some("starbucks"));
    }

    #[test]
    fn parses_response_wrapped_in_commentary() {
        let response = format!("Here is the extracted record:\n{}\nHope that helps!", VALID);
        let record = parse_structured_record(&response).unwrap();
        assert_eq!(record.amount, 8.75);
    }

    #[test]
    fn rejects_response_without_json() {
        let err = parse_structured_record("I could not read this receipt.").unwrap_err();
        assert!(err.to_string().contains("No JSON found"));
    }

    #[test]
    fn rejects_truncated_json() {
        let err =
            parse_structured_record(r#"{"date": "2025-09-19", "type": "out""#).unwrap_err();
        assert!(err.to_string().contains("No JSON found"));
    }

    #[test]
    fn rejects_unknown_type_vocabulary() {
        // "debit" is the persisted vocabulary, not the AI vocabulary
        let response = VALID.replace(r#""out""#, r#""debit""#);
        let err = parse_structured_record(&response).unwrap_err();
        assert!(err.to_string().contains("'type'"));
    }

    #[test]
    fn rejects_category_outside_enum() {
        let response = VALID.replace(r#""dining""#, r#""snacks""#);
        let err = parse_structured_record(&response).unwrap_err();
        assert!(err.to_string().contains("'category'"));
    }

    #[test]
    fn rejects_negative_amount() {
        let response = VALID.replace("8.75", "-8.75");
        let err = parse_structured_record(&response).unwrap_err();
        assert!(err.to_string().contains("'amount'"));
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let response = VALID.replace("8.75", r#""8.75""#);
        let err = parse_structured_record(&response).unwrap_err();
        assert!(err.to_string().contains("'amount'"));
    }

    #[test]
    fn rejects_malformed_date() {
        for bad in ["19/09/2025", "2025-13-01", "yesterday"] {
            let response = VALID.replace("2025-09-19", bad);
            let err = parse_structured_record(&response).unwrap_err();
            assert!(err.to_string().contains("'date'"), "accepted {}", bad);
        }
    }

    #[test]
    fn accepts_null_date_and_optional_fields() {
        let response = r#"{"date": null, "type": "in", "category": "income", "sub_category": null, "amount": 100, "note": null}"#;
        let record = parse_structured_record(response).unwrap();
        assert_eq!(record.date, None);
        assert_eq!(record.sub_category, None);
        assert_eq!(record.note, None);
    }

    #[test]
    fn missing_type_field_is_named() {
        let response = r#"{"category": "other", "amount": 1}"#;
        let err = parse_structured_record(response).unwrap_err();
        assert!(err.to_string().contains("Missing field 'type'"));
    }

    #[test]
    fn sub_category_is_truncated_to_sixty_chars() {
        let long = "a".repeat(80);
        let response = VALID.replace("Starbucks", &long);
        let record = parse_structured_record(&response).unwrap();
        assert_eq!(record.sub_category.unwrap().chars().count(), 60);
    }

    #[test]
    fn amount_of_zero_is_allowed() {
        let response = VALID.replace("8.75", "0");
        assert!(parse_structured_record(&response).is_ok());
    }

    #[test]
    fn extract_json_requires_object_braces() {
        assert!(extract_json("[1, 2, 3]").is_err());
        assert!(extract_json("}{").is_err());
    }
}
