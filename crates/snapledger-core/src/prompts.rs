//! Prompt fixtures for the AI structuring extractor
//!
//! The system instruction, the response schema and the few-shot examples
//! are fixed and compiled into the binary. The few-shot pairs double as
//! test fixtures: feeding an example receipt through the pipeline with a
//! deterministic backend must reproduce the example response.

/// System instruction sent with every structuring request
pub const SYSTEM_INSTRUCTION: &str = r#"You are a bookkeeping assistant that converts raw OCR text from receipts and bank-app screenshots into a single structured transaction record.

Respond with JSON only. No prose, no markdown fences, no explanations.

The JSON object must have exactly these fields:
  "date":         transaction date as "YYYY-MM-DD", or null if no date is visible
  "type":         "in" for money received, "out" for money spent
  "category":     one of: shopping, rent, utility, grocery, dining, transportation, entertainment, health, income, fees, transfers, education, other
  "sub_category": short lowercase merchant name (at most 60 characters), or null
  "amount":       the transaction total as a non-negative number
  "note":         a short free-text remark, or null

Pick the final amount actually charged (the total, not a subtotal or line item). If several dates appear, use the purchase date. Never invent values that are not supported by the text."#;

/// One fixed request/response demonstration pair
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    /// Raw OCR text as the user turn
    pub receipt: &'static str,
    /// The exact JSON the model is expected to produce
    pub response: &'static str,
}

/// The four canonical demonstrations included in every request
pub const FEW_SHOT_EXAMPLES: &[FewShotExample] = &[
    FewShotExample {
        receipt: "STARBUCKS STORE #0117\nFri, Sep 19, 2025\n1 Caffe Latte Tall     4.95\n1 Butter Croissant     3.80\nTotal                  $8.75\nVISA ****1123",
        response: r#"{"date": "2025-09-19", "type": "out", "category": "dining", "sub_category": "starbucks", "amount": 8.75, "note": "caffe latte, butter croissant"}"#,
    },
    FewShotExample {
        receipt: "Transaction Details\nACME CORP PAYROLL\nDirect deposit received\nMar 31, 2025\n+$3,250.00\nPosted to chequing",
        response: r#"{"date": "2025-03-31", "type": "in", "category": "income", "sub_category": "acme corp payroll", "amount": 3250.00, "note": "direct deposit"}"#,
    },
    FewShotExample {
        receipt: "WALMART SUPERCENTER\n2025-01-06  14:32\nBANANAS        1.42\nMILK 2%        4.89\nBREAD          2.50\nSUBTOTAL      55.02\nTAX            9.21\nTOTAL         64.23",
        response: r#"{"date": "2025-01-06", "type": "out", "category": "grocery", "sub_category": "walmart", "amount": 64.23, "note": null}"#,
    },
    FewShotExample {
        receipt: "City Power & Light\nAutopay confirmation\nAccount ****2291\nAmount charged $112.40\nThank you for using paperless billing",
        response: r#"{"date": null, "type": "out", "category": "utility", "sub_category": "city power & light", "amount": 112.40, "note": "autopay"}"#,
    },
];

/// Wrap raw OCR text in the delimited user turn
pub fn user_turn(ocr_text: &str) -> String {
    format!("Receipt text:\n<<<\n{}\n>>>", ocr_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::parsing::parse_structured_record;

    #[test]
    fn system_instruction_lists_all_categories() {
        for cat in crate::models::Category::all() {
            assert!(
                SYSTEM_INSTRUCTION.contains(cat.as_str()),
                "category {} missing from system instruction",
                cat
            );
        }
    }

    #[test]
    fn few_shot_responses_pass_validation() {
        // The demonstrations must themselves satisfy the schema we enforce
        for example in FEW_SHOT_EXAMPLES {
            parse_structured_record(example.response).unwrap();
        }
    }

    #[test]
    fn user_turn_wraps_text_in_delimiters() {
        let turn = user_turn("STORE\nTotal $5.00");
        assert!(turn.starts_with("Receipt text:"));
        assert!(turn.contains("<<<\nSTORE"));
        assert!(turn.ends_with(">>>"));
    }
}
