//! Keyword categorizer for the rule-based fallback path
//!
//! Maps a free-text description and a transaction direction to one of a
//! fixed category vocabulary using substring keyword tables. No LLM needed;
//! deterministic matching covers the common merchants.
//!
//! The table is evaluated in declared order and the first matching category
//! wins, so the ordering below is part of the contract, not an
//! implementation detail.

use crate::models::Direction;

/// Category assigned when no keyword matches
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Keywords that indicate money coming in. Checked first for credits.
const INCOME_KEYWORDS: &[&str] = &[
    "salary",
    "payroll",
    "deposit",
    "bonus",
    "commission",
    "dividend",
    "interest",
    "refund",
    "payment received",
    "transfer in",
];

/// Category keyword table, in match-priority order.
const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    (
        "Dining",
        &[
            "restaurant",
            "cafe",
            "coffee",
            "espresso",
            "starbucks",
            "mcdonald",
            "tim hortons",
            "burger",
            "pizza",
            "sushi",
            "diner",
            "bakery",
            "bistro",
            "doordash",
            "uber eats",
            "grubhub",
        ],
    ),
    (
        "Groceries",
        &[
            "grocery",
            "supermarket",
            "walmart",
            "costco",
            "safeway",
            "kroger",
            "aldi",
            "whole foods",
            "trader joe",
            "no frills",
            "loblaws",
            "food basics",
        ],
    ),
    (
        "Transport",
        &[
            "uber",
            "lyft",
            "taxi",
            "transit",
            "metro",
            "subway fare",
            "train",
            "airline",
            "fuel",
            "gas station",
            "shell",
            "chevron",
            "esso",
            "petro",
            "parking",
        ],
    ),
    (
        "Utilities",
        &[
            "electric",
            "hydro",
            "water bill",
            "internet",
            "wireless",
            "mobile",
            "phone bill",
            "telecom",
            "utility",
            "cable",
            "gas bill",
        ],
    ),
    (
        "Rent",
        &["rent", "lease", "landlord", "property management", "tenancy"],
    ),
    ("Income", INCOME_KEYWORDS),
    (
        "Shopping",
        &[
            "amazon",
            "target",
            "best buy",
            "ikea",
            "mall",
            "clothing",
            "apparel",
            "shoes",
            "electronics",
            "home depot",
            "etsy",
            "ebay",
        ],
    ),
    (
        "Healthcare",
        &[
            "pharmacy",
            "drug mart",
            "cvs",
            "walgreens",
            "clinic",
            "hospital",
            "dental",
            "doctor",
            "optical",
            "physio",
        ],
    ),
    (
        "Entertainment",
        &[
            "netflix",
            "spotify",
            "disney",
            "cinema",
            "movie",
            "theatre",
            "theater",
            "concert",
            "steam",
            "playstation",
            "xbox",
            "nintendo",
        ],
    ),
];

/// Categorize a transaction description.
///
/// Credits are tested against the income keywords first; any hit returns
/// `"Income"` immediately. Otherwise the table is scanned in declared order
/// (skipping the income row for debits) and the first category with a
/// substring match wins. Falls back to [`UNCATEGORIZED`]. Pure function,
/// never fails.
pub fn categorize(description: &str, direction: Direction) -> &'static str {
    let haystack = description.to_lowercase();

    if direction == Direction::Credit
        && INCOME_KEYWORDS.iter().any(|kw| haystack.contains(kw))
    {
        return "Income";
    }

    for (category, keywords) in CATEGORY_TABLE {
        if *category == "Income" && direction == Direction::Debit {
            continue;
        }
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return category;
        }
    }

    UNCATEGORIZED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payroll_credit_is_income() {
        assert_eq!(categorize("Payroll Deposit", Direction::Credit), "Income");
    }

    #[test]
    fn starbucks_debit_is_dining() {
        assert_eq!(categorize("Starbucks Coffee", Direction::Debit), "Dining");
    }

    #[test]
    fn unknown_merchant_is_uncategorized() {
        assert_eq!(
            categorize("Unknown Store XYZ", Direction::Debit),
            UNCATEGORIZED
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(categorize("NETFLIX.COM", Direction::Debit), "Entertainment");
        assert_eq!(categorize("walmart supercentre", Direction::Debit), "Groceries");
    }

    #[test]
    fn income_keywords_are_skipped_for_debits() {
        // "deposit" is an income keyword, but a debit can never be Income
        assert_eq!(
            categorize("Security Deposit Refund Pending", Direction::Debit),
            UNCATEGORIZED
        );
    }

    #[test]
    fn table_order_breaks_ties() {
        // "uber eats" contains both a Dining keyword ("uber eats") and a
        // Transport keyword ("uber"); Dining is declared first and wins.
        assert_eq!(categorize("Uber Eats Order", Direction::Debit), "Dining");
    }

    #[test]
    fn credit_income_outranks_other_tables() {
        // "interest" would not match any expense table, but even a
        // description that also mentions a merchant resolves to Income
        // when the income list hits first.
        assert_eq!(
            categorize("Interest earned - Amazon rewards", Direction::Credit),
            "Income"
        );
    }

    #[test]
    fn credit_without_income_keywords_falls_through() {
        assert_eq!(categorize("Starbucks Refund?", Direction::Debit), "Dining");
        // A credit with no income keyword still scans the full table
        assert_eq!(categorize("Netflix", Direction::Credit), "Entertainment");
    }
}
