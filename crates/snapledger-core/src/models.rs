//! Domain models for snapledger

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Transaction direction as persisted: money out (debit) or money in (credit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction direction in the AI response vocabulary: "in" or "out".
///
/// Remapped to [`Direction`] when the structured record is normalized
/// (`in` → credit, `out` → debit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    In,
    Out,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// Map the AI vocabulary onto the persisted vocabulary
    pub fn direction(&self) -> Direction {
        match self {
            Self::In => Direction::Credit,
            Self::Out => Direction::Debit,
        }
    }
}

impl std::str::FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(format!("Unknown flow: {}", s)),
        }
    }
}

/// Closed category taxonomy used by the AI extraction path.
///
/// The rule-based fallback path uses its own keyword-table vocabulary
/// (see [`crate::categorize`]); the two are intentionally not reconciled,
/// so a persisted category value depends on which path produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Shopping,
    Rent,
    Utility,
    Grocery,
    Dining,
    Transportation,
    Entertainment,
    Health,
    Income,
    Fees,
    Transfers,
    Education,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shopping => "shopping",
            Self::Rent => "rent",
            Self::Utility => "utility",
            Self::Grocery => "grocery",
            Self::Dining => "dining",
            Self::Transportation => "transportation",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Income => "income",
            Self::Fees => "fees",
            Self::Transfers => "transfers",
            Self::Education => "education",
            Self::Other => "other",
        }
    }

    /// All categories, in the order they are listed to the model
    pub fn all() -> &'static [Category] {
        &[
            Self::Shopping,
            Self::Rent,
            Self::Utility,
            Self::Grocery,
            Self::Dining,
            Self::Transportation,
            Self::Entertainment,
            Self::Health,
            Self::Income,
            Self::Fees,
            Self::Transfers,
            Self::Education,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "shopping" => Ok(Self::Shopping),
            "rent" => Ok(Self::Rent),
            "utility" => Ok(Self::Utility),
            "grocery" => Ok(Self::Grocery),
            "dining" => Ok(Self::Dining),
            "transportation" => Ok(Self::Transportation),
            "entertainment" => Ok(Self::Entertainment),
            "health" => Ok(Self::Health),
            "income" => Ok(Self::Income),
            "fees" => Ok(Self::Fees),
            "transfers" => Ok(Self::Transfers),
            "education" => Ok(Self::Education),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which extraction path produced a canonical record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Primary path: AI structuring extractor
    Ai,
    /// Rule-based parser + keyword categorizer
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        }
    }
}

impl std::str::FromStr for Provenance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ai" => Ok(Self::Ai),
            "fallback" => Ok(Self::Fallback),
            _ => Err(format!("Unknown provenance: {}", s)),
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the rule-based parser. Every field has a documented
/// "best guess" default, so producing one never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    /// Merchant or short label
    pub description: String,
    /// Non-negative; 0.0 when no amount candidate was found
    pub amount: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
}

/// Validated output of the AI structuring extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub flow: Flow,
    pub category: Category,
    /// Merchant short name, lower-cased, at most 60 characters
    pub sub_category: Option<String>,
    pub amount: f64,
    pub note: Option<String>,
}

/// The single normalized transaction shape, regardless of which
/// extraction path produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
    /// AI-path vocabulary or keyword-table vocabulary depending on provenance
    pub category: String,
    pub notes: Option<String>,
}

/// Result of one extraction cycle: the canonical record plus diagnostics
/// callers can use to detect silent degradation
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub transaction: CanonicalTransaction,
    pub provenance: Provenance,
    /// True when the fallback path produced its documented defaults
    /// (zero amount or unknown merchant)
    pub degraded: bool,
}

/// A persisted transaction row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub category: String,
    pub notes: Option<String>,
    pub provenance: Provenance,
    /// SHA-256 of the source OCR text, links the row back to its capture
    pub source_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub category: String,
    pub notes: Option<String>,
    pub provenance: Provenance,
    pub source_hash: Option<String>,
}

impl NewTransaction {
    /// Build an insertable row from an extraction outcome
    pub fn from_outcome(outcome: &ExtractionOutcome, source_hash: Option<String>) -> Self {
        let tx = &outcome.transaction;
        Self {
            date: tx.date,
            description: tx.description.clone(),
            amount: tx.amount,
            direction: tx.direction,
            category: tx.category.clone(),
            notes: tx.notes.clone(),
            provenance: outcome.provenance,
            source_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn direction_round_trips_through_str() {
        assert_eq!(Direction::from_str("debit").unwrap(), Direction::Debit);
        assert_eq!(Direction::from_str("CREDIT").unwrap(), Direction::Credit);
        assert_eq!(Direction::Credit.as_str(), "credit");
        assert!(Direction::from_str("sideways").is_err());
    }

    #[test]
    fn flow_maps_onto_direction() {
        assert_eq!(Flow::In.direction(), Direction::Credit);
        assert_eq!(Flow::Out.direction(), Direction::Debit);
    }

    #[test]
    fn flow_rejects_persisted_vocabulary() {
        // The AI vocabulary is "in"/"out", not "debit"/"credit"
        assert!(Flow::from_str("debit").is_err());
        assert!(Flow::from_str("credit").is_err());
    }

    #[test]
    fn category_covers_all_thirteen_values() {
        assert_eq!(Category::all().len(), 13);
        for cat in Category::all() {
            assert_eq!(Category::from_str(cat.as_str()).unwrap(), *cat);
        }
    }

    #[test]
    fn category_is_case_sensitive() {
        // The schema mandates lowercase; anything else fails validation
        assert!(Category::from_str("Dining").is_err());
    }

    #[test]
    fn structured_record_serde_uses_type_key() {
        let record = StructuredRecord {
            date: Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            flow: Flow::Out,
            category: Category::Dining,
            sub_category: Some("starbucks".to_string()),
            amount: 8.75,
            note: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "out");
        assert_eq!(json["category"], "dining");
    }
}
