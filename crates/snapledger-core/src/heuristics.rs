//! Rule-based receipt parser
//!
//! The fallback extraction path: four independent sub-extractions (date,
//! amount, merchant, direction), each an ordered list of pattern+handler
//! rules evaluated in sequence with early exit, and each with a guaranteed
//! default. Producing a [`ParsedTransaction`] never fails; missing fields
//! degrade to documented "best guess" values instead.

use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::models::{Direction, ParsedTransaction};

/// Merchant assigned when no plausible candidate line exists
pub const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

// ── Compiled regex statics ───────────────────────────────────────────────────

fn re_weekday_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})\b",
        )
        .expect("invalid regex")
    })
}

fn re_month_name_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})\b",
        )
        .expect("invalid regex")
    })
}

fn re_numeric_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // The regex crate has no backreferences; separator equality is
        // checked in the handler.
        Regex::new(r"\b(\d{1,4})([/\-.])(\d{1,2})([/\-.])(\d{2,4})\b").expect("invalid regex")
    })
}

fn re_day_month_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{4})\b",
        )
        .expect("invalid regex")
    })
}

fn re_currency_amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[$€£¥₹₽]\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)").expect("invalid regex")
    })
}

fn re_number_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9][0-9,]*(?:\.[0-9]+)?").expect("invalid regex"))
}

fn re_weekday_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(mon|tue|wed|thu|fri|sat|sun)\b").expect("invalid regex"))
}

fn re_phone_fragment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\(\d{3}\)|\d{3}[\s\-.]\d{3,4}[\s\-.]\d{4}").expect("invalid regex")
    })
}

fn re_price_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[$€£¥₹₽]\s*\d|\d+\.\d{2}\b)").expect("invalid regex"))
}

// ── Public parser API ────────────────────────────────────────────────────────

/// Parse raw OCR text into a transaction via heuristics alone.
///
/// Defaults when nothing is found: processing-day date, amount `0.0`,
/// [`UNKNOWN_MERCHANT`], debit direction.
pub fn parse_receipt_text(text: &str) -> ParsedTransaction {
    ParsedTransaction {
        date: extract_date(text).unwrap_or_else(|| Local::now().date_naive()),
        description: extract_merchant(text),
        amount: extract_amount(text),
        direction: extract_direction(text),
    }
}

// ── Date ─────────────────────────────────────────────────────────────────────

/// Try the date rules in priority order; first pattern that decodes wins.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    type DateRule = (
        fn() -> &'static Regex,
        fn(&regex::Captures<'_>) -> Option<NaiveDate>,
    );
    // Priority order: weekday-prefixed, month name, numeric, day-first.
    const RULES: &[DateRule] = &[
        (re_weekday_date, decode_month_day_year),
        (re_month_name_date, decode_month_day_year),
        (re_numeric_date, decode_numeric),
        (re_day_month_date, decode_day_month_year),
    ];

    for (pattern, decode) in RULES {
        if let Some(caps) = pattern().captures(text) {
            if let Some(date) = decode(&caps) {
                return Some(date);
            }
        }
    }
    None
}

/// Captures: (month name, day, year)
fn decode_month_day_year(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let month = month_from_name(caps.get(1)?.as_str())?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Captures: (day, month name, year)
fn decode_day_month_year(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month = month_from_name(caps.get(2)?.as_str())?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Captures: (first, sep, second, sep, third). A 4-digit first field means
/// Y/M/D, otherwise D/M/Y. Generic chrono parsing is the last resort for
/// numeric text that fits neither convention (e.g. US M/D/Y).
fn decode_numeric(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    if caps.get(2)?.as_str() != caps.get(4)?.as_str() {
        return None;
    }
    let first = caps.get(1)?.as_str();
    let second: u32 = caps.get(3)?.as_str().parse().ok()?;
    let third = caps.get(5)?.as_str();

    let decoded = if first.len() == 4 {
        let year: i32 = first.parse().ok()?;
        let day: u32 = third.parse().ok()?;
        NaiveDate::from_ymd_opt(year, second, day)
    } else {
        let day: u32 = first.parse().ok()?;
        let year = expand_year(third.parse().ok()?);
        NaiveDate::from_ymd_opt(year, second, day)
    };
    if decoded.is_some() {
        return decoded;
    }

    let normalized = format!(
        "{}/{}/{}",
        first,
        caps.get(3)?.as_str(),
        expand_year(third.parse().ok()?)
    );
    ["%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
}

fn expand_year(y: i32) -> i32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

/// Explicit 3-letter month lookup; longer names decode via their prefix
fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    match lower.get(..3)? {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

// ── Amount ───────────────────────────────────────────────────────────────────

/// Extract the transaction amount.
///
/// Policy chain: largest currency-tagged number (the total outranks line
/// items), else the first number on a total/amount/balance line, else the
/// largest bare number in (0, 100000), else `0.0`.
pub fn extract_amount(text: &str) -> f64 {
    let tagged = re_currency_amount()
        .captures_iter(text)
        .filter_map(|c| parse_number(c.get(1)?.as_str()))
        .fold(None, fold_max);
    if let Some(max) = tagged {
        return max;
    }

    for line in text.lines() {
        let lower = line.to_lowercase();
        if lower.contains("total") || lower.contains("amount") || lower.contains("balance") {
            if let Some(m) = re_number_token().find(line) {
                if let Some(value) = parse_number(m.as_str()) {
                    return value;
                }
            }
        }
    }

    // Bare numbers; the range bound excludes years, phone numbers and codes
    re_number_token()
        .find_iter(text)
        .filter_map(|m| parse_number(m.as_str()))
        .filter(|v| *v > 0.0 && *v < 100_000.0)
        .fold(None, fold_max)
        .unwrap_or(0.0)
}

fn fold_max(acc: Option<f64>, value: f64) -> Option<f64> {
    Some(acc.map_or(value, |a| a.max(value)))
}

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', "").parse().ok()
}

// ── Merchant ─────────────────────────────────────────────────────────────────

/// Well-known merchants matched as a whole line or line prefix
const KNOWN_MERCHANTS: &[&str] = &[
    "Amazon",
    "Walmart",
    "Costco",
    "Target",
    "Starbucks",
    "McDonald",
    "Tim Hortons",
    "Uber",
    "Lyft",
    "Netflix",
    "Spotify",
    "Apple",
    "Google",
    "Microsoft",
    "PayPal",
];

/// Administrative noise that disqualifies a line as a merchant candidate
const NOISE_MARKERS: &[&str] = &[
    "transaction",
    "details",
    "posted",
    "card number",
    "category",
    "budget",
    "note",
    "merchant",
    "website",
];

/// Extract the merchant line.
///
/// Well-known names win outright; otherwise the shortest plausible
/// candidate line is taken (short lines are likeliest to be a clean
/// merchant name rather than an address or slogan).
pub fn extract_merchant(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    for line in &lines {
        for known in KNOWN_MERCHANTS {
            if line.eq_ignore_ascii_case(known)
                || line.to_lowercase().starts_with(&known.to_lowercase())
            {
                return (*known).to_string();
            }
        }
    }

    lines
        .iter()
        .filter(|l| is_merchant_candidate(l))
        .min_by_key(|l| l.chars().count())
        .map(|l| (*l).to_string())
        .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string())
}

fn is_merchant_candidate(line: &str) -> bool {
    let len = line.chars().count();
    if len <= 2 || len >= 50 {
        return false;
    }
    if !line.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    let lower = line.to_lowercase();
    if NOISE_MARKERS.iter().any(|m| lower.contains(m)) {
        return false;
    }
    if re_weekday_word().is_match(line)
        || re_phone_fragment().is_match(line)
        || re_price_start().is_match(line)
    {
        return false;
    }
    true
}

// ── Direction ────────────────────────────────────────────────────────────────

/// Keywords indicating money coming in
const CREDIT_KEYWORDS: &[&str] = &[
    "credited",
    "refund",
    "salary",
    "payroll",
    "deposit",
    "bonus",
    "commission",
    "dividend",
    "interest",
    "payment received",
    "transfer in",
    "income",
    "credit",
    "received",
];

/// Absent contrary evidence, receipts are assumed to be purchases (debit)
pub fn extract_direction(text: &str) -> Direction {
    let lower = text.to_lowercase();
    if CREDIT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Direction::Credit
    } else {
        Direction::Debit
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
