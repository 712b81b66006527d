//! Deterministic reply formatting.
//!
//! Successful lookups become fixed-template sentences so tests and users
//! can rely on the exact wording: peso amounts with digit grouping, the
//! totals evidence sentence, line-item fact clauses, and the scope
//! disclosure appended when the answer used the session's default scope.

use serde::{Deserialize, Serialize};
use tanaw_nlu::line_item::{FactField, RankedCandidate};
use tanaw_nlu::scope::ScopeReason;

/// Facts for one line item, as fetched by the host after a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemFacts {
    pub title: String,
    pub ref_code: Option<String>,
    pub fiscal_year: Option<i32>,
    pub total: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub fund_source: Option<String>,
    pub implementing_agency: Option<String>,
    pub expected_output: Option<String>,
}

/// Format a peso amount with digit grouping: `PHP 1,234,567.89`.
///
/// Missing or non-finite values render as `N/A`.
pub fn format_php_amount(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };

    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("PHP {sign}{grouped}.{frac_part}")
}

fn format_schedule(start_date: Option<&str>, end_date: Option<&str>) -> String {
    let start = start_date.map(str::trim).filter(|s| !s.is_empty());
    let end = end_date.map(str::trim).filter(|s| !s.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        (Some(start), None) => format!("{start} to N/A"),
        (None, Some(end)) => format!("N/A to {end}"),
        (None, None) => "N/A".to_string(),
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("N/A")
}

/// Prefix a bare barangay name with "Barangay" unless it already carries
/// the marker.
fn display_barangay(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.to_lowercase().starts_with("barangay ") {
        trimmed.to_string()
    } else {
        format!("Barangay {trimmed}")
    }
}

/// Answer sentence for a successful totals lookup, citing the extraction
/// evidence.
pub fn build_totals_answer(
    fiscal_year: i32,
    scope_label: &str,
    amount: f64,
    page_no: Option<u32>,
    evidence_text: &str,
) -> String {
    let page_label = match page_no {
        Some(page) => format!("page {page}"),
        None => "page not specified".to_string(),
    };
    format!(
        "The Total Investment Program for FY {fiscal_year} ({scope_label}) is {}. \
         Evidence: {page_label}, \"{}\".",
        format_php_amount(Some(amount)),
        evidence_text.trim(),
    )
}

/// Disclosure appended when the answer's scope was not named by the user.
pub fn build_scope_disclosure(reason: ScopeReason, scope_name: Option<&str>) -> Option<String> {
    match reason {
        ScopeReason::DefaultUserScope => {
            let label = scope_name
                .map(display_barangay)
                .unwrap_or_else(|| "your barangay".to_string());
            Some(format!("({label} - based on your account scope)"))
        }
        ScopeReason::Global => Some("(Scope: all barangays)".to_string()),
        _ => None,
    }
}

/// Answer sentence for a matched line item, one clause per requested fact.
pub fn build_line_item_answer(
    facts: &LineItemFacts,
    fields: &[FactField],
    scope_disclosure: Option<&str>,
) -> String {
    let title = {
        let trimmed = facts.title.trim();
        if trimmed.is_empty() { "the selected line item" } else { trimmed }
    };
    let ref_text = facts
        .ref_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| format!(" (Ref {code})"))
        .unwrap_or_default();

    let mut clauses: Vec<String> = Vec::with_capacity(fields.len());
    for field in fields {
        match field {
            FactField::Amount => {
                clauses.push(format!("total allocation: {}", format_php_amount(facts.total)));
            }
            FactField::Schedule => {
                clauses.push(format!(
                    "schedule: {}",
                    format_schedule(facts.start_date.as_deref(), facts.end_date.as_deref())
                ));
            }
            FactField::FundSource => {
                clauses.push(format!("fund source: {}", or_na(facts.fund_source.as_deref())));
            }
            FactField::ImplementingAgency => {
                clauses.push(format!(
                    "implementing agency: {}",
                    or_na(facts.implementing_agency.as_deref())
                ));
            }
            FactField::ExpectedOutput => {
                clauses.push(format!(
                    "expected output: {}",
                    or_na(facts.expected_output.as_deref())
                ));
            }
        }
    }

    if clauses.is_empty() {
        return format!(
            "I found {title}, but I need a specific field \
             (amount, schedule, fund source, implementing agency, or expected output)."
        );
    }

    let disclosure = scope_disclosure
        .map(|text| format!(" {text}"))
        .unwrap_or_default();
    format!("For {title}{ref_text}{disclosure}, {}.", clauses.join("; "))
}

/// Options offered when retrieval returns near-tied candidates: up to
/// three deduped "title (Ref …) - FY …" labels in rank order.
pub fn build_clarification_options(ranked: &[RankedCandidate]) -> Vec<String> {
    let mut options: Vec<String> = Vec::with_capacity(3);

    for entry in ranked {
        let title = entry.candidate.title.trim();
        if title.is_empty() {
            continue;
        }
        let ref_text = entry
            .candidate
            .aip_ref_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(|code| format!(" (Ref {code})"))
            .unwrap_or_default();
        let year_label = match entry.candidate.fiscal_year {
            Some(year) => year.to_string(),
            None => "Any".to_string(),
        };

        let label = format!("{title}{ref_text} - FY {year_label}");
        if options.iter().any(|existing| existing == &label) {
            continue;
        }
        options.push(label);
        if options.len() == 3 {
            break;
        }
    }

    options
}
