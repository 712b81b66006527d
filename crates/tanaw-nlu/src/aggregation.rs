//! Aggregation-intent detection.
//!
//! A breakdown or comparison request must never ride the single-grand-total
//! fast path, so the intent classifier consults this detector before
//! treating a "budget" mention as a totals cue. The detected kind is also
//! what hosts dispatch their aggregate SQL helpers on.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tanaw_core::fiscal::extract_fiscal_year_pair;
use tanaw_core::text::{contains_phrase, normalize};

/// Breakdown/comparison shape requested by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationKind {
    /// Per-sector totals ("totals by sector").
    BySector,
    /// Per-fund-source totals.
    ByFundSource,
    /// Largest line items ("top 3 projects").
    TopProjects { limit: u32 },
    /// Two-year totals comparison ("compare 2025 vs 2026").
    CompareYears { year_a: i32, year_b: i32 },
}

const BY_SECTOR_CUES: &[&str] = &["by sector", "per sector", "sector breakdown"];

const BY_FUND_SOURCE_CUES: &[&str] = &[
    "by fund source",
    "per fund source",
    "by funding source",
    "fund source breakdown",
];

const COMPARE_CUES: &[&str] = &["compare", "vs", "versus", "difference between"];

static TOP_PROJECTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btop (\d{1,2}) (?:projects|programs)\b").unwrap());

/// Detect an aggregation request; `None` means the message asks for no
/// breakdown and may still qualify for the totals fast path.
pub fn detect_aggregation_intent(message: &str) -> Option<AggregationKind> {
    let normalized = normalize(message);

    if let Some((year_a, year_b)) = extract_fiscal_year_pair(&normalized) {
        if COMPARE_CUES.iter().any(|cue| contains_phrase(&normalized, cue)) {
            return Some(AggregationKind::CompareYears { year_a, year_b });
        }
    }

    if let Some(caps) = TOP_PROJECTS.captures(&normalized) {
        let limit = caps[1].parse().unwrap_or(1);
        return Some(AggregationKind::TopProjects { limit });
    }

    if BY_SECTOR_CUES.iter().any(|cue| contains_phrase(&normalized, cue)) {
        return Some(AggregationKind::BySector);
    }

    if BY_FUND_SOURCE_CUES.iter().any(|cue| contains_phrase(&normalized, cue)) {
        return Some(AggregationKind::ByFundSource);
    }

    None
}
