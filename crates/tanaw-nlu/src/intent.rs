//! Totals-vs-normal intent classification.
//!
//! A message takes the totals fast path when it asks for the single grand
//! total of an investment program. Breakdown requests, comparisons, and
//! questions about one specific line item mention "budget" constantly, so
//! the budget cue only counts once those readings are ruled out.

use serde::{Deserialize, Serialize};
use tanaw_core::text::{contains_phrase, normalize};
use tanaw_core::types::ChatIntent;
use tracing::debug;

use crate::aggregation::detect_aggregation_intent;
use crate::line_item::is_line_item_specific_query;

/// Phrases that directly name the grand-total figure.
const TOTALS_KEYWORDS: &[&str] = &["total investment program", "total investment", "grand total"];

/// Classified intent for one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDecision {
    pub intent: ChatIntent,
}

/// Classify a message as a totals query or a normal (retrieval) query.
///
/// A totals keyword, or a bare scope-level "budget" question with no
/// line-item or aggregation reading, selects the totals path. A missing
/// fiscal year does not block the totals path: the host resolves it to the
/// latest published AIP in scope.
pub fn detect_intent(message: &str) -> IntentDecision {
    let normalized = normalize(message);

    let has_totals_keyword = TOTALS_KEYWORDS
        .iter()
        .any(|keyword| contains_phrase(&normalized, keyword));

    let has_budget_totals_cue = contains_phrase(&normalized, "budget")
        && !is_line_item_specific_query(message)
        && detect_aggregation_intent(message).is_none();

    let intent = if has_totals_keyword || has_budget_totals_cue {
        ChatIntent::TotalInvestmentProgram
    } else {
        ChatIntent::Normal
    };

    debug!(
        intent = intent.as_str(),
        has_totals_keyword, has_budget_totals_cue, "classified chat intent"
    );

    IntentDecision { intent }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent_of(message: &str) -> ChatIntent {
        detect_intent(message).intent
    }

    #[test]
    fn grand_total_in_any_casing_or_punctuation() {
        for message in [
            "grand total",
            "GRAND TOTAL",
            "What's the Grand Total?",
            "the grand, total",
            "...grand   total!!!",
        ] {
            assert_eq!(
                intent_of(message),
                ChatIntent::TotalInvestmentProgram,
                "message: {message}"
            );
        }
    }

    #[test]
    fn total_investment_program_phrase() {
        assert_eq!(
            intent_of("What is the Total Investment Program for FY 2026 in Cabuyao City?"),
            ChatIntent::TotalInvestmentProgram
        );
    }

    #[test]
    fn totals_without_year_still_totals() {
        // Missing year resolves downstream to the latest published AIP.
        assert_eq!(
            intent_of("what is the total investment program"),
            ChatIntent::TotalInvestmentProgram
        );
    }

    #[test]
    fn bare_scope_budget_question_is_totals() {
        assert_eq!(
            intent_of("What is the budget of barangay Mamatid?"),
            ChatIntent::TotalInvestmentProgram
        );
    }

    #[test]
    fn specific_project_budget_is_normal() {
        assert_eq!(
            intent_of("budget for \"Road Concreting Phase 2\" project"),
            ChatIntent::Normal
        );
        assert_eq!(
            intent_of("budget for the Road Concreting project"),
            ChatIntent::Normal
        );
        assert_eq!(intent_of("budget for Ref 8000-003-002-006"), ChatIntent::Normal);
    }

    #[test]
    fn sector_breakdown_is_normal() {
        assert_eq!(intent_of("Budget totals by sector FY 2026"), ChatIntent::Normal);
        assert_eq!(intent_of("budget breakdown per sector"), ChatIntent::Normal);
    }

    #[test]
    fn compare_years_is_normal() {
        assert_eq!(
            intent_of("Compare 2025 vs 2026 total budget"),
            ChatIntent::Normal
        );
    }

    #[test]
    fn top_projects_is_normal() {
        assert_eq!(intent_of("Top 3 projects in FY 2026"), ChatIntent::Normal);
    }

    #[test]
    fn unrelated_question_is_normal() {
        assert_eq!(
            intent_of("When will the new health center open?"),
            ChatIntent::Normal
        );
        assert_eq!(intent_of(""), ChatIntent::Normal);
    }

    #[test]
    fn budget_word_requires_boundaries() {
        assert_eq!(intent_of("budgetary outlook for the region"), ChatIntent::Normal);
    }
}
