//! Refusal and clarification construction.
//!
//! Failures are classified in a fixed priority order. A document
//! limitation outranks everything: no amount of query refinement makes the
//! AIP name a contractor. A missing required parameter is checked before
//! retrieval failure, because a request that was never dispatched cannot
//! have "failed retrieval".

use serde::{Deserialize, Serialize};
use tanaw_core::text::normalize;
use tanaw_core::types::{RefusalReason, RefusalResponse, RefusalStatus};
use tanaw_nlu::line_item::DocLimitField;

const MAX_SUGGESTIONS: usize = 3;

/// Query kind the failed request was routed as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalIntent {
    Totals,
    LineItemFact,
    Aggregation,
    UnanswerableField,
    #[default]
    PipelineFallback,
}

/// Parameter the query needed but did not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingParam {
    FiscalYear,
    Barangay,
    City,
}

/// Everything known about a failed request at refusal time.
///
/// Hosts typically have only a few of these fields; the rest default to
/// absent/false, which the builder treats as "signal not present".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefusalContext {
    pub intent: RefusalIntent,
    pub query_text: String,
    pub fiscal_year: Option<i32>,
    pub scope_label: Option<String>,
    pub had_vector_search: bool,
    pub found_candidates: Option<usize>,
    pub explicit_scope_requested: bool,
    pub scope_resolved: bool,
    pub missing_param: Option<MissingParam>,
    pub doc_limit_field: Option<DocLimitField>,
}

/// Phrases published AIP data can never answer: accusations and forecasts.
fn has_unsupported_cue(query_text: &str) -> bool {
    let q = normalize(query_text);
    q.contains("who stole")
        || q.contains("embezzl")
        || q.contains("corrupt")
        || q.contains("predict")
        || q.contains("forecast")
        || (q.contains("next year") && q.contains("budget"))
}

fn suggestion_list<const N: usize>(entries: [&str; N]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(MAX_SUGGESTIONS);
    for entry in entries {
        let trimmed = entry.trim();
        if trimmed.is_empty() || out.iter().any(|existing| existing == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
    }
    out
}

/// Classify a failure and render its user-facing response.
pub fn build_refusal_message(ctx: &RefusalContext) -> RefusalResponse {
    if let Some(field) = ctx.doc_limit_field {
        return RefusalResponse {
            status: RefusalStatus::Refusal,
            reason: RefusalReason::DocumentLimitation,
            message: format!(
                "The published AIP does not list {}. \
                 I can answer amounts, fund sources, and schedules when they are present.",
                field.document_label()
            ),
            suggestions: suggestion_list([
                "Ask for the project's amount, fund source, or schedule.",
                "Provide a Ref code if available.",
                "Ask for top projects or totals by sector or fund source.",
            ]),
        };
    }

    if ctx.missing_param == Some(MissingParam::FiscalYear)
        && matches!(ctx.intent, RefusalIntent::Totals | RefusalIntent::Aggregation)
    {
        return RefusalResponse {
            status: RefusalStatus::Clarification,
            reason: RefusalReason::MissingRequiredParameter,
            message: "Which fiscal year should I use (e.g., FY 2025 or FY 2026)?".to_string(),
            suggestions: suggestion_list(["Reply with a fiscal year, such as FY 2026."]),
        };
    }

    if ctx.explicit_scope_requested && !ctx.scope_resolved {
        return RefusalResponse {
            status: RefusalStatus::Clarification,
            reason: RefusalReason::AmbiguousScope,
            message: "I couldn't match the requested barangay or city name. \
                      Please specify the exact name (e.g., 'Barangay Pulo') \
                      or choose 'across all barangays'."
                .to_string(),
            suggestions: suggestion_list([
                "Use the exact scope name, such as Barangay Pulo.",
                "Say 'across all barangays' to use global scope.",
            ]),
        };
    }

    if has_unsupported_cue(&ctx.query_text) {
        return RefusalResponse {
            status: RefusalStatus::Refusal,
            reason: RefusalReason::UnsupportedRequest,
            message: "I can only answer based on published AIP data. \
                      Please ask about totals, line-item amounts, fund sources, or schedules."
                .to_string(),
            suggestions: suggestion_list([
                "Ask for a project amount, fund source, or schedule.",
                "Ask for totals by sector, fund source, or top projects.",
            ]),
        };
    }

    let scope_text = ctx
        .scope_label
        .as_deref()
        .map(|label| format!(" for {label}"))
        .unwrap_or_default();
    let year_text = ctx
        .fiscal_year
        .map(|year| format!(" for FY {year}"))
        .unwrap_or_default();

    RefusalResponse {
        status: RefusalStatus::Refusal,
        reason: RefusalReason::RetrievalFailure,
        message: format!(
            "I couldn't find a matching published AIP entry{scope_text}{year_text}. \
             Try using the exact project title or a Ref code."
        ),
        suggestions: suggestion_list([
            "Try the exact project title as written in the AIP.",
            "Provide the Ref code (e.g., 8000-003-002-006).",
            "Remove extra filters (scope or year) to broaden the search.",
        ]),
    }
}
