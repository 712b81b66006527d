//! Rule-based NLU over chat messages about AIP budget data.
//!
//! Deterministic classifiers only: keyword tables, token scanning, and a
//! few compiled patterns. Every function is total and referentially
//! transparent; ambiguous input degrades to the `normal` intent or an
//! empty parse, never to an error.

pub mod aggregation;
pub mod intent;
pub mod line_item;
pub mod scope;

pub use aggregation::{AggregationKind, detect_aggregation_intent};
pub use intent::{IntentDecision, detect_intent};
pub use line_item::{
    DocLimitField, FactField, LineItemCandidate, ParsedLineItemQuestion, RankedCandidate,
    is_line_item_specific_query, parse_line_item_question, rerank_candidates,
    should_ask_clarification,
};
pub use scope::{
    ScopeReason, TotalsScopeDecision, normalize_scope_name, parse_scope_cue, resolve_totals_scope,
};
