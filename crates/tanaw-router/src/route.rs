//! SQL-first dispatch between the totals resolver and the normal resolver.
//!
//! The two paths have very different cost profiles: the totals path is one
//! aggregate SQL lookup, the normal path is embedding plus vector search
//! plus synthesis. The router exists to guarantee the expensive path is
//! never touched when the cheap one answers the question, so exactly one
//! resolver runs per routing decision.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tanaw_core::types::ChatIntent;
use tracing::info;

/// Outcome of dispatching one query; `value` is whatever the injected
/// resolver returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum RouteResult<T, U> {
    /// Totals path. `None` when the resolver found no totals row.
    Totals { value: Option<T> },
    /// Normal (retrieval-backed) path.
    Normal { value: U },
}

impl<T, U> RouteResult<T, U> {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Totals { .. } => "totals",
            Self::Normal { .. } => "normal",
        }
    }
}

/// Dispatch a classified query to exactly one of the injected resolvers.
///
/// `total_investment_program` awaits `resolve_totals` alone; every other
/// intent awaits `resolve_normal` alone. No retry, timeout, or error
/// translation happens here: resolvers own their cancellation contracts and
/// hosts translate resolver failures before or after this seam.
pub async fn route_sql_first_totals<T, U, TotalsFut, NormalFut>(
    intent: ChatIntent,
    resolve_totals: impl FnOnce() -> TotalsFut,
    resolve_normal: impl FnOnce() -> NormalFut,
) -> RouteResult<T, U>
where
    TotalsFut: Future<Output = Option<T>>,
    NormalFut: Future<Output = U>,
{
    match intent {
        ChatIntent::TotalInvestmentProgram => {
            info!(route = "totals", intent = intent.as_str(), "dispatching chat query");
            RouteResult::Totals {
                value: resolve_totals().await,
            }
        }
        ChatIntent::Normal => {
            info!(route = "normal", intent = intent.as_str(), "dispatching chat query");
            RouteResult::Normal {
                value: resolve_normal().await,
            }
        }
    }
}

/// Message for a totals query whose SQL lookup found no totals row.
///
/// This is a numeric-extraction miss, not a retrieval miss, and the wording
/// keeps the two distinguishable: it must never read like the normal path's
/// insufficient-evidence refusal.
pub fn build_totals_missing_message(fiscal_year: Option<i32>, scope_label: Option<&str>) -> String {
    let year_phrase = match fiscal_year {
        Some(year) => format!("FY {year}"),
        None => "the selected fiscal year".to_string(),
    };
    let scope_suffix = match scope_label {
        Some(label) => format!(" ({label})"),
        None => String::new(),
    };

    format!(
        "I couldn't find a recorded Total Investment Program line for {year_phrase}{scope_suffix}. \
         The totals line was likely not captured during extraction. \
         Please re-run extraction or check the AIP PDF's summary page."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn totals_intent_calls_totals_resolver_exactly_once() {
        let totals_calls = AtomicUsize::new(0);
        let normal_calls = AtomicUsize::new(0);

        let result: RouteResult<i64, &str> = route_sql_first_totals(
            ChatIntent::TotalInvestmentProgram,
            || async {
                totals_calls.fetch_add(1, Ordering::SeqCst);
                Some(512_345_678)
            },
            || async {
                normal_calls.fetch_add(1, Ordering::SeqCst);
                "never"
            },
        )
        .await;

        assert_eq!(totals_calls.load(Ordering::SeqCst), 1);
        assert_eq!(normal_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            result,
            RouteResult::Totals {
                value: Some(512_345_678)
            }
        );
    }

    #[tokio::test]
    async fn normal_intent_calls_normal_resolver_exactly_once() {
        let totals_calls = AtomicUsize::new(0);
        let normal_calls = AtomicUsize::new(0);

        let result: RouteResult<i64, &str> = route_sql_first_totals(
            ChatIntent::Normal,
            || async {
                totals_calls.fetch_add(1, Ordering::SeqCst);
                None
            },
            || async {
                normal_calls.fetch_add(1, Ordering::SeqCst);
                "answer"
            },
        )
        .await;

        assert_eq!(totals_calls.load(Ordering::SeqCst), 0);
        assert_eq!(normal_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, RouteResult::Normal { value: "answer" });
    }

    #[tokio::test]
    async fn empty_totals_result_stays_on_totals_path() {
        let result: RouteResult<i64, ()> = route_sql_first_totals(
            ChatIntent::TotalInvestmentProgram,
            || async { None },
            || async {},
        )
        .await;

        assert_eq!(result, RouteResult::Totals { value: None });
        assert_eq!(result.path(), "totals");
    }

    #[test]
    fn route_result_serde_shape() {
        let totals: RouteResult<i64, ()> = RouteResult::Totals { value: Some(7) };
        assert_eq!(
            serde_json::to_string(&totals).unwrap(),
            "{\"path\":\"totals\",\"value\":7}"
        );

        let normal: RouteResult<i64, &str> = RouteResult::Normal { value: "hi" };
        assert_eq!(
            serde_json::to_string(&normal).unwrap(),
            "{\"path\":\"normal\",\"value\":\"hi\"}"
        );
    }

    #[test]
    fn missing_message_with_year_and_scope() {
        let message = build_totals_missing_message(Some(2025), Some("Barangay Mamatid"));
        assert!(message.contains("FY 2025"));
        assert!(message.contains("Barangay Mamatid"));
        assert!(!message.contains("insufficient evidence across snippets"));
    }

    #[test]
    fn missing_message_without_year() {
        let message = build_totals_missing_message(None, None);
        assert!(message.contains("the selected fiscal year"));
        assert!(!message.contains("FY "));
        assert!(!message.contains('('));
    }

    #[test]
    fn missing_message_mentions_extraction_retry() {
        let message = build_totals_missing_message(Some(2026), None);
        assert!(message.contains("extraction"));
        assert!(message.contains("summary page"));
    }
}
