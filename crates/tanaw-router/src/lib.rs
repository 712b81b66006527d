//! Routing and response construction around the injected chat resolvers.
//!
//! The router picks exactly one of the host's two resolvers per query
//! (SQL totals vs. semantic retrieval); the refusal and reply modules turn
//! outcomes into deterministic user-facing text.

pub mod refusal;
pub mod reply;
pub mod route;

pub use refusal::{MissingParam, RefusalContext, RefusalIntent, build_refusal_message};
pub use reply::{
    LineItemFacts, build_clarification_options, build_line_item_answer, build_scope_disclosure,
    build_totals_answer, format_php_amount,
};
pub use route::{RouteResult, build_totals_missing_message, route_sql_first_totals};
