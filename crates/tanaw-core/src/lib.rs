//! Shared value types and text canonicalization for the chat-query layer.

pub mod fiscal;
pub mod text;
pub mod types;

pub use fiscal::{extract_fiscal_year, extract_fiscal_year_pair};
pub use text::{contains_phrase, normalize, normalize_light};
pub use types::{
    ChatIntent, ParseIntentError, RefusalReason, RefusalResponse, RefusalStatus, ScopeCue,
    ScopeCueParse, ScopeRef, ScopeType,
};
