//! Wire-facing value records shared across the chat-query layer.
//!
//! Every type here is an immutable snapshot produced once per incoming
//! message. The host application serializes these into its own chat-message
//! JSON envelope; the serde field names are the layer's wire contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Binary routing intent for an incoming chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatIntent {
    /// The message asks for a single grand-total investment figure and can
    /// be answered by a cheap SQL aggregate.
    TotalInvestmentProgram,
    /// Everything else: routed to semantic retrieval.
    Normal,
}

#[derive(Debug, Error)]
#[error("unknown chat intent: {0}")]
pub struct ParseIntentError(String);

impl ChatIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalInvestmentProgram => "total_investment_program",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for ChatIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatIntent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total_investment_program" => Ok(Self::TotalInvestmentProgram),
            "normal" => Ok(Self::Normal),
            other => Err(ParseIntentError(other.to_string())),
        }
    }
}

/// Governance level a query's data should be filtered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Barangay,
    City,
    Municipality,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Barangay => "barangay",
            Self::City => "city",
            Self::Municipality => "municipality",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One explicitly named scope found in a message ("barangay San Isidro").
///
/// `scope_name` keeps the casing the user typed; lowercase only for
/// matching against place tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCue {
    pub scope_type: ScopeType,
    pub scope_name: String,
}

/// Outcome of scanning one message for scope cues.
///
/// A first-person cue ("our barangay") and named scopes never co-exist: the
/// own-scope cue wins and leaves `requested_scopes` empty, so callers get
/// one unambiguous signal per message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCueParse {
    pub has_own_barangay_cue: bool,
    pub requested_scopes: Vec<ScopeCue>,
}

/// A resolved place reference supplied by the host (session scope or a
/// place-table lookup result).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRef {
    pub id: String,
    pub name: String,
}

/// Whether a failure response refuses outright or asks a follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalStatus {
    Refusal,
    Clarification,
}

/// Failure category behind a refusal or clarification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    /// The source document structurally lacks the requested field; only
    /// re-extraction can change the answer.
    DocumentLimitation,
    /// No matching evidence was found this time; retryable with a refined
    /// query.
    RetrievalFailure,
    /// The query is underspecified; resolved by asking the user.
    MissingRequiredParameter,
    /// A requested place name could not be matched to exactly one scope.
    AmbiguousScope,
    /// The question is outside what published AIP data can answer.
    UnsupportedRequest,
}

impl RefusalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentLimitation => "document_limitation",
            Self::RetrievalFailure => "retrieval_failure",
            Self::MissingRequiredParameter => "missing_required_parameter",
            Self::AmbiguousScope => "ambiguous_scope",
            Self::UnsupportedRequest => "unsupported_request",
        }
    }
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing failure response, built fresh per failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalResponse {
    pub status: RefusalStatus,
    pub reason: RefusalReason,
    pub message: String,
    pub suggestions: Vec<String>,
}
