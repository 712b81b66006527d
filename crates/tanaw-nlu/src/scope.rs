//! Scope-cue parsing: which place is the user asking about?
//!
//! Detects first-person references to the user's own barangay and explicit
//! named scopes, bilingually. Named markers: English "barangay X" /
//! "brgy X", "city of X", "municipality of X"; Filipino "lungsod ng X"
//! (city), "bayan ng X" (municipality). Name resolution against place
//! tables is the host's job; this module only extracts the cues.

use serde::{Deserialize, Serialize};
use tanaw_core::text::{contains_phrase, normalize, trim_trailing_conjunction};
use tanaw_core::types::{ScopeCue, ScopeCueParse, ScopeRef, ScopeType};

/// First-person cues that pin the query to the user's own barangay.
const OWN_BARANGAY_CUES: &[&str] = &[
    "our barangay",
    "my barangay",
    "aming barangay",
    "naming barangay",
];

/// Tokens that end a scope-name capture.
const NAME_STOP_WORDS: &[&str] = &[
    "and", "at", "for", "in", "sa", "of", "ng", "the", "a", "an", "what", "which", "who",
    "when", "where", "how", "is", "are", "was", "has", "have", "had", "does", "do", "with",
    "fy", "fiscal", "year", "total", "totals", "investment", "program", "programs", "grand",
    "budget", "vs", "versus", "compare", "top", "projects", "this", "that",
];

/// Marker words that start a new scope capture (also terminate a running one).
const MARKER_WORDS: &[&str] = &["barangay", "brgy", "city", "municipality", "lungsod", "bayan"];

const NAME_TOKEN_CAP: usize = 5;

struct Token<'a> {
    /// Original-cased word with surrounding punctuation stripped.
    word: &'a str,
    lower: String,
    /// The raw token carried trailing sentence punctuation.
    ends_clause: bool,
}

fn tokenize(message: &str) -> Vec<Token<'_>> {
    message
        .split_whitespace()
        .map(|raw| {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            Token {
                word,
                lower: word.to_lowercase(),
                ends_clause: raw.ends_with(['.', ',', ';', ':', '!', '?', ')']),
            }
        })
        .filter(|t| !t.word.is_empty())
        .collect()
}

/// Marker starting at token `i`: scope type plus the index where the name
/// begins. Two-token markers require their particle ("city OF", "lungsod NG").
fn marker_at(tokens: &[Token<'_>], i: usize) -> Option<(ScopeType, usize)> {
    let second = |word: &str| tokens.get(i + 1).is_some_and(|t| t.lower == word);
    match tokens[i].lower.as_str() {
        "barangay" | "brgy" => Some((ScopeType::Barangay, i + 1)),
        "city" if second("of") => Some((ScopeType::City, i + 2)),
        "municipality" if second("of") => Some((ScopeType::Municipality, i + 2)),
        "lungsod" if second("ng") => Some((ScopeType::City, i + 2)),
        "bayan" if second("ng") => Some((ScopeType::Municipality, i + 2)),
        _ => None,
    }
}

/// Collect name tokens from `start`, returning the name and the index of
/// the first unconsumed token.
fn capture_name(tokens: &[Token<'_>], start: usize) -> (String, usize) {
    let mut words: Vec<&str> = Vec::new();
    let mut i = start;

    while i < tokens.len() && words.len() < NAME_TOKEN_CAP {
        let token = &tokens[i];
        if NAME_STOP_WORDS.contains(&token.lower.as_str())
            || MARKER_WORDS.contains(&token.lower.as_str())
            || token.lower.chars().all(|c| c.is_ascii_digit())
        {
            break;
        }

        // A possessive ends the name: "Mamatid's budget" names Mamatid.
        let stripped = token
            .word
            .strip_suffix("'s")
            .or_else(|| token.word.strip_suffix("\u{2019}s"));
        if let Some(base) = stripped {
            if !base.is_empty() {
                words.push(base);
            }
            i += 1;
            break;
        }

        words.push(token.word);
        i += 1;
        if token.ends_clause {
            break;
        }
    }

    let name = trim_trailing_conjunction(&words.join(" ")).to_string();
    (name, i)
}

/// Scan a message for scope cues.
///
/// A first-person cue short-circuits named-scope scanning, so the result
/// never mixes the two. Named scopes are returned in order of appearance
/// with their original casing.
pub fn parse_scope_cue(message: &str) -> ScopeCueParse {
    let normalized = normalize(message);
    if OWN_BARANGAY_CUES.iter().any(|cue| contains_phrase(&normalized, cue)) {
        return ScopeCueParse {
            has_own_barangay_cue: true,
            requested_scopes: Vec::new(),
        };
    }

    let tokens = tokenize(message);
    let mut requested_scopes = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match marker_at(&tokens, i) {
            Some((scope_type, name_start)) => {
                let (scope_name, next) = capture_name(&tokens, name_start);
                if !scope_name.is_empty() {
                    requested_scopes.push(ScopeCue { scope_type, scope_name });
                }
                i = next.max(i + 1);
            }
            None => i += 1,
        }
    }

    ScopeCueParse {
        has_own_barangay_cue: false,
        requested_scopes,
    }
}

/// Canonical matching key for a scope name.
///
/// Lowercased, punctuation dissolved, leading barangay marker removed.
/// Hosts compare this against the same key computed over their place
/// tables.
pub fn normalize_scope_name(name: &str) -> String {
    let normalized = normalize(name);
    for marker in ["barangay ", "brgy "] {
        if let Some(rest) = normalized.strip_prefix(marker) {
            return rest.to_string();
        }
    }
    normalized
}

/// Why a totals query ended up with its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeReason {
    ExplicitOwnBarangay,
    ExplicitScope,
    DefaultUserScope,
    /// All published AIPs; set by hosts when the message carries a
    /// global-scope cue ("across all barangays"). Never produced by
    /// [`resolve_totals_scope`].
    Global,
    Unknown,
}

/// Scope selected for a totals query, with the reason it was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsScopeDecision {
    pub reason: ScopeReason,
    pub scope: Option<ScopeRef>,
}

/// Pick the scope a totals query should run against.
///
/// Precedence: own-barangay cue (needs a session scope to point at), then
/// an explicitly named scope the host has resolved, then the session
/// default. `Unknown` means the caller must ask for clarification.
pub fn resolve_totals_scope(
    parse: &ScopeCueParse,
    user_scope: Option<&ScopeRef>,
    explicit_scope: Option<&ScopeRef>,
) -> TotalsScopeDecision {
    if parse.has_own_barangay_cue {
        if let Some(own) = user_scope {
            return TotalsScopeDecision {
                reason: ScopeReason::ExplicitOwnBarangay,
                scope: Some(own.clone()),
            };
        }
    }

    if let Some(explicit) = explicit_scope {
        return TotalsScopeDecision {
            reason: ScopeReason::ExplicitScope,
            scope: Some(explicit.clone()),
        };
    }

    if let Some(own) = user_scope {
        return TotalsScopeDecision {
            reason: ScopeReason::DefaultUserScope,
            scope: Some(own.clone()),
        };
    }

    TotalsScopeDecision {
        reason: ScopeReason::Unknown,
        scope: None,
    }
}
