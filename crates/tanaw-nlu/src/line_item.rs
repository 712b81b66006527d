//! Line-item question heuristics.
//!
//! Recognizes when a budget-sounding message is really about one specific
//! row: a reference code, a quoted project title, or a named fact field
//! (amount, schedule, fund source, implementing agency, expected output).
//! Also carries the candidate reranking and the clarification decision used
//! after vector retrieval returns near-ties.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tanaw_core::text::{normalize, normalize_light};

/// AIP reference code as printed in the source documents.
static STRICT_REF_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{3}-\d{3}-\d{3}\b").unwrap());

/// Looser hyphenated code ("8000-003", "1000-A"). A bare year never
/// matches: the hyphenated tail is required.
static LOOSE_REF_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-[0-9a-z][0-9a-z-]*\b").unwrap());

/// Double-quoted (straight or curly) phrase of at least three characters.
static QUOTED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\"[^\"]{3,}\"|\u{201c}[^\u{201c}\u{201d}]{3,}\u{201d}").unwrap());

static YEAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^20\d{2}$").unwrap());

/// Word directly before a singular "project" ("the Road Concreting
/// PROJECT"). Plural "projects" never matches.
static WORD_BEFORE_PROJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-z0-9]+) project\b").unwrap());

/// Determiners and generic qualifiers that do not name a project.
const NON_TITLE_WORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "your", "our", "my", "any", "each", "every", "which",
    "what", "whose", "one", "new", "proposed", "said", "barangay", "city", "municipality",
];

/// Tokens too generic to identify a line item.
const NOISE_TERMS: &[&str] = &[
    "what", "which", "where", "when", "how", "much", "allocated", "allocation", "for", "the",
    "and", "from", "in", "on", "of", "to", "is", "are", "fy", "year", "fiscal", "program",
    "project", "total", "schedule", "fund", "source", "agency", "implementing", "output",
    "barangay", "all", "published", "aips",
];

const GLOBAL_SCOPE_CUES: &[&str] = &[
    "all barangays",
    "across all barangays",
    "all published aips",
    "city wide",
    "citywide",
];

const MAX_KEY_TOKENS_BONUS: f64 = 0.12;
const TOKEN_OVERLAP_WEIGHT: f64 = 0.02;
const REF_CODE_BONUS: f64 = 0.25;
const YEAR_MATCH_BONUS: f64 = 0.05;
const CLARIFICATION_DISTANCE_GAP: f64 = 0.05;

/// Line-item fact a question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactField {
    Amount,
    Schedule,
    FundSource,
    ImplementingAgency,
    ExpectedOutput,
}

impl FactField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Schedule => "schedule",
            Self::FundSource => "fund_source",
            Self::ImplementingAgency => "implementing_agency",
            Self::ExpectedOutput => "expected_output",
        }
    }
}

/// Field class the published AIP structurally does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocLimitField {
    Contractor,
    Supplier,
    ProcurementMode,
    ExactAddress,
    BeneficiaryCount,
}

impl DocLimitField {
    /// Human label used inside document-limitation refusals.
    pub fn document_label(&self) -> &'static str {
        match self {
            Self::Contractor | Self::Supplier => "contractors, suppliers, or winning bidders",
            Self::ProcurementMode => "procurement mode",
            Self::ExactAddress => "the exact site address",
            Self::BeneficiaryCount => "beneficiary counts",
        }
    }
}

/// Structured reading of a possible line-item question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLineItemQuestion {
    pub normalized_question: String,
    pub fact_fields: Vec<FactField>,
    pub is_fact_question: bool,
    pub doc_limit_field: Option<DocLimitField>,
    pub has_global_scope_cue: bool,
    /// Uppercased, as reference codes are printed in the AIP.
    pub mentioned_ref_code: Option<String>,
    pub key_tokens: Vec<String>,
    pub title_phrase: Option<String>,
}

/// One retrieval candidate, as handed back by the host's vector search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemCandidate {
    pub line_item_id: String,
    pub aip_ref_code: Option<String>,
    pub title: String,
    pub fiscal_year: Option<i32>,
    pub distance: Option<f64>,
    pub score: Option<f64>,
}

/// Candidate with rerank features applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate: LineItemCandidate,
    pub rerank_score: f64,
    pub token_overlap: usize,
    pub ref_code_match: bool,
    pub year_match: bool,
    pub title_phrase_match: bool,
}

fn detect_fact_fields(q: &str) -> Vec<FactField> {
    let mut fields = Vec::new();

    let amount = ["how much", "amount", "allocated", "allocation", "budget", "cost"];
    if amount.iter().any(|cue| q.contains(cue)) {
        fields.push(FactField::Amount);
    }

    let schedule = ["schedule", "timeline", "start", "end date", "target completion", "when"];
    if schedule.iter().any(|cue| q.contains(cue)) {
        fields.push(FactField::Schedule);
    }

    let fund = ["fund source", "funding source", "source of funds", "funded by"];
    if fund.iter().any(|cue| q.contains(cue)) {
        fields.push(FactField::FundSource);
    }

    let agency = [
        "implementing agency",
        "implementing office",
        "implemented by",
        "who will implement",
    ];
    if agency.iter().any(|cue| q.contains(cue)) {
        fields.push(FactField::ImplementingAgency);
    }

    let output = ["expected output", "target output", "deliverable", "output"];
    if output.iter().any(|cue| q.contains(cue)) {
        fields.push(FactField::ExpectedOutput);
    }

    fields
}

fn detect_doc_limit_field(q: &str) -> Option<DocLimitField> {
    if q.contains("contractor") {
        Some(DocLimitField::Contractor)
    } else if q.contains("supplier") || q.contains("winning bidder") {
        Some(DocLimitField::Supplier)
    } else if q.contains("procurement") {
        Some(DocLimitField::ProcurementMode)
    } else if q.contains("site address") || q.contains("exact address") {
        Some(DocLimitField::ExactAddress)
    } else if q.contains("beneficiary count") || q.contains("beneficiaries") {
        Some(DocLimitField::BeneficiaryCount)
    } else {
        None
    }
}

fn collect_key_tokens(canonical: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in canonical.split(' ') {
        if token.len() < 3 || NOISE_TERMS.contains(&token) || YEAR_TOKEN.is_match(token) {
            continue;
        }
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

fn mentioned_ref_code(q: &str) -> Option<String> {
    STRICT_REF_CODE
        .find(q)
        .or_else(|| LOOSE_REF_CODE.find(q))
        .map(|m| m.as_str().to_uppercase())
}

/// Parse a message into its line-item reading.
pub fn parse_line_item_question(message: &str) -> ParsedLineItemQuestion {
    let normalized_question = normalize_light(message);
    let canonical = normalize(message);

    let fact_fields = detect_fact_fields(&normalized_question);
    let key_tokens = collect_key_tokens(&canonical);
    let title_phrase = match key_tokens.len() {
        0 | 1 => None,
        _ => {
            let phrase = key_tokens.join(" ");
            (phrase.len() >= 6).then_some(phrase)
        }
    };

    ParsedLineItemQuestion {
        is_fact_question: !fact_fields.is_empty(),
        fact_fields,
        doc_limit_field: detect_doc_limit_field(&normalized_question),
        has_global_scope_cue: GLOBAL_SCOPE_CUES
            .iter()
            .any(|cue| canonical.contains(cue)),
        mentioned_ref_code: mentioned_ref_code(&normalized_question),
        key_tokens,
        title_phrase,
        normalized_question,
    }
}

/// "<Title> project" with a real title word in front names one row.
fn names_specific_project(canonical: &str) -> bool {
    WORD_BEFORE_PROJECT
        .captures_iter(canonical)
        .any(|caps| !NON_TITLE_WORDS.contains(&&caps[1]))
}

/// Does the message target one specific row rather than an aggregate?
///
/// True on a reference code (strict or loose), a quoted project title, or
/// a "<title> project" phrase.
pub fn is_line_item_specific_query(message: &str) -> bool {
    let q = normalize_light(message);
    STRICT_REF_CODE.is_match(&q)
        || LOOSE_REF_CODE.is_match(&q)
        || QUOTED_TITLE.is_match(message)
        || names_specific_project(&normalize(message))
}

fn normalize_ref_code(code: &str) -> String {
    code.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

fn normalize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_space = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() || ch == '-' {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

fn base_score(candidate: &LineItemCandidate) -> f64 {
    if let Some(score) = candidate.score.filter(|s| s.is_finite()) {
        return score;
    }
    if let Some(distance) = candidate.distance.filter(|d| d.is_finite()) {
        return 1.0 / (1.0 + distance);
    }
    0.0
}

/// Rerank vector-search candidates with lexical features.
///
/// Base similarity plus a capped token-overlap bonus, a reference-code
/// bonus, and a fiscal-year bonus; ties broken by ascending distance.
pub fn rerank_candidates(
    question: &ParsedLineItemQuestion,
    candidates: &[LineItemCandidate],
    requested_year: Option<i32>,
) -> Vec<RankedCandidate> {
    let question_ref = question
        .mentioned_ref_code
        .as_deref()
        .map(normalize_ref_code);

    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|candidate| {
            let title = normalize_title(&candidate.title);
            let token_overlap = question
                .key_tokens
                .iter()
                .filter(|token| title.contains(token.as_str()))
                .count();

            let ref_code_match = match (&question_ref, &candidate.aip_ref_code) {
                (Some(q), Some(c)) => normalize_ref_code(c) == *q,
                _ => false,
            };
            let year_match = matches!(
                (requested_year, candidate.fiscal_year),
                (Some(requested), Some(actual)) if requested == actual
            );
            let title_phrase_match = question
                .title_phrase
                .as_deref()
                .is_some_and(|phrase| title.contains(phrase));

            let mut rerank_score = base_score(candidate);
            rerank_score += (token_overlap as f64 * TOKEN_OVERLAP_WEIGHT).min(MAX_KEY_TOKENS_BONUS);
            if ref_code_match {
                rerank_score += REF_CODE_BONUS;
            }
            if year_match {
                rerank_score += YEAR_MATCH_BONUS;
            }

            RankedCandidate {
                candidate: candidate.clone(),
                rerank_score,
                token_overlap,
                ref_code_match,
                year_match,
                title_phrase_match,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.rerank_score
            .partial_cmp(&a.rerank_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let ad = a.candidate.distance.unwrap_or(f64::INFINITY);
                let bd = b.candidate.distance.unwrap_or(f64::INFINITY);
                ad.partial_cmp(&bd).unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    ranked
}

fn has_strong_disambiguator(question: &ParsedLineItemQuestion, top: &RankedCandidate) -> bool {
    if top.ref_code_match {
        return true;
    }
    if question.title_phrase.is_some() && top.title_phrase_match {
        return true;
    }
    let question_text = normalize_title(&question.normalized_question);
    let top_title = normalize_title(&top.candidate.title);
    !question_text.is_empty() && !top_title.is_empty() && question_text.contains(&top_title)
}

/// Should the caller ask the user to pick between near-tied candidates?
///
/// Only when there are at least two distinct-titled candidates, the top one
/// carries no strong disambiguator, and the top-two distances are within
/// `CLARIFICATION_DISTANCE_GAP` of each other.
pub fn should_ask_clarification(
    question: &ParsedLineItemQuestion,
    ranked: &[RankedCandidate],
) -> bool {
    let [top1, top2, ..] = ranked else {
        return false;
    };

    if has_strong_disambiguator(question, top1) {
        return false;
    }

    let title1 = normalize_title(&top1.candidate.title);
    let title2 = normalize_title(&top2.candidate.title);
    if title1.is_empty() || title2.is_empty() || title1 == title2 {
        return false;
    }

    match (top1.candidate.distance, top2.candidate.distance) {
        (Some(d1), Some(d2)) => (d2 - d1).abs() <= CLARIFICATION_DISTANCE_GAP,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, title: &str, ref_code: Option<&str>, distance: f64) -> LineItemCandidate {
        LineItemCandidate {
            line_item_id: id.into(),
            aip_ref_code: ref_code.map(str::to_string),
            title: title.into(),
            fiscal_year: Some(2026),
            distance: Some(distance),
            score: None,
        }
    }

    #[test]
    fn strict_ref_code_is_line_item_specific() {
        assert!(is_line_item_specific_query("budget for 8000-003-002-006"));
    }

    #[test]
    fn loose_ref_code_is_line_item_specific() {
        assert!(is_line_item_specific_query("how much is Ref 8000-003?"));
        assert!(is_line_item_specific_query("item 1000-A amount"));
    }

    #[test]
    fn quoted_title_is_line_item_specific() {
        assert!(is_line_item_specific_query("budget of \"Road Concreting Phase 2\""));
        assert!(is_line_item_specific_query(
            "budget of \u{201c}Road Concreting\u{201d} please"
        ));
    }

    #[test]
    fn bare_year_is_not_a_ref_code() {
        assert!(!is_line_item_specific_query("budget for FY 2026"));
        assert!(!is_line_item_specific_query("total budget 2025"));
    }

    #[test]
    fn plain_budget_question_is_not_line_item_specific() {
        assert!(!is_line_item_specific_query("What is the budget of barangay Mamatid?"));
    }

    #[test]
    fn named_project_phrase_is_line_item_specific() {
        assert!(is_line_item_specific_query("budget for the Road Concreting project"));
        assert!(is_line_item_specific_query("How much is the feeding project?"));
    }

    #[test]
    fn generic_project_mentions_are_not_specific() {
        assert!(!is_line_item_specific_query("what is the project about?"));
        assert!(!is_line_item_specific_query("Top 3 projects in FY 2026"));
        assert!(!is_line_item_specific_query("how many projects are planned"));
    }

    #[test]
    fn parses_ref_code_uppercased() {
        let parsed = parse_line_item_question("How much is ref 8000-003-002-006?");
        assert_eq!(parsed.mentioned_ref_code.as_deref(), Some("8000-003-002-006"));

        let parsed = parse_line_item_question("how much is 1000-a?");
        assert_eq!(parsed.mentioned_ref_code.as_deref(), Some("1000-A"));
    }

    #[test]
    fn detects_fact_fields() {
        let parsed = parse_line_item_question("How much is allocated and when does it start?");
        assert!(parsed.is_fact_question);
        assert!(parsed.fact_fields.contains(&FactField::Amount));
        assert!(parsed.fact_fields.contains(&FactField::Schedule));

        let parsed = parse_line_item_question("Who will implement the feeding program?");
        assert_eq!(parsed.fact_fields, vec![FactField::ImplementingAgency]);
    }

    #[test]
    fn detects_doc_limit_fields() {
        let cases = [
            ("Who is the contractor for the road project?", DocLimitField::Contractor),
            ("Which supplier won?", DocLimitField::Supplier),
            ("What procurement mode was used?", DocLimitField::ProcurementMode),
            ("What is the exact address of the site?", DocLimitField::ExactAddress),
            ("How many beneficiaries are there?", DocLimitField::BeneficiaryCount),
        ];
        for (message, expected) in cases {
            assert_eq!(
                parse_line_item_question(message).doc_limit_field,
                Some(expected),
                "message: {message}"
            );
        }
        assert_eq!(
            parse_line_item_question("What is the budget?").doc_limit_field,
            None
        );
    }

    #[test]
    fn detects_global_scope_cue() {
        assert!(parse_line_item_question("totals across all barangays").has_global_scope_cue);
        assert!(parse_line_item_question("city-wide feeding program").has_global_scope_cue);
        assert!(!parse_line_item_question("budget of barangay Pulo").has_global_scope_cue);
    }

    #[test]
    fn key_tokens_skip_noise_and_years() {
        let parsed = parse_line_item_question("What is the budget for the Road Concreting project in FY 2026?");
        assert_eq!(parsed.key_tokens, vec!["budget", "road", "concreting"]);
    }

    #[test]
    fn key_tokens_dedupe_in_order() {
        let parsed = parse_line_item_question("drainage drainage improvement drainage");
        assert_eq!(parsed.key_tokens, vec!["drainage", "improvement"]);
    }

    #[test]
    fn title_phrase_requires_two_tokens() {
        assert_eq!(
            parse_line_item_question("road concreting allocation").title_phrase.as_deref(),
            Some("road concreting")
        );
        assert_eq!(parse_line_item_question("drainage").title_phrase, None);
    }

    // ── Reranking ──

    #[test]
    fn ref_code_match_outranks_closer_distance() {
        let question = parse_line_item_question("How much is Ref 8000-003-002-006?");
        let candidates = vec![
            candidate("a", "Streetlight Upgrade", Some("9000-001-000-001"), 0.10),
            candidate("b", "Road Concreting", Some("8000-003-002-006"), 0.30),
        ];
        let ranked = rerank_candidates(&question, &candidates, None);
        assert_eq!(ranked[0].candidate.line_item_id, "b");
        assert!(ranked[0].ref_code_match);
    }

    #[test]
    fn token_overlap_bonus_is_capped() {
        let question = parse_line_item_question(
            "drainage improvement desilting culvert repair expansion works package",
        );
        assert!(question.key_tokens.len() > 6);
        let candidates = vec![candidate(
            "a",
            "Drainage improvement desilting culvert repair expansion works package",
            None,
            0.0,
        )];
        let ranked = rerank_candidates(&question, &candidates, None);
        // Base 1/(1+0) = 1.0 plus at most the capped overlap bonus.
        assert!(ranked[0].rerank_score <= 1.0 + MAX_KEY_TOKENS_BONUS + 1e-9);
    }

    #[test]
    fn year_match_adds_bonus() {
        let question = parse_line_item_question("feeding program budget FY 2026");
        let candidates = vec![candidate("a", "Feeding Program", None, 0.2)];
        let with_year = rerank_candidates(&question, &candidates, Some(2026));
        let without_year = rerank_candidates(&question, &candidates, None);
        let delta = with_year[0].rerank_score - without_year[0].rerank_score;
        assert!((delta - YEAR_MATCH_BONUS).abs() < 1e-9);
    }

    #[test]
    fn explicit_score_beats_derived_distance_score() {
        let question = parse_line_item_question("health outreach");
        let mut a = candidate("a", "Unrelated", None, 0.5);
        a.score = Some(0.9);
        let b = candidate("b", "Unrelated Too", None, 0.5);
        let ranked = rerank_candidates(&question, &[a, b], None);
        assert_eq!(ranked[0].candidate.line_item_id, "a");
    }

    // ── Clarification decision ──

    #[test]
    fn near_tie_with_distinct_titles_asks_clarification() {
        let question = parse_line_item_question("how much for the multi-purpose hall?");
        let candidates = vec![
            candidate("a", "Multi-Purpose Hall Phase 1", None, 0.20),
            candidate("b", "Multi-Purpose Hall Phase 2", None, 0.23),
        ];
        let ranked = rerank_candidates(&question, &candidates, None);
        assert!(should_ask_clarification(&question, &ranked));
    }

    #[test]
    fn ref_code_match_suppresses_clarification() {
        let question = parse_line_item_question("how much is 8000-003-002-006?");
        let candidates = vec![
            candidate("a", "Multi-Purpose Hall Phase 1", Some("8000-003-002-006"), 0.20),
            candidate("b", "Multi-Purpose Hall Phase 2", None, 0.21),
        ];
        let ranked = rerank_candidates(&question, &candidates, None);
        assert_eq!(ranked[0].candidate.line_item_id, "a");
        assert!(!should_ask_clarification(&question, &ranked));
    }

    #[test]
    fn wide_distance_gap_suppresses_clarification() {
        let question = parse_line_item_question("how much for the hall again?");
        let candidates = vec![
            candidate("a", "Multi-Purpose Hall", None, 0.10),
            candidate("b", "Covered Court", None, 0.40),
        ];
        let ranked = rerank_candidates(&question, &candidates, None);
        assert!(!should_ask_clarification(&question, &ranked));
    }

    #[test]
    fn single_candidate_never_asks() {
        let question = parse_line_item_question("how much for the hall?");
        let candidates = vec![candidate("a", "Multi-Purpose Hall", None, 0.10)];
        let ranked = rerank_candidates(&question, &candidates, None);
        assert!(!should_ask_clarification(&question, &ranked));
    }

    #[test]
    fn identical_titles_never_ask() {
        let question = parse_line_item_question("how much for the hall?");
        let candidates = vec![
            candidate("a", "Multi-Purpose Hall", None, 0.10),
            candidate("b", "Multi-Purpose Hall", None, 0.11),
        ];
        let ranked = rerank_candidates(&question, &candidates, None);
        assert!(!should_ask_clarification(&question, &ranked));
    }
}
