//! Text canonicalization for keyword and cue matching.
//!
//! Every classifier in the chat-query layer matches against the same
//! canonical form: lowercased, punctuation replaced by spaces, whitespace
//! runs collapsed. Matching "Grand Total!" and "grand   total" must be
//! indistinguishable downstream.

/// Canonicalize free text for cue matching.
///
/// Lowercases, replaces every non-alphanumeric character with a space,
/// collapses whitespace runs to a single space, and trims. Total (never
/// fails) and idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
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

/// Lowercase and collapse whitespace, keeping punctuation.
///
/// Reference codes ("8000-003-002-006") and quoted titles survive this
/// form; `normalize` would dissolve them.
pub fn normalize_light(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for part in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(part.chars().flat_map(|c| c.to_lowercase()));
    }
    out
}

/// Whole-word phrase containment over canonicalized text.
///
/// `contains_phrase("what is the grand total", "grand total")` is true;
/// `contains_phrase("budgetary", "budget")` is false. Both arguments are
/// expected to already be in `normalize` form.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(phrase) {
        let start = from + pos;
        let end = start + phrase.len();
        let left_ok = start == 0 || haystack.as_bytes()[start - 1] == b' ';
        let right_ok = end == haystack.len() || haystack.as_bytes()[end] == b' ';
        if left_ok && right_ok {
            return true;
        }
        from = start + 1;
    }
    false
}

/// Strip one trailing conjunction ("and", Filipino "at") and any trailing
/// punctuation from a captured scope name.
///
/// "San Isidro and" → "San Isidro"; "Maligaya." → "Maligaya".
pub fn trim_trailing_conjunction(name: &str) -> &str {
    let trimmed = name.trim().trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
    let lowered = trimmed.to_lowercase();
    for conj in [" and", " at"] {
        if lowered.ends_with(conj) {
            return trimmed[..trimmed.len() - conj.len()].trim_end();
        }
    }
    trimmed.trim_end()
}
