//! Fiscal-year token extraction.
//!
//! AIP questions carry years as standalone tokens ("FY 2025", "for 2026").
//! Only the 2000–2099 window counts: reference codes ("9000-003") and other
//! 4-digit numbers must never be read as years, so a candidate token must
//! carry the leading "20" and must not be the head of a hyphenated code.

fn is_ascii_alnum(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

/// Yield every fiscal-year token in `text`, in order of appearance.
fn year_tokens(text: &str) -> impl Iterator<Item = i32> + '_ {
    let bytes = text.as_bytes();
    (0..bytes.len().saturating_sub(3)).filter_map(move |i| {
        if bytes[i] != b'2' || bytes[i + 1] != b'0' {
            return None;
        }
        if !bytes[i + 2].is_ascii_digit() || !bytes[i + 3].is_ascii_digit() {
            return None;
        }
        // Token boundaries: "FY2026" and "12026" are not year tokens.
        if i > 0 && is_ascii_alnum(bytes[i - 1]) {
            return None;
        }
        match bytes.get(i + 4) {
            Some(&next) if is_ascii_alnum(next) => return None,
            // Head of a hyphenated reference code ("2026-001"), not a year.
            Some(&b'-') if bytes.get(i + 5).is_some_and(|b| is_ascii_alnum(*b)) => return None,
            _ => {}
        }
        let digits = std::str::from_utf8(&bytes[i..i + 4]).ok()?;
        digits.parse::<i32>().ok()
    })
}

/// Extract the first fiscal-year token (2000–2099) from free text.
///
/// Returns `None` when the text carries no year token.
pub fn extract_fiscal_year(text: &str) -> Option<i32> {
    year_tokens(text).next()
}

/// Extract the first two distinct fiscal-year tokens, in order of
/// appearance. Used by compare-years queries ("Compare 2025 vs 2026").
pub fn extract_fiscal_year_pair(text: &str) -> Option<(i32, i32)> {
    let mut tokens = year_tokens(text);
    let first = tokens.next()?;
    let second = tokens.find(|&y| y != first)?;
    Some((first, second))
}
