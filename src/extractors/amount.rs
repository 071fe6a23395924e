// src/extractors/amount.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Constants ---
// DART filings mark negative amounts with a triangle glyph instead of a
// minus sign, e.g. "△1,234" for -1234.
const NEGATIVE_GLYPH: char = '△';

/// Multiplier used when a context declares figures in millions of won.
pub const UNIT_MILLION: i64 = 1_000_000;
/// Multiplier used when a context declares figures in thousands of won.
pub const UNIT_THOUSAND: i64 = 1_000;
/// Multiplier for figures already stated in won.
pub const UNIT_WON: i64 = 1;

// Magnitude heuristic bounds, in won. Filings above ~20T won per segment are
// implausible for the filers this was tuned on; 100T is a hard ceiling.
const THOUSANDS_FALLBACK_CEILING: i64 = 20_000_000_000_000;
const SANITY_CEILING: i64 = 100_000_000_000_000;

// --- Regex Patterns (Lazy Static) ---
static SIGNED_INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+$").expect("Failed to compile SIGNED_INTEGER_RE"));

/// Declared unit surface forms, checked in precedence order. DART tables
/// write the declaration with or without spaces around the colon, or as a
/// bare parenthesised unit next to the table caption.
static MILLION_WON_FORMS: &[&str] = &["단위 : 백만원", "단위: 백만원", "단위:백만원", "(백만원)"];
static THOUSAND_WON_FORMS: &[&str] = &["단위 : 천원", "단위: 천원", "단위:천원", "(천원)"];
static WON_FORMS: &[&str] = &["단위 : 원", "단위: 원", "단위:원", "(원)"];

/// Normalizes a raw numeric token from a filing table cell into a signed
/// integer. Strips comma grouping and maps the triangle negative glyph to an
/// ASCII minus. Returns `None` for anything that is not a whole number
/// (decimals, percentages, blank cells, stray labels).
pub fn normalize(token: &str) -> Option<i64> {
    let cleaned: String = token
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .map(|c| if c == NEGATIVE_GLYPH { '-' } else { c })
        .collect();

    if !SIGNED_INTEGER_RE.is_match(&cleaned) {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

/// Detects the currency-unit multiplier for amounts appearing inside
/// `context_text` (typically the flattened text of the enclosing table or
/// section).
///
/// Precedence: explicit millions declaration, explicit thousands, explicit
/// won, then a magnitude heuristic. The heuristic assumes millions (the
/// overwhelmingly common DART convention) unless scaling `raw_value` by a
/// million would exceed a plausibility ceiling, in which case thousands is
/// assumed instead. Filings frequently declare the unit once near the top of
/// a document and omit it beside the specific table being parsed, so the
/// fallback fires often in practice.
pub fn detect_unit_multiplier(context_text: &str, raw_value: i64) -> i64 {
    if MILLION_WON_FORMS.iter().any(|f| context_text.contains(f)) {
        return UNIT_MILLION;
    }
    if THOUSAND_WON_FORMS.iter().any(|f| context_text.contains(f)) {
        return UNIT_THOUSAND;
    }
    if WON_FORMS.iter().any(|f| context_text.contains(f)) {
        return UNIT_WON;
    }

    // No declaration anywhere in context: guess from magnitude.
    if raw_value.saturating_abs().saturating_mul(UNIT_MILLION) > THOUSANDS_FALLBACK_CEILING {
        tracing::warn!(
            raw_value,
            "No unit declaration found; magnitude suggests thousands rather than millions"
        );
        UNIT_THOUSAND
    } else {
        UNIT_MILLION
    }
}

/// Scales `raw_value` by the multiplier detected from `context_text`,
/// applying a final sanity ceiling: a scaled figure past ~100T won is almost
/// certainly a table already stated in won, so the raw value is returned
/// instead.
pub fn scale_amount(context_text: &str, raw_value: i64) -> i64 {
    let multiplier = detect_unit_multiplier(context_text, raw_value);
    let scaled = raw_value.saturating_mul(multiplier);

    if multiplier > UNIT_WON && scaled.saturating_abs() > SANITY_CEILING {
        tracing::warn!(
            raw_value,
            multiplier,
            "Scaled amount exceeds sanity ceiling; treating value as already in won"
        );
        return raw_value;
    }
    scaled
}
