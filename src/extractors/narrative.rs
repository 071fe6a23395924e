// src/extractors/narrative.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// --- Regex Patterns (Lazy Static) ---
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("Failed to compile TAG_RE"));
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-zA-Z]+;|&#\d+;").expect("Failed to compile ENTITY_RE"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE"));

// --- Data Structures ---
/// Which part of the filing a narrative block came from. Serialized with
/// the storage-facing names so output files match the persistence schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionType {
    #[serde(rename = "Business Overview")]
    BusinessOverview,
    #[serde(rename = "MD&A")]
    Mdna,
}

/// A named prose subsection carved out of the filing body.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeBlock {
    pub section_type: SectionType,
    pub title: String,
    pub content: String,
}

/// One carve-out rule: where a subsection starts and where it stops.
/// A missing end boundary means the subsection runs to the end of the
/// document; a late or absent closing heading must not discard the text.
#[derive(Debug, Clone)]
pub struct NarrativeRule {
    pub section_type: SectionType,
    pub title: String,
    pub start: Regex,
    pub end: Regex,
}

impl NarrativeRule {
    fn new(section_type: SectionType, title: &str, start: &str, end: &str) -> Self {
        Self {
            section_type,
            title: title.to_string(),
            start: Regex::new(start).expect("Failed to compile narrative start pattern"),
            end: Regex::new(end).expect("Failed to compile narrative end pattern"),
        }
    }
}

/// The subsection headings observed across DART business reports. Heading
/// numbering drifts between filers, so the stop patterns accept the two
/// most common follow-on headings.
pub fn default_rules() -> Vec<NarrativeRule> {
    vec![
        NarrativeRule::new(
            SectionType::BusinessOverview,
            "사업의 개요",
            r"1\.\s*사업의\s*개요",
            r"2\.\s*주요\s*제품|3\.\s*주요\s*원재료",
        ),
        NarrativeRule::new(
            SectionType::BusinessOverview,
            "업계의 현황",
            r"가\.\s*업계의\s*현황",
            r"나\.\s*회사의\s*현황",
        ),
        NarrativeRule::new(
            SectionType::Mdna,
            "경영진단 및 분석의견",
            r"이사의\s*경영진단\s*및\s*분석의견",
            r"V\.\s*회계감사인",
        ),
    ]
}

/// Removes markup tags and entities and collapses whitespace runs to single
/// spaces.
pub fn clean_text(raw: &str) -> String {
    let no_tags = TAG_RE.replace_all(raw, " ");
    let no_entities = ENTITY_RE.replace_all(&no_tags, " ");
    WHITESPACE_RE.replace_all(&no_entities, " ").trim().to_string()
}

/// Truncates `text` to at most `max_chars` characters, appending "..." when
/// content was cut. Counts characters, not bytes, so multi-byte Hangul
/// never gets split.
fn truncate(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text,
    }
}

/// Applies `rules` in order against the full document text and returns one
/// block per matching rule. Blocks shorter than `min_chars` after cleanup
/// are dropped as false positives (a heading matched but the body lived
/// elsewhere).
pub fn extract_narratives(
    rules: &[NarrativeRule],
    document_text: &str,
    max_chars: usize,
    min_chars: usize,
) -> Vec<NarrativeBlock> {
    let mut blocks = Vec::new();

    for rule in rules {
        let mut matched = false;
        // The heading text also appears in the filing's table of contents,
        // where the next boundary follows within a line or two. Trying each
        // occurrence and skipping captures below the informative minimum
        // lands on the real section body instead of the TOC entry.
        for start_match in rule.start.find_iter(document_text) {
            let body = &document_text[start_match.end()..];
            let raw = match rule.end.find(body) {
                Some(end_match) => &body[..end_match.start()],
                // End boundary absent: take everything to the end of document.
                None => body,
            };

            let content = clean_text(raw);
            if content.chars().count() < min_chars {
                tracing::debug!(
                    title = %rule.title,
                    len = content.len(),
                    "Match below minimum informative length, trying next occurrence"
                );
                continue;
            }

            tracing::debug!(title = %rule.title, bytes = raw.len(), "Extracted narrative block");
            blocks.push(NarrativeBlock {
                section_type: rule.section_type,
                title: rule.title.clone(),
                content: truncate(content, max_chars),
            });
            matched = true;
            break;
        }
        if !matched {
            tracing::debug!(title = %rule.title, "No informative match for narrative rule");
        }
    }
    blocks
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn overview_doc(body: &str, with_end: bool) -> String {
        let tail = if with_end { "2. 주요 제품 target" } else { "" };
        format!("<html><body><p>1. 사업의 개요</p>{}{}</body></html>", body, tail)
    }

    #[test]
    fn extracts_block_between_boundaries() {
        let body = "<p>회사는 반도체와 디스플레이 사업을 영위하고 있으며 글로벌 시장에서 경쟁하고 있습니다.</p>";
        let doc = overview_doc(body, true);
        let blocks = extract_narratives(&default_rules(), &doc, 3000, 10);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].section_type, SectionType::BusinessOverview);
        assert_eq!(blocks[0].title, "사업의 개요");
        assert!(blocks[0].content.contains("반도체와 디스플레이"));
        assert!(!blocks[0].content.contains("주요 제품"));
    }

    #[test]
    fn missing_end_boundary_runs_to_end_of_document() {
        let body = "<p>회사는 반도체와 디스플레이 사업을 영위하고 있으며 글로벌 시장에서 경쟁하고 있습니다.</p>";
        let doc = overview_doc(body, false);
        let blocks = extract_narratives(&default_rules(), &doc, 3000, 10);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].content.contains("경쟁하고 있습니다"));
    }

    #[test]
    fn short_matches_are_dropped_as_false_positives() {
        let doc = overview_doc("<p>짧음</p>", true);
        let blocks = extract_narratives(&default_rules(), &doc, 3000, 50);
        assert!(blocks.is_empty());
    }

    #[test]
    fn clean_text_strips_tags_entities_and_whitespace() {
        let raw = "<p>foo&nbsp;bar</p>\n\n  <b>baz</b>&#160;qux";
        assert_eq!(clean_text(raw), "foo bar baz qux");
    }

    #[test]
    fn truncation_appends_marker_and_respects_char_boundaries() {
        let content = "가".repeat(100);
        let out = truncate(content, 10);
        assert_eq!(out, format!("{}...", "가".repeat(10)));

        let short = truncate("abc".to_string(), 10);
        assert_eq!(short, "abc");
    }

    #[test]
    fn toc_entry_is_skipped_in_favor_of_section_body() {
        let body = "당기 영업이익은 메모리 가격 회복과 환율 효과에 힘입어 전년 동기 대비 큰 폭으로 \
                    증가하였으며, 재무 구조도 안정적으로 유지되고 있습니다.";
        let doc = format!(
            "<p>목 차</p>\
             <p>이사의 경영진단 및 분석의견 ....... 45</p>\
             <p>V. 회계감사인의 감사의견 ....... 52</p>\
             <p>이사의 경영진단 및 분석의견</p><p>{}</p>\
             <p>V. 회계감사인의 감사의견</p>",
            body
        );
        let blocks = extract_narratives(&default_rules(), &doc, 3000, 30);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].content.contains("메모리 가격 회복"));
        assert!(!blocks[0].content.contains("45"));
    }

    #[test]
    fn mdna_rule_matches_management_discussion() {
        let doc = format!(
            "<p>이사의 경영진단 및 분석의견</p><p>{}</p><p>V. 회계감사인의 감사의견</p>",
            "당기 영업이익은 메모리 가격 회복에 힘입어 전년 대비 증가하였습니다. ".repeat(3)
        );
        let blocks = extract_narratives(&default_rules(), &doc, 3000, 10);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].section_type, SectionType::Mdna);
        assert!(!blocks[0].content.contains("회계감사인"));
    }
}
