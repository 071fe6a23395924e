// src/extractors/mod.rs
pub mod amount;
pub mod narrative;
pub mod rnd;
pub mod section;
pub mod segment;
pub mod table;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use narrative::{NarrativeBlock, NarrativeRule, SectionType};
#[allow(unused_imports)]
pub use rnd::RndRules;
#[allow(unused_imports)]
pub use segment::{DivisionRecord, SegmentRules};
#[allow(unused_imports)]
pub use table::ParsedTable;

use serde::Serialize;

use crate::utils::error::ExtractError;

/// Everything the engine knows about one filer's layout conventions.
/// Defaults match the DART business-report layout this was tuned on;
/// every marker, keyword and threshold is plain data so a differently
/// formatted filer can be handled by building a different config. The
/// engine itself carries no state between calls.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Marker opening the business-overview chapter.
    pub business_start_marker: String,
    /// Marker opening the chapter after it (exclusive end).
    pub business_end_marker: String,
    /// Heading of the sales subsection inside the business chapter.
    pub sales_marker: String,
    /// Keywords that must all appear in the segment table's text.
    pub segment_table_keywords: Vec<String>,
    pub segment_rules: SegmentRules,
    pub rnd_rules: RndRules,
    pub narrative_rules: Vec<NarrativeRule>,
    /// Narrative content cap, in characters.
    pub narrative_max_chars: usize,
    /// Minimum informative narrative length, in characters.
    pub narrative_min_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            business_start_marker: "II. 사업의 내용".to_string(),
            business_end_marker: "III. 재무에 관한 사항".to_string(),
            sales_marker: "매출 및 수주상황".to_string(),
            segment_table_keywords: vec![
                "부문".to_string(),
                "매출액".to_string(),
                "비중".to_string(),
            ],
            segment_rules: SegmentRules::default(),
            rnd_rules: RndRules::default(),
            narrative_rules: narrative::default_rules(),
            narrative_max_chars: 3000,
            narrative_min_chars: 50,
        }
    }
}

/// The structured facts pulled out of one filing. All collections may be
/// empty: filings are inconsistently formatted and extraction is
/// best-effort. Persistence and deduplication belong to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FilingFacts {
    pub segments: Vec<DivisionRecord>,
    pub rnd_expense: Option<i64>,
    pub narratives: Vec<NarrativeBlock>,
}

// --- Main Extractor Structure ---
pub struct FilingExtractor {
    config: ExtractorConfig,
}

impl Default for FilingExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl FilingExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Runs the full extraction over one filing body.
    ///
    /// The only raising condition is an empty document; a missing section,
    /// table or figure degrades to an empty/absent field so one malformed
    /// filing never takes down a caller's batch. The three branches are
    /// independent: a failed section narrowing skips segment extraction
    /// but the R&D and narrative scans still run over the full document.
    pub fn extract(&self, document_text: &str, period: &str) -> Result<FilingFacts, ExtractError> {
        if document_text.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        tracing::info!(
            period,
            bytes = document_text.len(),
            "Starting filing extraction"
        );

        let segments = self.extract_segments(document_text, period);
        let rnd_expense = rnd::extract_rnd(&self.config.rnd_rules, document_text);
        let narratives = narrative::extract_narratives(
            &self.config.narrative_rules,
            document_text,
            self.config.narrative_max_chars,
            self.config.narrative_min_chars,
        );

        tracing::info!(
            segments = segments.len(),
            narratives = narratives.len(),
            rnd_found = rnd_expense.is_some(),
            "Filing extraction complete"
        );
        Ok(FilingFacts {
            segments,
            rnd_expense,
            narratives,
        })
    }

    fn extract_segments(&self, document_text: &str, period: &str) -> Vec<DivisionRecord> {
        let Some(business) = section::locate(
            document_text,
            &self.config.business_start_marker,
            &self.config.business_end_marker,
        ) else {
            tracing::warn!("Business chapter markers not found, skipping segment extraction");
            return Vec::new();
        };

        // The sales subsection has no closing marker of its own; it runs to
        // the end of the business chapter. When its heading is missing the
        // whole chapter is scanned instead.
        let scope = match business.find(&self.config.sales_marker) {
            Some(idx) => &business[idx..],
            None => {
                tracing::debug!("Sales heading not found, scanning whole business chapter");
                business
            }
        };

        let Some(table) = table::find_table(scope, &self.config.segment_table_keywords) else {
            tracing::warn!("No segment table matched {:?}", self.config.segment_table_keywords);
            return Vec::new();
        };

        // Unit declarations often sit beside the table rather than inside
        // it, so the whole narrowed scope serves as unit context.
        segment::classify_table(&self.config.segment_rules, &table, scope, period)
    }
}
