// src/extractors/rnd.rs

// --- Imports ---
use crate::extractors::amount;
use crate::extractors::table;

/// Keywords identifying the R&D expense table and its total row.
/// `total_keyword` matches by containment, so "계" also covers "합계" and
/// "총계".
#[derive(Debug, Clone)]
pub struct RndRules {
    pub rnd_keyword: String,
    pub total_keyword: String,
}

impl Default for RndRules {
    fn default() -> Self {
        Self {
            rnd_keyword: "연구개발비".to_string(),
            total_keyword: "계".to_string(),
        }
    }
}

/// Scans the whole document for the aggregate R&D expense figure, in won.
///
/// Every table whose text mentions the R&D keyword is a candidate; within
/// each, the first row whose leading cell carries both the R&D keyword and
/// a total keyword supplies the figure, taken from the first cell after it
/// that normalizes to an integer. The first hit in document order wins;
/// disagreeing figures in later tables are not reconciled. `None` when no
/// table qualifies.
pub fn extract_rnd(rules: &RndRules, document_text: &str) -> Option<i64> {
    for table in table::parse_tables(document_text) {
        if !table.flat_text.contains(&rules.rnd_keyword) {
            continue;
        }
        for row in &table.rows {
            let Some(first) = row.first() else { continue };
            if !(first.contains(&rules.rnd_keyword) && first.contains(&rules.total_keyword)) {
                continue;
            }
            for cell in &row[1..] {
                if let Some(raw) = amount::normalize(cell) {
                    let value = amount::scale_amount(&table.flat_text, raw);
                    tracing::debug!(raw, value, "Extracted R&D expense figure");
                    return Some(value);
                }
            }
        }
    }
    tracing::debug!("No R&D expense table found");
    None
}
