// src/extractors/segment.rs

// --- Imports ---
use serde::{Deserialize, Serialize};

use crate::extractors::amount;
use crate::extractors::table::ParsedTable;

// --- Data Structures ---
/// One business division's figures for one reporting period. `None` means
/// the filing's table had no parseable value for that metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionRecord {
    pub division: String,
    pub period: String,
    pub revenue: Option<i64>,
    pub operating_profit: Option<i64>,
}

impl DivisionRecord {
    /// A record is worth keeping only when at least one metric is a known
    /// non-zero value; all-zero or all-unknown rows are table noise.
    fn has_usable_data(&self) -> bool {
        self.revenue.map_or(false, |v| v != 0) || self.operating_profit.map_or(false, |v| v != 0)
    }
}

/// Layout policy for the segment table. The cell-count thresholds encode
/// the observed DART layout where a division label is either repeated on
/// every metric row (8 cells) or merged across rows (7 cells). Filer
/// layouts vary, so the thresholds and keywords are plain data rather than
/// hard-coded invariants.
#[derive(Debug, Clone)]
pub struct SegmentRules {
    /// Metric-label substring marking a revenue row.
    pub revenue_keyword: String,
    /// Metric-label substring marking an operating-profit row.
    pub operating_profit_keyword: String,
    /// First-cell values identifying a header row to skip.
    pub header_tokens: Vec<String>,
    /// Minimum cell count for a row that carries its own division label.
    pub labeled_row_min_cells: usize,
    /// Minimum cell count for a row that inherits the preceding division.
    pub carryover_row_min_cells: usize,
}

impl Default for SegmentRules {
    fn default() -> Self {
        Self {
            revenue_keyword: "매출액".to_string(),
            operating_profit_keyword: "영업이익".to_string(),
            header_tokens: vec!["부문".to_string(), "매출액".to_string()],
            labeled_row_min_cells: 8,
            carryover_row_min_cells: 7,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Metric {
    Revenue,
    OperatingProfit,
}

/// A row reduced to the three facts the classifier cares about. `division`
/// is `None` when the row relies on carry-over from a preceding row.
struct RowShape<'a> {
    division: Option<&'a str>,
    metric_label: &'a str,
    amount_token: &'a str,
}

/// Row-layout strategy: given the row's non-leading-blank cells, decide
/// whether this layout applies and where the fields sit. Strategies are
/// tried in declaration order; the first that applies wins.
type LayoutStrategy = for<'a> fn(&SegmentRules, &'a [&'a str]) -> Option<RowShape<'a>>;

/// Row repeats its own division label: label, metric, amount, rest.
fn labeled_row<'a>(rules: &SegmentRules, cells: &'a [&'a str]) -> Option<RowShape<'a>> {
    if cells.len() >= rules.labeled_row_min_cells && !cells[0].is_empty() {
        Some(RowShape {
            division: Some(cells[0]),
            metric_label: cells[1],
            amount_token: cells[2],
        })
    } else {
        None
    }
}

/// Division cell merged away (rowspan carry-over): metric, amount, rest.
fn carryover_row<'a>(rules: &SegmentRules, cells: &'a [&'a str]) -> Option<RowShape<'a>> {
    if cells.len() >= rules.carryover_row_min_cells {
        Some(RowShape {
            division: None,
            metric_label: cells[0],
            amount_token: cells[1],
        })
    } else {
        None
    }
}

const LAYOUT_STRATEGIES: &[LayoutStrategy] = &[labeled_row, carryover_row];

/// The amount-column header token doubles as the revenue metric keyword, so
/// first-cell equality alone would also swallow carry-over revenue rows.
/// A header row carries labels only; any normalizable amount in the row
/// marks it as data.
fn is_header_row(rules: &SegmentRules, cells: &[&str]) -> bool {
    rules.header_tokens.iter().any(|t| t == cells[0])
        && !cells.iter().any(|c| amount::normalize(c).is_some())
}

fn classify_metric(rules: &SegmentRules, label: &str) -> Option<Metric> {
    if label.contains(&rules.revenue_keyword) {
        Some(Metric::Revenue)
    } else if label.contains(&rules.operating_profit_keyword) {
        Some(Metric::OperatingProfit)
    } else {
        None
    }
}

fn record_for<'a>(
    records: &'a mut Vec<DivisionRecord>,
    division: &str,
    period: &str,
) -> &'a mut DivisionRecord {
    if let Some(pos) = records.iter().position(|r| r.division == division) {
        return &mut records[pos];
    }
    records.push(DivisionRecord {
        division: division.to_string(),
        period: period.to_string(),
        revenue: None,
        operating_profit: None,
    });
    records.last_mut().expect("just pushed")
}

/// Walks the segment table's rows and assembles one `DivisionRecord` per
/// division. `unit_context` is the surrounding text used for currency-unit
/// detection (the table's own text plus the section around it).
///
/// Division carry-over state lives only within this call, so it can never
/// leak across tables. Rows that fit no layout, carry an unknown metric
/// label, or hold an unparseable amount are skipped without aborting the
/// scan. Merging is last-write-wins per (division, metric).
pub fn classify_table(
    rules: &SegmentRules,
    table: &ParsedTable,
    unit_context: &str,
    period: &str,
) -> Vec<DivisionRecord> {
    let mut records: Vec<DivisionRecord> = Vec::new();
    let mut current_division: Option<String> = None;

    for row in &table.rows {
        // A merged division cell sometimes renders as a blank leading cell
        // instead of being absent; drop leading blanks so both forms hit
        // the carry-over strategy.
        let cells: Vec<&str> = row
            .iter()
            .map(String::as_str)
            .skip_while(|c| c.is_empty())
            .collect();
        if cells.is_empty() {
            continue;
        }
        if is_header_row(rules, &cells) {
            tracing::trace!(first_cell = cells[0], "Skipping header row");
            continue;
        }

        let Some(shape) = LAYOUT_STRATEGIES.iter().find_map(|s| s(rules, &cells)) else {
            tracing::trace!(cell_count = cells.len(), "Row fits no known layout, skipping");
            continue;
        };

        if let Some(div) = shape.division {
            current_division = Some(div.to_string());
        }
        let Some(division) = current_division.as_deref() else {
            // Carry-over row before any labeled row: nothing to attach to.
            tracing::debug!("Carry-over row with no preceding division label, skipping");
            continue;
        };

        let Some(metric) = classify_metric(rules, shape.metric_label) else {
            // Cost-of-sales and other metrics are intentionally ignored.
            continue;
        };
        let Some(raw) = amount::normalize(shape.amount_token) else {
            tracing::debug!(token = shape.amount_token, "Unparseable amount, skipping row");
            continue;
        };
        let value = amount::scale_amount(unit_context, raw);

        let record = record_for(&mut records, division, period);
        match metric {
            Metric::Revenue => record.revenue = Some(value),
            Metric::OperatingProfit => record.operating_profit = Some(value),
        }
    }

    let before = records.len();
    records.retain(DivisionRecord::has_usable_data);
    if records.len() < before {
        tracing::debug!("Dropped {} divisions with no usable data", before - records.len());
    }
    records
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> ParsedTable {
        ParsedTable {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
            flat_text: rows.iter().flat_map(|r| r.iter()).cloned().collect(),
        }
    }

    // Eight-cell labeled rows / seven-cell carry-over rows, the default
    // DART segment table shape.
    fn labeled(div: &'static str, metric: &'static str, amt: &'static str) -> Vec<&'static str> {
        vec![div, metric, amt, "-", "-", "-", "-", "-"]
    }
    fn carried(metric: &'static str, amt: &'static str) -> Vec<&'static str> {
        vec![metric, amt, "-", "-", "-", "-", "-"]
    }

    #[test]
    fn labeled_row_yields_division_record_with_scaled_revenue() {
        let t = table(&[&labeled("DS부문", "매출액", "12,345")]);
        let out = classify_table(&SegmentRules::default(), &t, "(단위 : 백만원)", "2025.3Q");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].division, "DS부문");
        assert_eq!(out[0].period, "2025.3Q");
        assert_eq!(out[0].revenue, Some(12_345_000_000));
        assert_eq!(out[0].operating_profit, None);
    }

    #[test]
    fn carryover_row_inherits_preceding_division() {
        let t = table(&[
            &labeled("DS부문", "매출액", "29,270,000"),
            &carried("영업이익", "3,860,000"),
        ]);
        let out = classify_table(&SegmentRules::default(), &t, "(단위: 천원)", "2025.3Q");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].revenue, Some(29_270_000_000));
        assert_eq!(out[0].operating_profit, Some(3_860_000_000));
    }

    #[test]
    fn blank_leading_cell_counts_as_carryover() {
        let mut row2: Vec<&str> = vec![""];
        row2.extend(carried("영업이익", "1,000"));
        let t = table(&[&labeled("Alpha", "매출액", "10,000"), &row2]);
        let out = classify_table(&SegmentRules::default(), &t, "(원)", "2025.3Q");
        assert_eq!(out[0].operating_profit, Some(1000));
    }

    #[test]
    fn header_rows_are_skipped() {
        let t = table(&[
            &labeled("부문", "매출액", "ignored"),
            &labeled("DS부문", "매출액", "100"),
        ]);
        let out = classify_table(&SegmentRules::default(), &t, "(원)", "2025.3Q");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].division, "DS부문");
    }

    #[test]
    fn unknown_metric_and_bad_amounts_skip_row_not_table() {
        let t = table(&[
            &labeled("DS부문", "매출원가", "999"), // cost of sales, ignored
            &labeled("DS부문", "매출액", "n/a"),   // unparseable amount
            &carried("영업이익", "500"),
        ]);
        let out = classify_table(&SegmentRules::default(), &t, "(원)", "2025.3Q");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].revenue, None);
        assert_eq!(out[0].operating_profit, Some(500));
    }

    #[test]
    fn all_zero_or_unknown_records_are_dropped() {
        let t = table(&[
            &labeled("빈부문", "매출액", "0"),
            &carried("영업이익", "0"),
            &labeled("실부문", "매출액", "42"),
        ]);
        let out = classify_table(&SegmentRules::default(), &t, "(원)", "2025.3Q");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].division, "실부문");
    }

    #[test]
    fn carryover_before_any_label_is_skipped() {
        let t = table(&[&carried("영업이익", "500")]);
        let out = classify_table(&SegmentRules::default(), &t, "(원)", "2025.3Q");
        assert!(out.is_empty());
    }

    #[test]
    fn last_write_wins_within_one_table() {
        let t = table(&[
            &labeled("DS부문", "매출액", "100"),
            &carried("매출액", "200"),
        ]);
        let out = classify_table(&SegmentRules::default(), &t, "(원)", "2025.3Q");
        assert_eq!(out[0].revenue, Some(200));
    }

    #[test]
    fn amount_header_row_is_skipped_but_revenue_carryover_is_not() {
        // "매출액" is both the amount-column header token and the revenue
        // metric keyword: a label-only row with it leading is a header, a
        // row with it leading plus an amount is carried-over revenue data.
        let t = table(&[
            &labeled("매출액", "내역", "구분"),
            &labeled("DS부문", "영업이익", "50"),
            &carried("매출액", "75"),
        ]);
        let out = classify_table(&SegmentRules::default(), &t, "(원)", "2025.3Q");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].division, "DS부문");
        assert_eq!(out[0].operating_profit, Some(50));
        assert_eq!(out[0].revenue, Some(75));
    }

    #[test]
    fn short_rows_are_unclassifiable() {
        let t = table(&[&["DS부문", "매출액", "100"]]);
        let out = classify_table(&SegmentRules::default(), &t, "(원)", "2025.3Q");
        assert!(out.is_empty());
    }
}
