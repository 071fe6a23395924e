// src/extractors/table.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("Failed to compile CELL_SELECTOR"));

// --- Data Structures ---
/// A table lifted out of the markup: rows of trimmed cell texts plus the
/// flattened text of the whole table. Column headers in DART filings are not
/// reliable, so no schema is attached; classification happens downstream
/// from cell content and position.
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub rows: Vec<Vec<String>>,
    pub flat_text: String,
}

impl ParsedTable {
    /// True when every keyword appears somewhere in the table's text.
    pub fn contains_all(&self, keywords: &[String]) -> bool {
        keywords.iter().all(|kw| self.flat_text.contains(kw.as_str()))
    }
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Parses `markup` and returns every table found, in document order.
/// DART report bodies are frequently malformed HTML inside an XML wrapper;
/// scraper's fragment parser is tolerant of both.
pub fn parse_tables(markup: &str) -> Vec<ParsedTable> {
    let fragment = Html::parse_fragment(markup);
    let mut tables = Vec::new();

    for table_el in fragment.select(&TABLE_SELECTOR) {
        let rows: Vec<Vec<String>> = table_el
            .select(&ROW_SELECTOR)
            .map(|row| row.select(&CELL_SELECTOR).map(cell_text).collect())
            .collect();

        let flat_text = table_el.text().collect::<String>();
        tables.push(ParsedTable { rows, flat_text });
    }

    tracing::debug!("Parsed {} tables from {} bytes of markup", tables.len(), markup.len());
    tables
}

/// Selects the first table in document order whose flattened text contains
/// every keyword in `required_keywords`. First match wins; there is no
/// scoring among candidates. `None` when no table qualifies.
pub fn find_table(markup: &str, required_keywords: &[String]) -> Option<ParsedTable> {
    for (idx, table) in parse_tables(markup).into_iter().enumerate() {
        if table.contains_all(required_keywords) {
            tracing::debug!(table_index = idx, "Selected table matching {:?}", required_keywords);
            return Some(table);
        }
    }
    tracing::debug!("No table matched keywords {:?}", required_keywords);
    None
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn parse_tables_extracts_rows_and_cells() {
        let markup = r#"
            <p>intro</p>
            <table>
              <tr><th>부문</th><th>매출액</th><th>비중</th></tr>
              <tr><td>DS</td><td>1,000</td><td>40%</td></tr>
            </table>
        "#;
        let tables = parse_tables(markup);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[0], vec!["부문", "매출액", "비중"]);
        assert_eq!(tables[0].rows[1], vec!["DS", "1,000", "40%"]);
    }

    #[test]
    fn find_table_requires_every_keyword() {
        let markup = r#"
            <table><tr><td>부문</td><td>매출액</td></tr></table>
            <table><tr><td>부문</td><td>매출액</td><td>비중</td></tr></table>
        "#;
        let found = find_table(markup, &kw(&["부문", "매출액", "비중"])).unwrap();
        assert!(found.flat_text.contains("비중"));
    }

    #[test]
    fn find_table_first_match_wins() {
        let markup = r#"
            <table><tr><td>부문 매출액 비중 first</td></tr></table>
            <table><tr><td>부문 매출액 비중 second</td></tr></table>
        "#;
        let found = find_table(markup, &kw(&["부문", "매출액", "비중"])).unwrap();
        assert!(found.flat_text.contains("first"));
    }

    #[test]
    fn find_table_returns_none_when_nothing_matches() {
        let markup = "<table><tr><td>irrelevant</td></tr></table>";
        assert!(find_table(markup, &kw(&["부문"])).is_none());
        assert!(find_table("no tables at all", &kw(&["부문"])).is_none());
    }

    #[test]
    fn cell_text_is_trimmed_and_flattened() {
        let markup = "<table><tr><td>  DS <b>부문</b>\n </td></tr></table>";
        let tables = parse_tables(markup);
        assert_eq!(tables[0].rows[0][0], "DS 부문");
    }
}
