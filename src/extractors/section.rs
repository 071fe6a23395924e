// src/extractors/section.rs

/// Returns the slice of `document_text` starting at the first occurrence of
/// `start_marker` and ending just before the first occurrence of
/// `end_marker` that lies strictly after it. The start marker itself is
/// included in the result.
///
/// `None` means either marker is absent, or the end marker only occurs
/// before the start marker. That is a normal outcome for inconsistently
/// formatted filings, not an error: callers narrow with a broader scope or
/// skip the dependent extraction step.
///
/// Calls nest to narrow progressively, e.g. first to the business-overview
/// chapter, then to the sales subsection within it.
pub fn locate<'a>(document_text: &'a str, start_marker: &str, end_marker: &str) -> Option<&'a str> {
    let start = document_text.find(start_marker)?;
    let after_start = start + start_marker.len();
    let end_rel = document_text[after_start..].find(end_marker)?;
    let end = after_start + end_rel;

    tracing::trace!(
        start_marker,
        end_marker,
        start,
        end,
        "Located section ({} bytes)",
        end - start
    );
    Some(&document_text[start..end])
}
