//! Plain text of a document's text layer.
//!
//! Supporting documents (W-2s, 1099s, receipts exported as PDF) are turned
//! into the free-text data blob handed to the mapper. Words are regrouped
//! into lines by baseline proximity; pages are separated by a blank line.

use super::widgets::load_document;
use crate::content::{page_text_runs, TextRun};
use crate::error::Result;
use lopdf::Document;

/// Extracts the plain text of every page.
pub struct TextExtractor;

impl TextExtractor {
    /// Text of one page, one output line per visual line.
    pub fn page_text(doc: &Document, page_id: lopdf::ObjectId) -> String {
        let runs = page_text_runs(doc, page_id);
        lines(&runs).join("\n")
    }

    /// Text of all pages in page order.
    pub fn document_text(doc: &Document) -> String {
        doc.get_pages()
            .values()
            .map(|page_id| Self::page_text(doc, *page_id))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Group reading-ordered runs into lines.
///
/// A run joins the current line while its vertical extent overlaps the
/// line's first run by at least half of the smaller height.
fn lines(runs: &[TextRun]) -> Vec<String> {
    let mut lines: Vec<Vec<&TextRun>> = Vec::new();
    for run in runs {
        let joins = lines.last().and_then(|line| line.first()).is_some_and(|first| {
            let overlap = first.bbox.y1.min(run.bbox.y1) - first.bbox.y0.max(run.bbox.y0);
            overlap >= 0.5 * first.bbox.height().min(run.bbox.height())
        });
        match lines.last_mut() {
            Some(line) if joins => line.push(run),
            _ => lines.push(vec![run]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            line.iter().map(|run| run.text.as_str()).collect::<Vec<_>>().join(" ")
        })
        .collect()
}

/// Extract the plain text of a PDF.
pub fn extract_text(pdf: &[u8]) -> Result<String> {
    let doc = load_document(pdf)?;
    Ok(TextExtractor::document_text(&doc))
}
