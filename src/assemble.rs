//! # Document Assembler
//!
//! The second pass over the sealed page list. "Page N of T" needs the total
//! page count, which only exists once layout is done, so footers are stamped
//! here rather than inline during page transitions.
//!
//! Finalization never mutates the pages it is given: footer ops are computed
//! into the serializer's view only. Given the same pages and the same
//! timestamp, the output is byte-identical on every call.

use crate::error::ReportError;
use crate::pdf::PdfWriter;
use crate::surface::{Color, DrawOp, Page};
use crate::text::{Font, FontMetrics};
use chrono::{DateTime, Utc};

/// Footer baseline distance from the bottom page edge.
const FOOTER_INSET: f64 = 22.0;
/// Footer text distance from the side page edges.
const FOOTER_SIDE_INSET: f64 = 54.0;

pub struct Assembler<'a> {
    metrics: &'a dyn FontMetrics,
    footer_size: f64,
}

impl<'a> Assembler<'a> {
    pub fn new(metrics: &'a dyn FontMetrics, footer_size: f64) -> Self {
        Self {
            metrics,
            footer_size,
        }
    }

    /// Stamp every page with the generation-timestamp and page-number
    /// footers, then serialize the whole document.
    pub fn finalize(
        &self,
        pages: &[Page],
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>, ReportError> {
        if pages.is_empty() {
            return Err(ReportError::Render("no pages to assemble".into()));
        }
        if let Some(open) = pages.iter().position(|p| !p.is_sealed()) {
            return Err(ReportError::Render(format!(
                "page {} is not sealed; layout did not finish",
                open + 1
            )));
        }

        let total = pages.len();
        let stamp = format!("Generated on {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
        let footers: Vec<Vec<DrawOp>> = pages
            .iter()
            .enumerate()
            .map(|(i, page)| self.footer_ops(page, i + 1, total, &stamp))
            .collect();

        PdfWriter::new().write(pages, &footers)
    }

    fn footer_ops(&self, page: &Page, number: usize, total: usize, stamp: &str) -> Vec<DrawOp> {
        let size = self.footer_size;
        let y = page.height - FOOTER_INSET;
        let grey = Color::gray(0.4);

        let page_text = format!("Page {} of {}", number, total);
        let page_x = page.width
            - FOOTER_SIDE_INSET
            - self.metrics.text_width(Font::Helvetica, size, &page_text);

        vec![
            DrawOp::Text {
                x: FOOTER_SIDE_INSET,
                y,
                text: stamp.to_string(),
                font: Font::Helvetica,
                size,
                color: grey,
            },
            DrawOp::Text {
                x: page_x,
                y,
                text: page_text,
                font: Font::Helvetica,
                size,
                color: grey,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::BuiltinMetrics;
    use chrono::TimeZone;

    fn sealed_page() -> Page {
        let mut page = Page::new(612.0, 792.0);
        page.draw_text(54.0, 60.0, "body", Font::Helvetica, 9.0, Color::BLACK);
        page.seal();
        page
    }

    fn frozen_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 27, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_finalize_idempotent_with_frozen_clock() {
        let metrics = BuiltinMetrics::new();
        let assembler = Assembler::new(&metrics, 8.0);
        let pages = vec![sealed_page(), sealed_page()];
        let first = assembler.finalize(&pages, frozen_clock()).unwrap();
        let second = assembler.finalize(&pages, frozen_clock()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_finalize_does_not_mutate_pages() {
        let metrics = BuiltinMetrics::new();
        let assembler = Assembler::new(&metrics, 8.0);
        let pages = vec![sealed_page()];
        let ops_before = pages[0].ops().len();
        assembler.finalize(&pages, frozen_clock()).unwrap();
        assert_eq!(pages[0].ops().len(), ops_before);
    }

    #[test]
    fn test_finalize_rejects_unsealed_pages() {
        let metrics = BuiltinMetrics::new();
        let assembler = Assembler::new(&metrics, 8.0);
        let pages = vec![Page::new(612.0, 792.0)];
        assert!(assembler.finalize(&pages, frozen_clock()).is_err());
    }

    #[test]
    fn test_finalize_rejects_empty_page_list() {
        let metrics = BuiltinMetrics::new();
        let assembler = Assembler::new(&metrics, 8.0);
        assert!(assembler.finalize(&[], frozen_clock()).is_err());
    }
}
