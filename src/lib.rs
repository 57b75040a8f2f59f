//! # Ledgerpress
//!
//! A page-native financial report engine.
//!
//! Most report generators lay content onto an infinite vertical canvas and
//! slice it into pages afterwards. That produces rows cut in half, orphaned
//! column headers, and subtotals stranded from their groups. Ledgerpress does
//! the opposite: **the page is the fundamental unit of layout.** Every row,
//! subtotal, and pivot cell requests space from the pagination cursor before
//! it is drawn, with the page boundary as a hard constraint. Content flows
//! *into* pages.
//!
//! ## Architecture
//!
//! ```text
//! Input (records + report spec)
//!       ↓
//!   [group]    - Group tree / pivot grid with bottom-up subtotals
//!       ↓
//!   [layout]   - Page-aware renderer driven by the pagination cursor
//!       ↓
//!   [assemble] - Footer stamping ("Page N of T", timestamp), second pass
//!       ↓
//!   [pdf]      - Serialize to PDF bytes
//! ```
//!
//! Rendering is single-threaded and CPU-bound. Each render call owns its own
//! pages, groups, and cursor, so concurrent report generations need no
//! locking.

pub mod assemble;
pub mod cursor;
pub mod error;
pub mod group;
pub mod layout;
pub mod model;
pub mod money;
pub mod pdf;
pub mod reports;
pub mod schema;
pub mod surface;
pub mod text;

pub use error::ReportError;
pub use model::{DateRange, Record, RenderJob, ReportRequest};
pub use money::Amount;
pub use schema::ReportSpec;

use assemble::Assembler;
use chrono::{DateTime, Utc};
use layout::ReportRenderer;
use text::BuiltinMetrics;

/// Render a report to PDF bytes.
///
/// This is the primary entry point. Either a complete, valid document comes
/// back, or an error; never a partial byte stream.
pub fn render(job: &RenderJob, spec: &ReportSpec) -> Result<Vec<u8>, ReportError> {
    render_at(job, spec, Utc::now())
}

/// Render with an explicit generation timestamp for the footer stamp.
///
/// Output is a pure function of `(job, spec, generated_at)`, which makes
/// byte-level comparison possible in tests and reproducible pipelines.
pub fn render_at(
    job: &RenderJob,
    spec: &ReportSpec,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let metrics = BuiltinMetrics::new();
    let pages = ReportRenderer::new(spec, &metrics).render(job)?;
    Assembler::new(&metrics, spec.page.footer_size).finalize(&pages, generated_at)
}

/// Render a report described as JSON (a [`ReportRequest`] envelope) to PDF
/// bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, ReportError> {
    let request: ReportRequest = serde_json::from_str(json)?;
    render(&request.job, &request.spec)
}
