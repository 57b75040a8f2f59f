//! # Layout Renderer
//!
//! The shared orchestration layer: one engine, configured per report variant
//! by a [`ReportSpec`]. Walks the grouped data, emits the page header block,
//! repeating column headers, record rows (single or multi-line), subtotal and
//! grand-total rows, and the pivot grid variant.
//!
//! Every block requests page space from the [`PageCursor`] before drawing, so
//! a wrapped row is never split across a page boundary, and every fresh page
//! gets the report header and column headers redrawn before body content.

use crate::cursor::{PageCursor, PageGeometry};
use crate::error::ReportError;
use crate::group::{group_records, pivot_records, Group, GroupChildren, PivotTable};
use crate::model::{Record, RenderJob};
use crate::money::Amount;
use crate::schema::{
    Align, Column, ColumnKind, Dimension, ReportBody, ReportSpec, SortOrder, CELL_PAD,
};
use crate::surface::{Color, Page};
use crate::text::{wrap, Font, FontMetrics};

/// Indent per group nesting level.
const GROUP_INDENT: f64 = 12.0;
/// Extra height above total rows for the rule line.
const TOTAL_RULE_GAP: f64 = 4.0;

pub struct ReportRenderer<'a> {
    spec: &'a ReportSpec,
    metrics: &'a dyn FontMetrics,
}

/// Resolved column positions for a table report.
struct TableChrome<'a> {
    columns: &'a [Column],
    xs: Vec<f64>,
    widths: Vec<f64>,
}

impl<'a> TableChrome<'a> {
    fn new(columns: &'a [Column], geom: &PageGeometry) -> Self {
        let content = geom.content_width();
        let widths: Vec<f64> = columns.iter().map(|c| c.resolved_width(content)).collect();
        let mut xs = Vec::with_capacity(columns.len());
        let mut x = geom.left_x();
        for w in &widths {
            xs.push(x);
            x += w;
        }
        Self {
            columns,
            xs,
            widths,
        }
    }

    fn total_width(&self) -> f64 {
        self.widths.iter().sum()
    }

    /// Index of the rightmost currency column; totals land there.
    /// Validation guarantees one exists.
    fn total_column(&self) -> usize {
        self.columns
            .iter()
            .rposition(|c| c.kind == ColumnKind::Currency)
            .unwrap_or(self.columns.len().saturating_sub(1))
    }
}

/// Resolved geometry for a pivot grid: the row-label column plus one column
/// per discovered value and a trailing row-total column.
struct PivotChrome {
    label_x: f64,
    label_w: f64,
    col_xs: Vec<f64>,
    col_w: f64,
}

impl PivotChrome {
    fn total_width(&self) -> f64 {
        self.label_w + self.col_w * self.col_xs.len() as f64
    }
}

impl<'a> ReportRenderer<'a> {
    pub fn new(spec: &'a ReportSpec, metrics: &'a dyn FontMetrics) -> Self {
        Self { spec, metrics }
    }

    /// Lay the whole report out. Returns the sealed page sequence; footers
    /// are the assembler's job.
    pub fn render(&self, job: &RenderJob) -> Result<Vec<Page>, ReportError> {
        let geom = PageGeometry::from_setup(&self.spec.page);
        self.spec.validate(geom.content_width())?;
        let pages = match &self.spec.body {
            ReportBody::Table {
                columns,
                group_by,
                sort,
            } => self.render_table(job, geom, columns, group_by, *sort)?,
            ReportBody::Pivot {
                row_dim,
                col_dim,
                sort,
                min_col_width,
                max_col_width,
            } => self.render_pivot(
                job,
                geom,
                *row_dim,
                *col_dim,
                *sort,
                *min_col_width,
                *max_col_width,
            )?,
        };
        log::debug!("laid out {:?} across {} page(s)", job.title, pages.len());
        Ok(pages)
    }

    // ─── Shared chrome ───────────────────────────────────────────

    /// The header block every page opens with: organization, title, period.
    fn draw_page_header(&self, cursor: &mut PageCursor, job: &RenderJob) {
        let geom = *cursor.geometry();
        let setup = &self.spec.page;
        let left = geom.left_x();
        let top = cursor.y();

        let mut y = top + 11.0;
        cursor
            .page()
            .draw_text(left, y, &job.organization, Font::HelveticaBold, 11.0, Color::BLACK);
        y += setup.title_size + 4.0;
        cursor
            .page()
            .draw_text(left, y, &job.title, Font::HelveticaBold, setup.title_size, Color::BLACK);
        y += 13.0;
        cursor.page().draw_text(
            left,
            y,
            job.date_range.label(),
            Font::Helvetica,
            setup.body_size,
            Color::gray(0.25),
        );
        y += 6.0;
        cursor
            .page()
            .draw_line(left, y, geom.right_x(), y, 0.8, Color::RULE);

        cursor.advance(y + 8.0 - top);
    }

    fn draw_empty_notice(&self, cursor: &mut PageCursor) {
        let setup = &self.spec.page;
        let left = cursor.geometry().left_x();
        let baseline = cursor.y() + setup.body_size + 1.0;
        cursor.page().draw_text(
            left + CELL_PAD,
            baseline,
            "No activity for this period.",
            Font::HelveticaOblique,
            setup.body_size,
            Color::gray(0.35),
        );
        cursor.advance(setup.row_height);
    }

    // ─── Table variant ───────────────────────────────────────────

    fn render_table(
        &self,
        job: &RenderJob,
        geom: PageGeometry,
        columns: &[Column],
        group_by: &[Dimension],
        sort: SortOrder,
    ) -> Result<Vec<Page>, ReportError> {
        let root = group_records(&job.records, group_by, sort)?;
        let chrome = TableChrome::new(columns, &geom);
        let mut cursor = PageCursor::new(geom);

        self.draw_page_header(&mut cursor, job);
        self.draw_column_headers(&mut cursor, &chrome);

        let GroupChildren::Groups(groups) = &root.children else {
            return Err(ReportError::Render("root group holds no groups".into()));
        };
        if groups.is_empty() {
            self.draw_empty_notice(&mut cursor);
        } else {
            for group in groups {
                self.draw_group(&mut cursor, &chrome, job, group, 0)?;
            }
        }
        self.draw_total_row(&mut cursor, &chrome, job, "Grand Total", root.subtotal, true)?;

        Ok(cursor.finish())
    }

    /// Request space for an atomic table block, redrawing page chrome after
    /// a break.
    fn ensure_table_space(
        &self,
        cursor: &mut PageCursor,
        chrome: &TableChrome,
        job: &RenderJob,
        needed: f64,
    ) {
        if cursor.ensure(needed) {
            self.draw_page_header(cursor, job);
            self.draw_column_headers(cursor, chrome);
        }
    }

    /// Bold column labels with an underline, repeated on every page.
    fn draw_column_headers(&self, cursor: &mut PageCursor, chrome: &TableChrome) {
        let setup = &self.spec.page;
        let size = setup.body_size;
        let left = cursor.geometry().left_x();
        let baseline = cursor.y() + size + 1.0;

        for (i, col) in chrome.columns.iter().enumerate() {
            let tx = match col.align {
                Align::Left => chrome.xs[i] + CELL_PAD,
                Align::Right => {
                    chrome.xs[i] + chrome.widths[i]
                        - CELL_PAD
                        - self
                            .metrics
                            .text_width(Font::HelveticaBold, size, &col.label)
                }
            };
            cursor
                .page()
                .draw_text(tx, baseline, &col.label, Font::HelveticaBold, size, Color::BLACK);
        }

        let rule_y = cursor.y() + setup.row_height - 2.0;
        cursor
            .page()
            .draw_line(left, rule_y, left + chrome.total_width(), rule_y, 0.8, Color::RULE);
        cursor.advance(setup.row_height);
    }

    fn draw_group(
        &self,
        cursor: &mut PageCursor,
        chrome: &TableChrome,
        job: &RenderJob,
        group: &Group,
        depth: usize,
    ) -> Result<(), ReportError> {
        let setup = &self.spec.page;
        let rh = setup.row_height;

        // Keep the label attached to at least one row of its section.
        self.ensure_table_space(cursor, chrome, job, rh * 2.0);
        let left = cursor.geometry().left_x() + depth as f64 * GROUP_INDENT;
        let baseline = cursor.y() + setup.body_size + 1.0;
        cursor.page().draw_text(
            left,
            baseline,
            &group.label,
            Font::HelveticaBold,
            setup.body_size,
            Color::BLACK,
        );
        cursor.advance(rh);

        match &group.children {
            GroupChildren::Records(records) => {
                // Banding index resets per logical table section.
                for (band, record) in records.iter().enumerate() {
                    self.draw_record_row(cursor, chrome, job, record, band)?;
                }
            }
            GroupChildren::Groups(nested) => {
                for child in nested {
                    self.draw_group(cursor, chrome, job, child, depth + 1)?;
                }
            }
        }

        let label = format!("Total {}", group.label);
        self.draw_total_row(cursor, chrome, job, &label, group.subtotal, false)?;
        Ok(())
    }

    /// One record row: wrap every cell, size the row by the tallest cell,
    /// request the whole row atomically, then draw all columns.
    fn draw_record_row(
        &self,
        cursor: &mut PageCursor,
        chrome: &TableChrome,
        job: &RenderJob,
        record: &Record,
        band_index: usize,
    ) -> Result<(), ReportError> {
        let setup = &self.spec.page;
        let size = setup.body_size;
        let rh = setup.row_height;

        let mut cells: Vec<Vec<String>> = Vec::with_capacity(chrome.columns.len());
        for (i, col) in chrome.columns.iter().enumerate() {
            let text = cell_text(record, col, &job.currency);
            let lines = wrap(
                self.metrics,
                Font::Helvetica,
                size,
                &text,
                chrome.widths[i] - 2.0 * CELL_PAD,
            )?;
            cells.push(lines);
        }
        let max_lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let needed = max_lines as f64 * rh;

        self.ensure_table_space(cursor, chrome, job, needed);
        let row_top = cursor.y();
        let left = cursor.geometry().left_x();

        if band_index % 2 == 0 {
            cursor.page().draw_rect(
                left,
                row_top,
                chrome.total_width(),
                needed,
                Some(Color::BAND),
                None,
            );
        }

        for (i, lines) in cells.iter().enumerate() {
            let col = &chrome.columns[i];
            for (li, line) in lines.iter().enumerate() {
                let baseline = row_top + li as f64 * rh + size + 1.0;
                let tx = match col.align {
                    Align::Left => chrome.xs[i] + CELL_PAD,
                    Align::Right => {
                        chrome.xs[i] + chrome.widths[i]
                            - CELL_PAD
                            - self.metrics.text_width(Font::Helvetica, size, line)
                    }
                };
                cursor
                    .page()
                    .draw_text(tx, baseline, line, Font::Helvetica, size, Color::BLACK);
            }
        }

        cursor.advance(needed);
        Ok(())
    }

    /// A subtotal or grand-total row: bold, rule above (double for the grand
    /// total), amount right-aligned in the rightmost currency column. Goes
    /// through the same space-request path as ordinary rows.
    fn draw_total_row(
        &self,
        cursor: &mut PageCursor,
        chrome: &TableChrome,
        job: &RenderJob,
        label: &str,
        amount: Amount,
        grand: bool,
    ) -> Result<(), ReportError> {
        let setup = &self.spec.page;
        let size = setup.body_size;
        let needed = setup.row_height + TOTAL_RULE_GAP;

        self.ensure_table_space(cursor, chrome, job, needed);
        let row_top = cursor.y();
        let left = cursor.geometry().left_x();
        let width = chrome.total_width();

        cursor
            .page()
            .draw_line(left, row_top + 1.0, left + width, row_top + 1.0, 0.8, Color::RULE);
        if grand {
            cursor
                .page()
                .draw_line(left, row_top + 3.0, left + width, row_top + 3.0, 0.8, Color::RULE);
        }

        let baseline = row_top + TOTAL_RULE_GAP + size + 1.0;
        cursor.page().draw_text(
            left + CELL_PAD,
            baseline,
            label,
            Font::HelveticaBold,
            size,
            Color::BLACK,
        );

        let ci = chrome.total_column();
        let text = amount.format_with_code(&job.currency);
        let tx = chrome.xs[ci] + chrome.widths[ci]
            - CELL_PAD
            - self.metrics.text_width(Font::HelveticaBold, size, &text);
        cursor
            .page()
            .draw_text(tx, baseline, text, Font::HelveticaBold, size, Color::BLACK);

        cursor.advance(needed);
        Ok(())
    }

    // ─── Pivot variant ───────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn render_pivot(
        &self,
        job: &RenderJob,
        geom: PageGeometry,
        row_dim: Dimension,
        col_dim: Dimension,
        sort: SortOrder,
        min_col_width: f64,
        max_col_width: f64,
    ) -> Result<Vec<Page>, ReportError> {
        let table = pivot_records(&job.records, row_dim, col_dim, sort)?;

        // Row-label column, then the remaining width split evenly among the
        // value columns plus a trailing Total column, clamped per column.
        let label_w = (geom.content_width() * 0.25).min(160.0);
        let n = table.col_labels.len() + 1;
        let avail = geom.content_width() - label_w;
        let col_w = (avail / n as f64).clamp(min_col_width, max_col_width);
        if col_w * n as f64 > avail + 0.5 {
            return Err(ReportError::Schema(format!(
                "pivot needs {n} columns of at least {min_col_width:.0}pt but only {avail:.0}pt remains beside the label column"
            )));
        }

        let mut col_xs = Vec::with_capacity(n);
        let mut x = geom.left_x() + label_w;
        for _ in 0..n {
            col_xs.push(x);
            x += col_w;
        }
        let chrome = PivotChrome {
            label_x: geom.left_x(),
            label_w,
            col_xs,
            col_w,
        };

        let mut cursor = PageCursor::new(geom);
        self.draw_page_header(&mut cursor, job);
        self.draw_pivot_headers(&mut cursor, &chrome, &table, job)?;

        if table.is_empty() {
            self.draw_empty_notice(&mut cursor);
        } else {
            for ri in 0..table.row_labels.len() {
                self.draw_pivot_row(&mut cursor, &chrome, &table, job, ri)?;
            }
        }
        self.draw_pivot_totals(&mut cursor, &chrome, &table, job)?;

        Ok(cursor.finish())
    }

    fn ensure_pivot_space(
        &self,
        cursor: &mut PageCursor,
        chrome: &PivotChrome,
        table: &PivotTable,
        job: &RenderJob,
        needed: f64,
    ) -> Result<(), ReportError> {
        if cursor.ensure(needed) {
            self.draw_page_header(cursor, job);
            self.draw_pivot_headers(cursor, chrome, table, job)?;
        }
        Ok(())
    }

    /// Column-dimension labels (wrapped within their column) plus the Total
    /// column, bold with an underline. Repeated on every page.
    fn draw_pivot_headers(
        &self,
        cursor: &mut PageCursor,
        chrome: &PivotChrome,
        table: &PivotTable,
        job: &RenderJob,
    ) -> Result<(), ReportError> {
        let setup = &self.spec.page;
        let size = setup.body_size;
        let rh = setup.row_height;

        let baseline = cursor.y() + size + 1.0;
        cursor.page().draw_text(
            chrome.label_x,
            baseline,
            format!("Amounts in {}", job.currency),
            Font::HelveticaOblique,
            size - 1.0,
            Color::gray(0.35),
        );
        cursor.advance(rh);

        let mut header_cells: Vec<Vec<String>> = Vec::with_capacity(table.col_labels.len() + 1);
        for label in &table.col_labels {
            header_cells.push(wrap(
                self.metrics,
                Font::HelveticaBold,
                size,
                label,
                chrome.col_w - 2.0 * CELL_PAD,
            )?);
        }
        header_cells.push(vec!["Total".to_string()]);

        let max_lines = header_cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let block = max_lines as f64 * rh;
        let top = cursor.y();

        for (ci, lines) in header_cells.iter().enumerate() {
            for (li, line) in lines.iter().enumerate() {
                let baseline = top + li as f64 * rh + size + 1.0;
                let tx = chrome.col_xs[ci] + chrome.col_w
                    - CELL_PAD
                    - self.metrics.text_width(Font::HelveticaBold, size, line);
                cursor
                    .page()
                    .draw_text(tx, baseline, line, Font::HelveticaBold, size, Color::BLACK);
            }
        }

        let rule_y = top + block - 2.0;
        cursor.page().draw_line(
            chrome.label_x,
            rule_y,
            chrome.label_x + chrome.total_width(),
            rule_y,
            0.8,
            Color::RULE,
        );
        cursor.advance(block);
        Ok(())
    }

    /// One pivot row: wrapped row label, one amount per column (dash for
    /// zero cells), row total in the trailing column.
    fn draw_pivot_row(
        &self,
        cursor: &mut PageCursor,
        chrome: &PivotChrome,
        table: &PivotTable,
        job: &RenderJob,
        ri: usize,
    ) -> Result<(), ReportError> {
        let setup = &self.spec.page;
        let size = setup.body_size;
        let rh = setup.row_height;

        let label_lines = wrap(
            self.metrics,
            Font::Helvetica,
            size,
            &table.row_labels[ri],
            chrome.label_w - 2.0 * CELL_PAD,
        )?;
        let max_lines = label_lines.len().max(1);
        let needed = max_lines as f64 * rh;

        self.ensure_pivot_space(cursor, chrome, table, job, needed)?;
        let row_top = cursor.y();

        if ri % 2 == 0 {
            cursor.page().draw_rect(
                chrome.label_x,
                row_top,
                chrome.total_width(),
                needed,
                Some(Color::BAND),
                None,
            );
        }

        for (li, line) in label_lines.iter().enumerate() {
            let baseline = row_top + li as f64 * rh + size + 1.0;
            cursor.page().draw_text(
                chrome.label_x + CELL_PAD,
                baseline,
                line,
                Font::Helvetica,
                size,
                Color::BLACK,
            );
        }

        let baseline = row_top + size + 1.0;
        for ci in 0..table.col_labels.len() {
            let cell = table.cells[ri][ci];
            let text = if cell.is_zero() {
                "-".to_string()
            } else {
                cell.format()
            };
            self.draw_right_aligned(cursor, chrome, ci, baseline, &text, Font::Helvetica);
        }
        let total_text = table.row_totals[ri].format();
        let last = table.col_labels.len();
        self.draw_right_aligned(cursor, chrome, last, baseline, &total_text, Font::Helvetica);

        cursor.advance(needed);
        Ok(())
    }

    fn draw_right_aligned(
        &self,
        cursor: &mut PageCursor,
        chrome: &PivotChrome,
        ci: usize,
        baseline: f64,
        text: &str,
        font: Font,
    ) {
        let size = self.spec.page.body_size;
        let tx = chrome.col_xs[ci] + chrome.col_w
            - CELL_PAD
            - self.metrics.text_width(font, size, text);
        cursor
            .page()
            .draw_text(tx, baseline, text, font, size, Color::BLACK);
    }

    /// The column-totals row plus the grand total at the intersection with
    /// the Total column, under a double rule.
    fn draw_pivot_totals(
        &self,
        cursor: &mut PageCursor,
        chrome: &PivotChrome,
        table: &PivotTable,
        job: &RenderJob,
    ) -> Result<(), ReportError> {
        let setup = &self.spec.page;
        let size = setup.body_size;
        let needed = setup.row_height + TOTAL_RULE_GAP;

        self.ensure_pivot_space(cursor, chrome, table, job, needed)?;
        let row_top = cursor.y();
        let width = chrome.total_width();

        cursor.page().draw_line(
            chrome.label_x,
            row_top + 1.0,
            chrome.label_x + width,
            row_top + 1.0,
            0.8,
            Color::RULE,
        );
        cursor.page().draw_line(
            chrome.label_x,
            row_top + 3.0,
            chrome.label_x + width,
            row_top + 3.0,
            0.8,
            Color::RULE,
        );

        let baseline = row_top + TOTAL_RULE_GAP + size + 1.0;
        cursor.page().draw_text(
            chrome.label_x + CELL_PAD,
            baseline,
            "Total",
            Font::HelveticaBold,
            size,
            Color::BLACK,
        );
        for (ci, total) in table.col_totals.iter().enumerate() {
            self.draw_right_aligned(
                cursor,
                chrome,
                ci,
                baseline,
                &total.format(),
                Font::HelveticaBold,
            );
        }
        let last = table.col_labels.len();
        self.draw_right_aligned(
            cursor,
            chrome,
            last,
            baseline,
            &table.grand_total.format(),
            Font::HelveticaBold,
        );

        cursor.advance(needed);
        Ok(())
    }
}

/// Per-column cell text for a record. Unknown keys are rejected by schema
/// validation before rendering starts.
fn cell_text(record: &Record, col: &Column, currency: &str) -> String {
    match col.key.as_str() {
        "date" => record.date.format("%Y-%m-%d").to_string(),
        "account" => record.account.clone(),
        "member" => record.member.clone().unwrap_or_default(),
        "fund" => record.fund.clone().unwrap_or_default(),
        "category" => record.category.clone().unwrap_or_default(),
        "description" => record.description.clone().unwrap_or_default(),
        "amount" => match col.kind {
            ColumnKind::Currency => record.amount.format_with_code(currency),
            _ => record.amount.format(),
        },
        _ => String::new(),
    }
}
