//! # Pagination Cursor
//!
//! Tracks the vertical write position on the current page and allocates new
//! pages when a prospective write would cross the bottom margin. This is the
//! page-break state machine, isolated so it is testable without rendering a
//! full report.
//!
//! The cursor only breaks pages; redrawing report and column headers on the
//! fresh page is the renderer's job, signalled by [`PageCursor::ensure`]
//! returning true.

use crate::schema::{Margins, PageSetup};
use crate::surface::Page;

/// Fixed page geometry for one report run.
#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

impl PageGeometry {
    pub fn from_setup(setup: &PageSetup) -> Self {
        let (width, height) = setup.page_dimensions();
        Self {
            width,
            height,
            margins: setup.margins,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.margins.horizontal()
    }

    /// y of the first writable line (top-down coordinates).
    pub fn top_y(&self) -> f64 {
        self.margins.top
    }

    /// y of the bottom margin; writes must not extend past this.
    pub fn bottom_y(&self) -> f64 {
        self.height - self.margins.bottom
    }

    pub fn left_x(&self) -> f64 {
        self.margins.left
    }

    pub fn right_x(&self) -> f64 {
        self.width - self.margins.right
    }
}

/// Owns the growing page list and the current write position.
pub struct PageCursor {
    geom: PageGeometry,
    pages: Vec<Page>,
    y: f64,
}

impl PageCursor {
    /// Start with one fresh page, cursor at the top margin.
    pub fn new(geom: PageGeometry) -> Self {
        Self {
            pages: vec![Page::new(geom.width, geom.height)],
            y: geom.top_y(),
            geom,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geom
    }

    /// Current vertical write position (top of the next row).
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The page currently being written.
    pub fn page(&mut self) -> &mut Page {
        self.pages
            .last_mut()
            .expect("cursor always holds at least one page")
    }

    /// Would a block of the given height fit above the bottom margin?
    pub fn fits(&self, height: f64) -> bool {
        self.y + height <= self.geom.bottom_y() + 0.01
    }

    /// Move the cursor down after a write.
    pub fn advance(&mut self, dy: f64) {
        self.y += dy;
    }

    /// Seal the current page and open a fresh one at the top margin.
    pub fn break_page(&mut self) {
        self.page().seal();
        self.pages.push(Page::new(self.geom.width, self.geom.height));
        self.y = self.geom.top_y();
        log::debug!("page break -> page {}", self.pages.len());
    }

    /// Request space for an atomic block. Returns true when a page break
    /// happened, in which case the caller must redraw its page chrome before
    /// writing the block. A block taller than a whole page still gets a
    /// fresh page (and overflows it; there is no way to honor atomicity).
    pub fn ensure(&mut self, height: f64) -> bool {
        if self.fits(height) {
            false
        } else {
            self.break_page();
            true
        }
    }

    /// Seal the last page and hand the full page list over.
    pub fn finish(mut self) -> Vec<Page> {
        self.page().seal();
        self.pages
    }
}
