//! # Report Schema
//!
//! Layout descriptors fixed per report type: the column set, page setup, and
//! grouping configuration. A report's schema never changes during rendering;
//! six production report variants are just six values of [`ReportSpec`]
//! driving the one shared renderer.
//!
//! Whether a column gets currency formatting is an explicit [`ColumnKind`]
//! tag set here, when the schema is defined. The render path never guesses
//! from header or key names.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};

/// Horizontal padding inside each table cell, in points.
pub const CELL_PAD: f64 = 3.0;

/// Semantic type of a column. Drives formatting and default alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    Text,
    Currency,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    Left,
    Right,
}

/// Column width, resolved against the page's content width.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ColumnWidth {
    /// Fixed width in points.
    Fixed(f64),
    /// Fraction (0.0 to 1.0) of the content width.
    Fraction(f64),
}

/// A layout descriptor for one table column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Which record field this column shows. One of: date, account, member,
    /// fund, category, description, amount.
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    pub align: Align,
    pub width: ColumnWidth,
}

impl Column {
    pub fn text(key: &str, label: &str, width: ColumnWidth) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: ColumnKind::Text,
            align: Align::Left,
            width,
        }
    }

    pub fn currency(key: &str, label: &str, width: ColumnWidth) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: ColumnKind::Currency,
            align: Align::Right,
            width,
        }
    }

    pub fn date(key: &str, label: &str, width: ColumnWidth) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: ColumnKind::Date,
            align: Align::Right,
            width,
        }
    }
}

const VALID_COLUMN_KEYS: &[&str] = &[
    "date",
    "account",
    "member",
    "fund",
    "category",
    "description",
    "amount",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Portrait,
    /// Wider pivot tables use landscape.
    Landscape,
}

/// Page margins in points (1/72 inch).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(54.0) // ~0.75 inch
    }
}

/// Fixed page setup for a report type: size, margins, and font sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetup {
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub margins: Margins,
    /// Height of one row line in points.
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    #[serde(default = "default_body_size")]
    pub body_size: f64,
    #[serde(default = "default_title_size")]
    pub title_size: f64,
    #[serde(default = "default_footer_size")]
    pub footer_size: f64,
}

fn default_row_height() -> f64 {
    14.0
}
fn default_body_size() -> f64 {
    9.0
}
fn default_title_size() -> f64 {
    16.0
}
fn default_footer_size() -> f64 {
    8.0
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            row_height: default_row_height(),
            body_size: default_body_size(),
            title_size: default_title_size(),
            footer_size: default_footer_size(),
        }
    }
}

impl PageSetup {
    pub fn landscape() -> Self {
        Self {
            orientation: Orientation::Landscape,
            ..Self::default()
        }
    }

    /// Page (width, height) in points. US Letter, swapped for landscape.
    pub fn page_dimensions(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Portrait => (612.0, 792.0),
            Orientation::Landscape => (792.0, 612.0),
        }
    }
}

/// A grouping dimension: which record field sibling groups share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Date,
    Account,
    Member,
    Fund,
    Category,
}

/// Ordering of sibling groups (and pivot axis values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// First-seen order from the input records.
    #[default]
    Insertion,
    /// Case-insensitive label order.
    Alphabetical,
    /// Natural order of the dimension's underlying value (dates ascend).
    Chronological,
}

/// The body shape of a report: a grouped table or a two-dimensional pivot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReportBody {
    Table {
        columns: Vec<Column>,
        /// Nesting dimensions, outermost first. One to three levels.
        group_by: Vec<Dimension>,
        #[serde(default)]
        sort: SortOrder,
    },
    Pivot {
        row_dim: Dimension,
        col_dim: Dimension,
        #[serde(default)]
        sort: SortOrder,
        /// Per-column width clamp so degenerate labels don't collapse
        /// columns, and few labels don't stretch them absurdly.
        #[serde(default = "default_min_col_width")]
        min_col_width: f64,
        #[serde(default = "default_max_col_width")]
        max_col_width: f64,
    },
}

fn default_min_col_width() -> f64 {
    54.0
}
fn default_max_col_width() -> f64 {
    120.0
}

/// Everything that defines a report variant. Built once, validated before
/// any page is drawn, then read-only for the rest of the render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSpec {
    pub body: ReportBody,
    #[serde(default)]
    pub page: PageSetup,
}

impl ReportSpec {
    /// Check the template for misconfigurations. `content_width` is the page
    /// width minus horizontal margins.
    pub fn validate(&self, content_width: f64) -> Result<(), ReportError> {
        if content_width <= 0.0 {
            return Err(ReportError::Schema(format!(
                "margins leave no content width ({content_width:.1}pt)"
            )));
        }
        // Narrowest width at which wrapping can still place one character.
        let min_usable =
            2.0 * CELL_PAD + self.page.body_size * crate::text::MAX_ADVANCE as f64 / 1000.0;
        match &self.body {
            ReportBody::Table {
                columns, group_by, ..
            } => {
                if columns.is_empty() {
                    return Err(ReportError::Schema("table report has no columns".into()));
                }
                if group_by.is_empty() || group_by.len() > 3 {
                    return Err(ReportError::Schema(format!(
                        "table report must group by 1 to 3 dimensions, got {}",
                        group_by.len()
                    )));
                }
                if !columns.iter().any(|c| c.kind == ColumnKind::Currency) {
                    return Err(ReportError::Schema(
                        "table report needs at least one currency column for subtotals".into(),
                    ));
                }
                for col in columns {
                    if !VALID_COLUMN_KEYS.contains(&col.key.as_str()) {
                        return Err(ReportError::Schema(format!(
                            "unknown column key {:?}",
                            col.key
                        )));
                    }
                }
                let total: f64 = columns
                    .iter()
                    .map(|c| c.resolved_width(content_width))
                    .sum();
                if total > content_width + 0.5 {
                    return Err(ReportError::Schema(format!(
                        "columns need {total:.1}pt but only {content_width:.1}pt is available"
                    )));
                }
                for col in columns {
                    let w = col.resolved_width(content_width);
                    if w < min_usable {
                        return Err(ReportError::Schema(format!(
                            "column {:?} resolves to {w:.1}pt; at least {min_usable:.1}pt is needed to fit a character",
                            col.key
                        )));
                    }
                }
            }
            ReportBody::Pivot {
                row_dim,
                col_dim,
                min_col_width,
                max_col_width,
                ..
            } => {
                if row_dim == col_dim {
                    return Err(ReportError::Schema(
                        "pivot row and column dimensions must differ".into(),
                    ));
                }
                if *min_col_width < min_usable {
                    return Err(ReportError::Schema(format!(
                        "pivot minimum column width {min_col_width:.1}pt cannot fit a character (needs {min_usable:.1}pt)"
                    )));
                }
                if max_col_width < min_col_width {
                    return Err(ReportError::Schema(format!(
                        "pivot column width clamp [{min_col_width:.1}, {max_col_width:.1}] is invalid"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Column {
    /// Width in points against a given content width.
    pub fn resolved_width(&self, content_width: f64) -> f64 {
        match self.width {
            ColumnWidth::Fixed(pts) => pts,
            ColumnWidth::Fraction(f) => f * content_width,
        }
    }
}
