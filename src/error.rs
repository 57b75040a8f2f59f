//! Structured error types for the report engine.
//!
//! Everything the public API can fail with is a `ReportError`. Either a
//! complete, valid document comes back, or one of these does; there is no
//! partial byte stream.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse as a report request.
    #[error("failed to parse report input: {source}{hint}")]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// A numeric value could not be read as a monetary amount.
    ///
    /// Non-numeric and non-finite input is rejected here rather than being
    /// coerced to zero, so upstream data-quality bugs stay visible.
    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount { value: String, reason: String },

    /// A record lacked a field the report's grouping dimensions require.
    #[error("record dated {date} is missing required field {field:?}")]
    MissingField { field: &'static str, date: String },

    /// The report template itself is misconfigured (bad columns, widths,
    /// grouping). Raised before any page is drawn.
    #[error("report schema error: {0}")]
    Schema(String),

    /// A column is too narrow to fit even a single character, so wrapping
    /// cannot terminate. A template misconfiguration, not bad data.
    #[error("column too narrow: {width:.2}pt cannot fit a single character")]
    ColumnTooNarrow { width: f64 },

    /// Document assembly failed.
    #[error("render error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "\n  Hint: check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "\n  Hint: the JSON is valid but doesn't match the report request schema. Check field names and types."
            }
            serde_json::error::Category::Eof => {
                "\n  Hint: unexpected end of input. Is the JSON truncated?"
            }
            serde_json::error::Category::Io => "",
        };
        ReportError::Parse {
            source: e,
            hint: hint.to_string(),
        }
    }
}
