//! # Input Model
//!
//! The data a caller hands to the engine: flat transaction-like records plus
//! the report metadata that appears in page headers. Designed to be easily
//! produced by an upstream aggregation layer or direct JSON construction.
//!
//! Records are immutable once constructed. The engine never writes back.

use crate::money::Amount;
use crate::schema::ReportSpec;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A flat input row: who/what/when plus a signed amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub date: NaiveDate,
    pub account: String,
    #[serde(default)]
    pub member: Option<String>,
    #[serde(default)]
    pub fund: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Amount,
}

impl Record {
    pub fn new(date: NaiveDate, account: &str, amount: Amount) -> Self {
        Self {
            date,
            account: account.to_string(),
            member: None,
            fund: None,
            category: None,
            description: None,
            amount,
        }
    }

    pub fn with_member(mut self, member: &str) -> Self {
        self.member = Some(member.to_string());
        self
    }

    pub fn with_fund(mut self, fund: &str) -> Self {
        self.fund = Some(fund.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// The reporting period, shown in every page header.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Human-readable period label, e.g. "January 1, 2026 - March 31, 2026".
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.from.format("%B %-d, %Y"),
            self.to.format("%B %-d, %Y")
        )
    }
}

/// One complete report-generation request. Created per invocation, consumed
/// fully, then discarded; the finished byte stream is the only artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    /// Organization name shown at the top of every page.
    pub organization: String,
    /// Report title shown under the organization name.
    pub title: String,
    pub date_range: DateRange,
    /// ISO 4217 currency code, e.g. "USD".
    pub currency: String,
    pub records: Vec<Record>,
}

/// The JSON envelope accepted by [`crate::render_json`]: a report spec plus
/// the job it should be applied to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub spec: ReportSpec,
    pub job: RenderJob,
}
