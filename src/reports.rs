//! # Report Presets
//!
//! The production report variants, expressed as [`ReportSpec`] values. Six
//! near-identical renderers collapse into one engine configured six ways;
//! this module is the configuration.
//!
//! Currency formatting is decided here, by tagging columns, not guessed from
//! header names at render time.

use crate::schema::{
    Column, ColumnWidth, Dimension, PageSetup, ReportBody, ReportSpec, SortOrder,
};

/// Every transaction in the period, grouped by date then account.
pub fn general_ledger() -> ReportSpec {
    ReportSpec {
        body: ReportBody::Table {
            columns: vec![
                Column::date("date", "Date", ColumnWidth::Fixed(70.0)),
                Column::text("description", "Description", ColumnWidth::Fraction(0.45)),
                Column::currency("amount", "Amount", ColumnWidth::Fixed(90.0)),
            ],
            group_by: vec![Dimension::Date, Dimension::Account],
            sort: SortOrder::Chronological,
        },
        page: PageSetup::default(),
    }
}

/// Transactions per account, accounts in alphabetical order.
pub fn account_activity() -> ReportSpec {
    ReportSpec {
        body: ReportBody::Table {
            columns: vec![
                Column::date("date", "Date", ColumnWidth::Fixed(70.0)),
                Column::text("description", "Description", ColumnWidth::Fraction(0.5)),
                Column::currency("amount", "Amount", ColumnWidth::Fixed(90.0)),
            ],
            group_by: vec![Dimension::Account],
            sort: SortOrder::Alphabetical,
        },
        page: PageSetup::default(),
    }
}

/// Per-member giving detail, nested by fund.
pub fn giving_by_member() -> ReportSpec {
    ReportSpec {
        body: ReportBody::Table {
            columns: vec![
                Column::date("date", "Date", ColumnWidth::Fixed(70.0)),
                Column::text("fund", "Fund", ColumnWidth::Fraction(0.35)),
                Column::currency("amount", "Amount", ColumnWidth::Fixed(90.0)),
            ],
            group_by: vec![Dimension::Member, Dimension::Fund],
            sort: SortOrder::Alphabetical,
        },
        page: PageSetup::default(),
    }
}

/// Activity per fund with fund subtotals.
pub fn fund_balances() -> ReportSpec {
    ReportSpec {
        body: ReportBody::Table {
            columns: vec![
                Column::date("date", "Date", ColumnWidth::Fixed(70.0)),
                Column::text("description", "Description", ColumnWidth::Fraction(0.45)),
                Column::currency("amount", "Amount", ColumnWidth::Fixed(90.0)),
            ],
            group_by: vec![Dimension::Fund],
            sort: SortOrder::Alphabetical,
        },
        page: PageSetup::default(),
    }
}

/// Expense cross-tab: account rows by category columns. Landscape for width.
pub fn expense_summary() -> ReportSpec {
    ReportSpec {
        body: ReportBody::Pivot {
            row_dim: Dimension::Account,
            col_dim: Dimension::Category,
            sort: SortOrder::Alphabetical,
            min_col_width: 54.0,
            max_col_width: 120.0,
        },
        page: PageSetup::landscape(),
    }
}

/// Member-giving cross-tab: member rows by fund columns. Landscape for width.
pub fn member_giving_pivot() -> ReportSpec {
    ReportSpec {
        body: ReportBody::Pivot {
            row_dim: Dimension::Member,
            col_dim: Dimension::Fund,
            sort: SortOrder::Alphabetical,
            min_col_width: 54.0,
            max_col_width: 120.0,
        },
        page: PageSetup::landscape(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::PageGeometry;

    #[test]
    fn test_all_presets_validate() {
        for spec in [
            general_ledger(),
            account_activity(),
            giving_by_member(),
            fund_balances(),
            expense_summary(),
            member_giving_pivot(),
        ] {
            let geom = PageGeometry::from_setup(&spec.page);
            spec.validate(geom.content_width()).unwrap();
        }
    }
}
