//! # Grouping & Aggregation
//!
//! Turns a flat record list into the ordered tree of groups and subtotals the
//! renderer walks, and builds the two-dimensional grid for pivot reports.
//!
//! Subtotals are computed bottom-up and never mutated afterwards; zero-amount
//! rows and groups are pruned only after all totals exist, so pruning can
//! never corrupt a parent's subtotal.

use crate::error::ReportError;
use crate::model::Record;
use crate::money::Amount;
use crate::schema::{Dimension, SortOrder};
use std::collections::HashMap;

/// A named bucket of records (or sub-groups) sharing one dimension value.
#[derive(Debug, Clone)]
pub struct Group {
    pub label: String,
    /// Key used for chronological ordering (e.g. ISO date for date groups).
    pub sort_key: String,
    pub children: GroupChildren,
    pub subtotal: Amount,
}

#[derive(Debug, Clone)]
pub enum GroupChildren {
    Records(Vec<Record>),
    Groups(Vec<Group>),
}

impl Group {
    /// Number of leaf records under this group.
    pub fn record_count(&self) -> usize {
        match &self.children {
            GroupChildren::Records(rs) => rs.len(),
            GroupChildren::Groups(gs) => gs.iter().map(Group::record_count).sum(),
        }
    }
}

/// Label and sort key of a record along one dimension.
fn key_of(record: &Record, dim: Dimension) -> Result<(String, String), ReportError> {
    let missing = |field: &'static str| ReportError::MissingField {
        field,
        date: record.date.to_string(),
    };
    Ok(match dim {
        Dimension::Date => (
            record.date.format("%B %-d, %Y").to_string(),
            record.date.format("%Y-%m-%d").to_string(),
        ),
        Dimension::Account => (record.account.clone(), record.account.clone()),
        Dimension::Member => {
            let m = record.member.as_ref().ok_or_else(|| missing("member"))?;
            (m.clone(), m.clone())
        }
        Dimension::Fund => {
            let f = record.fund.as_ref().ok_or_else(|| missing("fund"))?;
            (f.clone(), f.clone())
        }
        Dimension::Category => {
            let c = record.category.as_ref().ok_or_else(|| missing("category"))?;
            (c.clone(), c.clone())
        }
    })
}

fn sort_groups(groups: &mut Vec<Group>, sort: SortOrder) {
    match sort {
        SortOrder::Insertion => {}
        SortOrder::Alphabetical => {
            groups.sort_by_cached_key(|g| g.label.to_lowercase());
        }
        SortOrder::Chronological => {
            groups.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        }
    }
}

/// Group records along `dims` (outermost first), computing subtotals
/// bottom-up and pruning zero-amount rows and groups post-aggregation.
///
/// Returns the root group, whose subtotal is the report's grand total.
pub fn group_records(
    records: &[Record],
    dims: &[Dimension],
    sort: SortOrder,
) -> Result<Group, ReportError> {
    if dims.is_empty() {
        return Err(ReportError::Schema("no grouping dimensions".into()));
    }
    let mut children = bucket(records, dims, sort)?;
    let grand_total: Amount = children.iter().map(|g| g.subtotal).sum();
    prune_zeroes(&mut children);
    Ok(Group {
        label: String::new(),
        sort_key: String::new(),
        children: GroupChildren::Groups(children),
        subtotal: grand_total,
    })
}

/// Single-pass bucketing by the first dimension, recursing into the rest.
/// Insertion order is preserved unless the sort order says otherwise.
fn bucket(
    records: &[Record],
    dims: &[Dimension],
    sort: SortOrder,
) -> Result<Vec<Group>, ReportError> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, (String, Vec<Record>)> = HashMap::new();

    for record in records {
        let (label, sort_key) = key_of(record, dims[0])?;
        let entry = buckets.entry(sort_key.clone()).or_insert_with(|| {
            order.push(sort_key.clone());
            (label, Vec::new())
        });
        entry.1.push(record.clone());
    }

    let mut groups = Vec::with_capacity(order.len());
    for sort_key in order {
        let (label, members) = match buckets.remove(&sort_key) {
            Some(v) => v,
            None => continue,
        };
        let group = if dims.len() == 1 {
            let subtotal: Amount = members.iter().map(|r| r.amount).sum();
            Group {
                label,
                sort_key,
                children: GroupChildren::Records(members),
                subtotal,
            }
        } else {
            let nested = bucket(&members, &dims[1..], sort)?;
            let subtotal: Amount = nested.iter().map(|g| g.subtotal).sum();
            Group {
                label,
                sort_key,
                children: GroupChildren::Groups(nested),
                subtotal,
            }
        };
        groups.push(group);
    }

    sort_groups(&mut groups, sort);
    Ok(groups)
}

/// Drop zero-amount records and zero-subtotal groups. Runs after subtotal
/// computation, so parents already carry the correct totals.
fn prune_zeroes(groups: &mut Vec<Group>) {
    for group in groups.iter_mut() {
        match &mut group.children {
            GroupChildren::Records(records) => {
                let before = records.len();
                records.retain(|r| !r.amount.is_zero());
                if records.len() < before {
                    log::debug!(
                        "pruned {} zero-amount row(s) from {:?}",
                        before - records.len(),
                        group.label
                    );
                }
            }
            GroupChildren::Groups(nested) => prune_zeroes(nested),
        }
    }
    // Amounts that cancel to zero still have visible rows; only groups left
    // with nothing to show are dropped.
    groups.retain(|g| {
        let drop = g.subtotal.is_zero() && g.record_count() == 0;
        if drop {
            log::debug!("pruned empty zero group {:?}", g.label);
        }
        !drop
    });
}

/// Accumulated amounts at the intersections of two dimensions, with both
/// marginal totals and the grand total.
#[derive(Debug, Clone)]
pub struct PivotTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// `cells[row][col]`; zero cells are retained (rendered as a dash).
    pub cells: Vec<Vec<Amount>>,
    pub row_totals: Vec<Amount>,
    pub col_totals: Vec<Amount>,
    pub grand_total: Amount,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }
}

/// Cross-tabulate records by `row_dim` × `col_dim` in a single pass.
///
/// The cross-check `sum(row_totals) == sum(col_totals) == grand_total` holds
/// for every input, including the empty one. Rows whose every cell is zero
/// are pruned after totals are computed.
pub fn pivot_records(
    records: &[Record],
    row_dim: Dimension,
    col_dim: Dimension,
    sort: SortOrder,
) -> Result<PivotTable, ReportError> {
    let mut row_keys: Vec<(String, String)> = Vec::new(); // (sort_key, label)
    let mut col_keys: Vec<(String, String)> = Vec::new();
    let mut row_index: HashMap<String, usize> = HashMap::new();
    let mut col_index: HashMap<String, usize> = HashMap::new();
    let mut cells: HashMap<(usize, usize), Amount> = HashMap::new();

    for record in records {
        let (row_label, row_key) = key_of(record, row_dim)?;
        let (col_label, col_key) = key_of(record, col_dim)?;
        let ri = *row_index.entry(row_key.clone()).or_insert_with(|| {
            row_keys.push((row_key.clone(), row_label));
            row_keys.len() - 1
        });
        let ci = *col_index.entry(col_key.clone()).or_insert_with(|| {
            col_keys.push((col_key.clone(), col_label));
            col_keys.len() - 1
        });
        *cells.entry((ri, ci)).or_insert(Amount::ZERO) += record.amount;
    }

    // Axis ordering. Insertion keeps discovery order; the others sort the
    // (sort_key, label) pairs and we remap cell indices afterwards.
    let row_order = axis_order(&row_keys, sort);
    let col_order = axis_order(&col_keys, sort);

    let mut grid = vec![vec![Amount::ZERO; col_order.len()]; row_order.len()];
    for (new_ri, &old_ri) in row_order.iter().enumerate() {
        for (new_ci, &old_ci) in col_order.iter().enumerate() {
            if let Some(v) = cells.get(&(old_ri, old_ci)) {
                grid[new_ri][new_ci] = *v;
            }
        }
    }

    let mut table = PivotTable {
        row_labels: row_order.iter().map(|&i| row_keys[i].1.clone()).collect(),
        col_labels: col_order.iter().map(|&i| col_keys[i].1.clone()).collect(),
        row_totals: grid.iter().map(|row| row.iter().sum()).collect(),
        col_totals: (0..col_order.len())
            .map(|ci| grid.iter().map(|row| row[ci]).sum())
            .collect(),
        grand_total: grid.iter().flatten().sum(),
        cells: grid,
    };

    // Prune rows whose every cell is zero; totals were computed above, so
    // the cross-check is unaffected. A row whose cells cancel to a zero
    // total still has visible amounts and stays, matching the table rule.
    let keep: Vec<bool> = table
        .cells
        .iter()
        .map(|row| row.iter().any(|c| !c.is_zero()))
        .collect();
    if keep.iter().any(|k| !k) {
        log::debug!(
            "pruned {} all-zero pivot row(s)",
            keep.iter().filter(|k| !**k).count()
        );
        let mut idx = 0;
        table.row_labels.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
        let mut idx = 0;
        table.cells.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
        let mut idx = 0;
        table.row_totals.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
    }

    Ok(table)
}

fn axis_order(keys: &[(String, String)], sort: SortOrder) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    match sort {
        SortOrder::Insertion => {}
        SortOrder::Alphabetical => {
            order.sort_by_cached_key(|&i| keys[i].1.to_lowercase());
        }
        SortOrder::Chronological => {
            order.sort_by(|&a, &b| keys[a].0.cmp(&keys[b].0));
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn rec(d: u32, account: &str, amount: &str) -> Record {
        Record::new(day(d), account, Amount::parse(amount).unwrap())
    }

    fn assert_subtotal_invariant(group: &Group) {
        match &group.children {
            GroupChildren::Records(rs) => {
                let sum: Amount = rs.iter().map(|r| r.amount).sum();
                // Pruned zero rows contribute nothing, so sums still match.
                assert_eq!(group.subtotal, sum, "leaf subtotal mismatch");
            }
            GroupChildren::Groups(gs) => {
                let sum: Amount = gs.iter().map(|g| g.subtotal).sum();
                assert_eq!(group.subtotal, sum, "parent subtotal mismatch");
                for g in gs {
                    assert_subtotal_invariant(g);
                }
            }
        }
    }

    #[test]
    fn test_single_level_grouping() {
        let records = vec![
            rec(1, "Checking", "10.00"),
            rec(1, "Checking", "5.50"),
            rec(2, "Savings", "100.00"),
        ];
        let root = group_records(&records, &[Dimension::Date], SortOrder::Insertion).unwrap();
        assert_eq!(root.subtotal, Amount::parse("115.50").unwrap());
        let GroupChildren::Groups(groups) = &root.children else {
            panic!("root should hold groups");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].subtotal, Amount::parse("15.50").unwrap());
        assert_subtotal_invariant(&root);
    }

    #[test]
    fn test_nested_grouping_subtotals() {
        let records = vec![
            rec(1, "Checking", "10.00"),
            rec(1, "Savings", "20.00"),
            rec(2, "Checking", "30.00"),
        ];
        let root = group_records(
            &records,
            &[Dimension::Date, Dimension::Account],
            SortOrder::Chronological,
        )
        .unwrap();
        assert_eq!(root.subtotal, Amount::parse("60.00").unwrap());
        assert_subtotal_invariant(&root);
    }

    #[test]
    fn test_zero_rows_pruned_after_totals() {
        let records = vec![
            rec(1, "Checking", "10.00"),
            rec(1, "Checking", "0.00"),
            rec(2, "Savings", "0.00"),
        ];
        let root = group_records(&records, &[Dimension::Date], SortOrder::Insertion).unwrap();
        assert_eq!(root.subtotal, Amount::parse("10.00").unwrap());
        let GroupChildren::Groups(groups) = &root.children else {
            panic!()
        };
        // The all-zero March 2 group disappears entirely.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].record_count(), 1);
    }

    #[test]
    fn test_cancelling_group_keeps_rows() {
        let records = vec![rec(1, "Checking", "10.00"), rec(1, "Checking", "-10.00")];
        let root = group_records(&records, &[Dimension::Date], SortOrder::Insertion).unwrap();
        let GroupChildren::Groups(groups) = &root.children else {
            panic!()
        };
        assert_eq!(groups.len(), 1);
        assert!(groups[0].subtotal.is_zero());
        assert_eq!(groups[0].record_count(), 2);
    }

    #[test]
    fn test_alphabetical_sort_is_case_insensitive() {
        let records = vec![
            rec(1, "zebra Fund", "1.00"),
            rec(1, "Alpha Fund", "1.00"),
            rec(1, "beta Fund", "1.00"),
        ];
        let root = group_records(&records, &[Dimension::Account], SortOrder::Alphabetical).unwrap();
        let GroupChildren::Groups(groups) = &root.children else {
            panic!()
        };
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha Fund", "beta Fund", "zebra Fund"]);
    }

    #[test]
    fn test_missing_dimension_fails_fast() {
        let records = vec![rec(1, "Checking", "10.00")];
        let err = group_records(&records, &[Dimension::Member], SortOrder::Insertion).unwrap_err();
        assert!(matches!(err, ReportError::MissingField { field: "member", .. }));
    }

    #[test]
    fn test_pivot_cross_check() {
        let records = vec![
            rec(1, "Checking", "10.00").with_category("Utilities"),
            rec(1, "Checking", "5.00").with_category("Missions"),
            rec(2, "Savings", "20.00").with_category("Utilities"),
        ];
        let table = pivot_records(
            &records,
            Dimension::Account,
            Dimension::Category,
            SortOrder::Insertion,
        )
        .unwrap();
        let row_sum: Amount = table.row_totals.iter().sum();
        let col_sum: Amount = table.col_totals.iter().sum();
        assert_eq!(row_sum, table.grand_total);
        assert_eq!(col_sum, table.grand_total);
        assert_eq!(table.grand_total, Amount::parse("35.00").unwrap());
        // Savings × Missions was never touched: zero cell retained.
        assert_eq!(table.cells[1][1], Amount::ZERO);
    }

    #[test]
    fn test_pivot_empty_input() {
        let table = pivot_records(&[], Dimension::Account, Dimension::Category, SortOrder::Insertion)
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.grand_total, Amount::ZERO);
        assert!(table.row_totals.is_empty());
        assert!(table.col_totals.is_empty());
    }

    #[test]
    fn test_pivot_cancelling_row_keeps_cells() {
        let records = vec![
            rec(1, "Building", "100.00").with_category("Jan"),
            rec(1, "Building", "-100.00").with_category("Feb"),
            rec(1, "Office", "50.00").with_category("Jan"),
        ];
        let table = pivot_records(
            &records,
            Dimension::Account,
            Dimension::Category,
            SortOrder::Alphabetical,
        )
        .unwrap();
        // Building's cells cancel but are nonzero, so the row survives.
        assert_eq!(table.row_labels, vec!["Building", "Office"]);
        assert!(table.row_totals[0].is_zero());
        // Every column total is accounted for by visible cells.
        let feb = table.col_labels.iter().position(|l| l == "Feb").unwrap();
        assert_eq!(table.col_totals[feb], Amount::parse("-100.00").unwrap());
        assert_eq!(table.cells[0][feb], Amount::parse("-100.00").unwrap());
        let row_sum: Amount = table.row_totals.iter().sum();
        assert_eq!(row_sum, table.grand_total);
    }

    #[test]
    fn test_pivot_all_zero_row_pruned() {
        let records = vec![
            rec(1, "Building", "10.00").with_category("Jan"),
            rec(1, "Office", "0.00").with_category("Jan"),
        ];
        let table = pivot_records(
            &records,
            Dimension::Account,
            Dimension::Category,
            SortOrder::Alphabetical,
        )
        .unwrap();
        assert_eq!(table.row_labels, vec!["Building"]);
        assert_eq!(table.grand_total, Amount::parse("10.00").unwrap());
    }

    #[test]
    fn test_pivot_chronological_axis() {
        let records = vec![
            rec(9, "Checking", "1.00").with_category("B"),
            rec(2, "Checking", "1.00").with_category("A"),
        ];
        let table = pivot_records(
            &records,
            Dimension::Date,
            Dimension::Category,
            SortOrder::Chronological,
        )
        .unwrap();
        assert_eq!(table.row_labels[0], "March 2, 2026");
        assert_eq!(table.row_labels[1], "March 9, 2026");
    }
}
