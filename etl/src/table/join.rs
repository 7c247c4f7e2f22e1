//! Relational joins over [`Table`]s.
//!
//! - [`left_join`]: every left row survives, right columns attach where a key matches
//! - [`semi_join`]: left rows whose key appears on the right, no new columns
//!
//! Both keep the left table's row order. Null keys never match.

use polars::prelude::*;

use super::Table;
use crate::error::TableResult;

/// Temporary column carrying the left row position through a join.
const ROW_ORDER: &str = "__left_row";

fn ordered_join(left: &Table, right: &Table, on: &[&str], how: JoinType) -> TableResult<Table> {
    left.require(on)?;
    right.require(on)?;

    let keys: Vec<Expr> = on.iter().map(|name| col(*name)).collect();
    let plan = left
        .lazy()
        .with_row_index(ROW_ORDER, None)
        .join(right.lazy(), keys.clone(), keys, JoinArgs::new(how))
        .sort_by_exprs(
            [col(ROW_ORDER)],
            SortMultipleOptions::default().with_maintain_order(true),
        );

    let joined = left.collect(plan)?;
    let frame = joined.frame().drop(ROW_ORDER).map_err(|e| left.frame_error(e))?;
    Ok(Table::new(left.name(), frame))
}

/// Left join on the `on` columns.
///
/// A left row with several right matches fans out. Non-key columns present
/// on both sides keep the left name; the right one gets a `_right` suffix.
pub fn left_join(left: &Table, right: &Table, on: &[&str]) -> TableResult<Table> {
    ordered_join(left, right, on, JoinType::Left)
}

/// Keep left rows whose `on` tuple appears in `right`.
///
/// Duplicate right rows do not duplicate left rows, and no right columns are
/// added.
pub fn semi_join(left: &Table, right: &Table, on: &[&str]) -> TableResult<Table> {
    ordered_join(left, right, on, JoinType::Semi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: Vec<Column>) -> Table {
        Table::new(name, DataFrame::new(columns).unwrap())
    }

    fn ints(table: &Table, name: &str) -> Vec<Option<i64>> {
        table.column(name).unwrap().i64().unwrap().into_iter().collect()
    }

    fn sales() -> Table {
        table(
            "sales",
            vec![
                Column::new("shop_id".into(), vec![1i64, 1, 2, 3]),
                Column::new("item_id".into(), vec![10i64, 11, 10, 12]),
            ],
        )
    }

    fn items() -> Table {
        table(
            "items",
            vec![
                Column::new("item_id".into(), vec![10i64, 11]),
                Column::new("item_category_id".into(), vec![5i64, 6]),
            ],
        )
    }

    #[test]
    fn test_left_join_preserves_rows() {
        let joined = left_join(&sales(), &items(), &["item_id"]).unwrap();

        assert_eq!(joined.name(), "sales");
        assert_eq!(joined.row_count(), sales().row_count());
        assert_eq!(
            joined.column_names(),
            vec!["shop_id", "item_id", "item_category_id"]
        );
        assert_eq!(ints(&joined, "shop_id"), vec![Some(1), Some(1), Some(2), Some(3)]);
        assert_eq!(
            ints(&joined, "item_category_id"),
            vec![Some(5), Some(6), Some(5), None]
        );
    }

    #[test]
    fn test_left_join_null_key_never_matches() {
        let left = table(
            "l",
            vec![Column::new("item_id".into(), vec![None, Some(10i64)])],
        );
        let right = table(
            "r",
            vec![
                Column::new("item_id".into(), vec![None, Some(10i64)]),
                Column::new("item_category_id".into(), vec![1i64, 5]),
            ],
        );

        let joined = left_join(&left, &right, &["item_id"]).unwrap();
        assert_eq!(ints(&joined, "item_category_id"), vec![None, Some(5)]);
    }

    #[test]
    fn test_left_join_fans_out_duplicates() {
        let right = table(
            "items",
            vec![
                Column::new("item_id".into(), vec![12i64, 12]),
                Column::new("item_category_id".into(), vec![7i64, 8]),
            ],
        );
        let joined = left_join(&sales(), &right, &["item_id"]).unwrap();
        assert_eq!(joined.row_count(), 5);
        assert_eq!(ints(&joined, "shop_id"), vec![Some(1), Some(1), Some(2), Some(3), Some(3)]);
    }

    #[test]
    fn test_left_join_suffixes_collisions() {
        let right = items()
            .with_column(Column::new("shop_id".into(), vec![9i64, 9]))
            .unwrap();
        let joined = left_join(&sales(), &right, &["item_id"]).unwrap();
        assert!(joined.has_column("shop_id"));
        assert!(joined.has_column("shop_id_right"));
    }

    #[test]
    fn test_left_join_missing_key() {
        assert!(left_join(&sales(), &items(), &["item_category_id"]).is_err());
    }

    #[test]
    fn test_semi_join_filters() {
        let filter = table(
            "filter",
            vec![
                Column::new("shop_id".into(), vec![1i64, 1, 3]),
                Column::new("item_id".into(), vec![10i64, 10, 12]),
            ],
        );

        let kept = semi_join(&sales(), &filter, &["shop_id", "item_id"]).unwrap();

        assert_eq!(kept.row_count(), 2);
        assert_eq!(kept.column_names(), vec!["shop_id", "item_id"]);
        assert_eq!(ints(&kept, "shop_id"), vec![Some(1), Some(3)]);
        assert_eq!(ints(&kept, "item_id"), vec![Some(10), Some(12)]);
    }

    #[test]
    fn test_semi_join_empty_filter() {
        let filter = table(
            "filter",
            vec![
                Column::new("shop_id".into(), Vec::<i64>::new()),
                Column::new("item_id".into(), Vec::<i64>::new()),
            ],
        );
        let kept = semi_join(&sales(), &filter, &["shop_id", "item_id"]).unwrap();
        assert_eq!(kept.row_count(), 0);
        assert_eq!(kept.column_names(), vec!["shop_id", "item_id"]);
    }
}
