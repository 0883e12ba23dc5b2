use crate::types::{AggregateEntry, Record, TopRow};
use crate::util::format_number;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Sum `value` per `(province, district)` for one period.
///
/// `month = None` selects the whole year. Entries come out in the order
/// their key was first seen, so equal inputs give equal outputs. Keys are
/// compared as-is; trimming is the binder's job.
pub fn aggregate(records: &[Record], year: i32, month: Option<u32>) -> Vec<AggregateEntry> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut entries: Vec<AggregateEntry> = Vec::new();
    for r in records
        .iter()
        .filter(|r| r.period_year == year && (month.is_none() || r.period_month == month))
    {
        let key = (r.province.as_str(), r.district.as_str());
        match index.get(&key) {
            Some(&i) => entries[i].total_value += r.value,
            None => {
                index.insert(key, entries.len());
                entries.push(AggregateEntry {
                    province: r.province.clone(),
                    district: r.district.clone(),
                    total_value: r.value,
                });
            }
        }
    }
    entries
}

pub fn grand_total(entries: &[AggregateEntry]) -> f64 {
    entries.iter().map(|e| e.total_value).sum()
}

/// Entries sorted by `total_value` descending. The sort is stable, so ties
/// keep their encounter order.
pub fn ranked(entries: &[AggregateEntry]) -> Vec<AggregateEntry> {
    let mut v = entries.to_vec();
    v.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(Ordering::Equal)
    });
    v
}

pub fn top_rows(entries: &[AggregateEntry], n: usize) -> Vec<TopRow> {
    let total = grand_total(entries);
    ranked(entries)
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, e)| {
            let share = if total > 0.0 {
                e.total_value / total * 100.0
            } else {
                0.0
            };
            TopRow {
                rank: idx + 1,
                province: e.province,
                district: e.district,
                value: format_number(e.total_value, 2),
                share: format!("{}%", format_number(share, 2)),
            }
        })
        .collect()
}

/// Distinct years in the table, ascending.
pub fn available_years(records: &[Record]) -> Vec<i32> {
    records
        .iter()
        .map(|r| r.period_year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct months in the table, ascending. Empty for annual data.
pub fn available_months(records: &[Record]) -> Vec<u32> {
    records
        .iter()
        .filter_map(|r| r.period_month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Latest year and earliest month, or `None` for an empty table.
pub fn default_period(records: &[Record]) -> Option<(i32, Option<u32>)> {
    let year = *available_years(records).last()?;
    Some((year, available_months(records).first().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(province: &str, district: &str, year: i32, month: u32, value: f64) -> Record {
        Record {
            province: province.to_string(),
            district: district.to_string(),
            period_year: year,
            period_month: Some(month),
            value,
        }
    }

    #[test]
    fn sums_per_district_for_the_selected_month() {
        let records = vec![
            rec("서울특별시", "종로구", 2023, 5, 10.0),
            rec("서울특별시", "종로구", 2023, 5, 5.0),
            rec("서울특별시", "종로구", 2023, 6, 100.0),
        ];
        let entries = aggregate(&records, 2023, Some(5));
        assert_eq!(
            entries,
            vec![AggregateEntry {
                province: "서울특별시".to_string(),
                district: "종로구".to_string(),
                total_value: 15.0,
            }]
        );
    }

    #[test]
    fn same_district_under_different_provinces_stays_separate() {
        let records = vec![
            rec("서울특별시", "중구", 2023, 1, 1.0),
            rec("부산광역시", "중구", 2023, 1, 2.0),
        ];
        let entries = aggregate(&records, 2023, Some(1));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].province, "서울특별시");
        assert_eq!(entries[1].total_value, 2.0);
    }

    #[test]
    fn keys_are_not_trimmed() {
        let records = vec![
            rec("서울특별시", "종로구", 2023, 1, 1.0),
            rec("서울특별시", "종로구 ", 2023, 1, 1.0),
        ];
        assert_eq!(aggregate(&records, 2023, Some(1)).len(), 2);
    }

    #[test]
    fn empty_period_is_empty_not_error() {
        let records = vec![rec("서울특별시", "종로구", 2023, 5, 10.0)];
        assert!(aggregate(&records, 2022, Some(5)).is_empty());
        assert!(aggregate(&[], 2023, Some(5)).is_empty());
    }

    #[test]
    fn whole_year_when_month_is_none() {
        let records = vec![
            rec("서울특별시", "종로구", 2023, 5, 10.0),
            rec("서울특별시", "종로구", 2023, 6, 5.0),
            rec("서울특별시", "종로구", 2022, 6, 7.0),
        ];
        let entries = aggregate(&records, 2023, None);
        assert_eq!(entries[0].total_value, 15.0);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let records = vec![
            rec("A", "a", 2023, 1, 1.0),
            rec("A", "b", 2023, 1, 3.0),
            rec("A", "c", 2023, 1, 1.0),
        ];
        let entries = aggregate(&records, 2023, Some(1));
        let names: Vec<_> = ranked(&entries).into_iter().map(|e| e.district).collect();
        assert_eq!(names, vec!["b", "a", "c"]);

        let top = top_rows(&entries, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].share, "60.00%");
    }

    #[test]
    fn periods_and_default_selection() {
        let records = vec![
            rec("A", "a", 2021, 7, 1.0),
            rec("A", "a", 2023, 3, 1.0),
            rec("A", "a", 2022, 1, 1.0),
        ];
        assert_eq!(available_years(&records), vec![2021, 2022, 2023]);
        assert_eq!(available_months(&records), vec![1, 3, 7]);
        assert_eq!(default_period(&records), Some((2023, Some(1))));
        assert_eq!(default_period(&[]), None);
    }
}
