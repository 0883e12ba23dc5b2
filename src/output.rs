use crate::error::Result;
use crate::types::AggregateEntry;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Serialize)]
struct AggregateCsvRow<'a> {
    province: &'a str,
    district: &'a str,
    value: f64,
}

/// Aggregates as `province,district,value`, UTF-8 with a BOM so spreadsheet
/// tools pick up the Hangul correctly.
pub fn write_aggregate_csv(path: impl AsRef<Path>, entries: &[AggregateEntry]) -> Result<()> {
    let mut buf: Vec<u8> = "\u{feff}".as_bytes().to_vec();
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);
        for e in entries {
            wtr.serialize(AggregateCsvRow {
                province: &e.province,
                district: &e.district,
                value: e.total_value,
            })?;
        }
        wtr.flush()?;
    }
    std::fs::write(path, buf)?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// `2023_5` for a monthly selection, `2023` for a whole year.
pub fn period_suffix(year: i32, month: Option<u32>) -> String {
    match month {
        Some(m) => format!("{year}_{m}"),
        None => year.to_string(),
    }
}
