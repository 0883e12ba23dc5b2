use crate::boundary::BoundaryCollection;
use crate::error::Result;
use crate::types::{RawRow, Record};
use crate::util::{date_period, parse_date_safe, parse_f64_safe, parse_i32_safe, parse_month_safe};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// KOSTAT 2018 municipality boundaries from the southkorea-maps project.
pub const DEFAULT_GEOJSON_URL: &str = "https://raw.githubusercontent.com/southkorea/southkorea-maps/master/kostat/2018/json/skorea-municipalities-2018-geo.json";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows dropped for a missing region name or period.
    pub parse_errors: usize,
    /// Values that were missing, non-numeric or negative and became zero.
    pub coerced_values: usize,
}

pub fn load_records(path: impl AsRef<Path>) -> Result<(Vec<Record>, LoadReport)> {
    let file = std::fs::File::open(path)?;
    load_records_from_reader(file)
}

/// Read and clean the record table.
///
/// Values are normalized here, once: anything that is not a non-negative
/// number becomes `0.0`. A row needs a province, a district and a year,
/// either from the year/month columns or from a `YYYY-MM-DD` date.
pub fn load_records_from_reader<R: Read>(rdr: R) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(rdr);
    let mut report = LoadReport::default();
    let mut records: Vec<Record> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("row {}: {e}", report.total_rows);
                report.parse_errors += 1;
                continue;
            }
        };

        // Names are kept as written; only blank ones drop the row.
        let province = row.province.unwrap_or_default();
        let district = row.district.unwrap_or_default();
        if province.trim().is_empty() || district.trim().is_empty() {
            report.parse_errors += 1;
            continue;
        }

        let from_date = parse_date_safe(row.date.as_deref()).map(date_period);
        let period_year = match parse_i32_safe(row.period_year.as_deref()) {
            Some(y) => y,
            None => match from_date {
                Some((y, _)) => y,
                None => {
                    report.parse_errors += 1;
                    continue;
                }
            },
        };
        let period_month = match row.period_month.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => match parse_month_safe(Some(m)) {
                Some(m) => Some(m),
                None => {
                    report.parse_errors += 1;
                    continue;
                }
            },
            _ => from_date.map(|(_, m)| m),
        };

        let value = match parse_f64_safe(row.value.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                report.coerced_values += 1;
                0.0
            }
        };

        records.push(Record {
            province,
            district,
            period_year,
            period_month,
            value,
        });
    }

    report.loaded_rows = records.len();
    log::info!(
        "loaded {} of {} rows ({} skipped, {} values set to zero)",
        report.loaded_rows,
        report.total_rows,
        report.parse_errors,
        report.coerced_values
    );
    Ok((records, report))
}

pub fn load_boundaries(path: impl AsRef<Path>) -> Result<BoundaryCollection> {
    let text = std::fs::read_to_string(path)?;
    let collection = BoundaryCollection::from_json_str(text.trim_start_matches('\u{feff}'))?;
    log::info!("loaded {} boundary features", collection.len());
    Ok(collection)
}

/// Download a boundary collection.
///
/// # Errors
///
/// [`crate::RegionMapError::Http`] for connection, timeout or status
/// failures; JSON and shape errors as for [`load_boundaries`].
pub fn fetch_boundaries(url: &str, timeout: Duration) -> Result<BoundaryCollection> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    log::info!("fetching boundaries from {url}");
    let text = client.get(url).send()?.error_for_status()?.text()?;
    let collection = BoundaryCollection::from_json_str(text.trim_start_matches('\u{feff}'))?;
    log::info!("fetched {} boundary features", collection.len());
    Ok(collection)
}

/// Try `url` first, then the local file. Without a URL only the file is read.
///
/// # Errors
///
/// The local file's error when both sources fail.
pub fn load_boundaries_or_fetch(
    url: Option<&str>,
    path: impl AsRef<Path>,
    timeout: Duration,
) -> Result<BoundaryCollection> {
    if let Some(url) = url {
        match fetch_boundaries(url, timeout) {
            Ok(c) => return Ok(c),
            Err(e) => log::warn!(
                "could not fetch boundaries ({e}), falling back to {}",
                path.as_ref().display()
            ),
        }
    }
    load_boundaries(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_korean_headers_and_coerces_values() {
        let csv = "광역시도, 기초지자체 ,배출연도,배출월,배출량(톤)\n\
                   서울특별시,종로구,2023,5,\"1,200.5\"\n\
                   서울특별시,중구,2023,5,\n\
                   서울특별시,용산구,2023,5,abc\n\
                   서울특별시,강남구,2023,5,-3\n";
        let (records, report) = load_records_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].value, 1200.5);
        assert_eq!(records[0].period_month, Some(5));
        assert!(records[1..].iter().all(|r| r.value == 0.0));
        assert_eq!(report.coerced_values, 3);
        assert_eq!(report.parse_errors, 0);
    }

    #[test]
    fn padded_names_stay_distinct_through_aggregation() {
        let csv = "province,district,year,month,value\n\
                   서울특별시,종로구,2023,5,1\n\
                   서울특별시,종로구 ,2023,5,2\n";
        let (records, _) = load_records_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records[1].district, "종로구 ");
        let entries = crate::aggregate::aggregate(&records, 2023, Some(5));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].total_value, 1.0);
        assert_eq!(entries[1].total_value, 2.0);
    }

    #[test]
    fn exponent_values_are_numeric() {
        let csv = "province,district,year,month,value\n\
                   서울특별시,종로구,2023,5,1.5e3\n\
                   서울특별시,중구,2023,5,2E-05\n";
        let (records, report) = load_records_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records[0].value, 1500.0);
        assert_eq!(records[1].value, 2e-5);
        assert_eq!(report.coerced_values, 0);
    }

    #[test]
    fn bad_url_is_an_http_error() {
        let err = fetch_boundaries("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, crate::RegionMapError::Http(_)));
    }

    #[test]
    fn failed_fetch_falls_back_to_file() {
        let dir = std::env::temp_dir().join(format!("region_choropleth_fetch_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("b.geojson");
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{"name":"종로구"}}]}"#,
        )
        .unwrap();

        let c = load_boundaries_or_fetch(Some("not a url"), &path, Duration::from_secs(1)).unwrap();
        assert_eq!(c.len(), 1);
        let c = load_boundaries_or_fetch(None, &path, Duration::from_secs(1)).unwrap();
        assert_eq!(c.len(), 1);

        let missing = dir.join("missing.geojson");
        let err = load_boundaries_or_fetch(Some("not a url"), &missing, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, crate::RegionMapError::Io(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn accepts_english_headers_and_dates() {
        let csv = "province,district,date,value\n\
                   부산광역시,해운대구,2022-11-03,4\n\
                   부산광역시,해운대구,not-a-date,4\n";
        let (records, report) = load_records_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period_year, 2022);
        assert_eq!(records[0].period_month, Some(11));
        assert_eq!(report.parse_errors, 1);
    }

    #[test]
    fn annual_rows_have_no_month() {
        let csv = "province,district,year,value\n대구광역시,수성구,2021,8\n";
        let (records, _) = load_records_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records[0].period_month, None);
    }

    #[test]
    fn skips_rows_without_region_or_period() {
        let csv = "province,district,year,month,value\n\
                   ,종로구,2023,5,1\n\
                   서울특별시,종로구,,5,1\n\
                   서울특별시,종로구,2023,13,1\n\
                   서울특별시,종로구,2023,5,1\n";
        let (records, report) = load_records_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.parse_errors, 3);
    }
}
