// Utility helpers for parsing, name normalization and number formatting.
//
// This module centralizes the "dirty" CSV handling so the rest of the code
// can assume clean, typed values.
use chrono::{Datelike, NaiveDate};
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Accepts exponent notation (`1.5e3`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed, including
///   `NaN` and infinities.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Spreadsheet exports sometimes write integers as `2023.0`.
    s.parse::<i32>()
        .ok()
        .or_else(|| s.strip_suffix(".0").and_then(|t| t.parse::<i32>().ok()))
}

/// Month in `1..=12`, anything else is `None`.
pub fn parse_month_safe(s: Option<&str>) -> Option<u32> {
    parse_i32_safe(s)
        .filter(|m| (1..=12).contains(m))
        .map(|m| m as u32)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `(year, month)` of a parsed date.
pub fn date_period(d: NaiveDate) -> (i32, u32) {
    (d.year(), d.month())
}

/// Remove every whitespace character, not only ASCII spaces.
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// True if `s` has a Hangul syllable or compatibility jamo.
pub fn contains_hangul(s: &str) -> bool {
    s.chars()
        .any(|c| ('\u{3131}'..='\u{3163}').contains(&c) || ('\u{AC00}'..='\u{D7A3}').contains(&c))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forgiving_numbers() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("1.5e3")), Some(1500.0));
        assert_eq!(parse_f64_safe(Some("2E-05")), Some(0.00002));
    }

    #[test]
    fn parses_months_in_range() {
        assert_eq!(parse_month_safe(Some("5")), Some(5));
        assert_eq!(parse_month_safe(Some("12.0")), Some(12));
        assert_eq!(parse_month_safe(Some("13")), None);
        assert_eq!(parse_month_safe(Some("0")), None);
    }

    #[test]
    fn strips_all_whitespace() {
        assert_eq!(strip_whitespace(" 수 원\t시\u{3000}"), "수원시");
    }

    #[test]
    fn detects_hangul() {
        assert!(contains_hangul("종로구"));
        assert!(contains_hangul("ㄱ"));
        assert!(!contains_hangul("Jongno-gu"));
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 1), "-42.0");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn derives_period_from_date() {
        let d = parse_date_safe(Some("2023-05-17")).unwrap();
        assert_eq!(date_period(d), (2023, 5));
    }
}
