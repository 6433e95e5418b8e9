//! Conversion between swim-time text and canonical seconds.
//!
//! Accepted text forms are plain seconds (`27.43`) and `minutes:seconds` (`1:02.33`).
//! Anything else degrades to `None`; nothing here panics or returns an error.

use crate::types::Value;

/// Parse a swim time into seconds.
///
/// - Leading/trailing whitespace is ignored.
/// - Empty or digit-free text (`""`, `"DQ"`, `"NT"`) is `None`.
/// - `M:SS.ss` is split on the colon; both parts must parse as decimals.
/// - Text with more than one colon (`1:02:03`) is `None`.
/// - Negative or non-finite results are `None`.
///
/// ```rust
/// use swim_rankings::processing::time_codec::parse_time;
///
/// assert_eq!(parse_time("1:00.50"), Some(60.5));
/// assert_eq!(parse_time(" 27.43 "), Some(27.43));
/// assert_eq!(parse_time("DQ"), None);
/// ```
pub fn parse_time(text: &str) -> Option<f64> {
    let text = text.trim();
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    let seconds = match text.split_once(':') {
        Some((minutes, rest)) => {
            let minutes = parse_decimal(minutes)?;
            let seconds = parse_decimal(rest)?;
            minutes * 60.0 + seconds
        }
        None => parse_decimal(text)?,
    };

    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

fn parse_decimal(s: &str) -> Option<f64> {
    // `f64::from_str` also accepts "inf"/"nan"; those never reach a valid time.
    s.trim().parse::<f64>().ok()
}

/// Format seconds as a swim time.
///
/// Seconds are rounded to hundredths first. Times under one minute have no minute prefix
/// (`27.43`); longer times are `M:SS.ss` (`1:02.33`).
///
/// ```rust
/// use swim_rankings::processing::time_codec::format_time;
///
/// assert_eq!(format_time(62.33), "1:02.33");
/// assert_eq!(format_time(33.75), "33.75");
/// ```
pub fn format_time(seconds: f64) -> String {
    let centis = (seconds * 100.0).round() as i64;
    let minutes = centis / 6_000;
    let secs = (centis % 6_000) as f64 / 100.0;
    if minutes > 0 {
        format!("{minutes}:{secs:05.2}")
    } else {
        format!("{secs:.2}")
    }
}

/// Canonical time of an untyped cell.
///
/// Numeric cells are taken as seconds, text goes through [`parse_time`]. Empty and boolean
/// cells have no time.
pub fn time_from_cell(cell: &Value) -> Option<f64> {
    match cell {
        Value::Null | Value::Bool(_) => None,
        Value::Int64(i) => (*i >= 0).then_some(*i as f64),
        Value::Float64(f) => (f.is_finite() && *f >= 0.0).then_some(*f),
        Value::Utf8(s) => parse_time(s),
    }
}
