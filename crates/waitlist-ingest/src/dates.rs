//! Registry date cells.

use chrono::NaiveDate;
use thiserror::Error;

/// A non-empty cell that matches none of the accepted date layouts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized date '{0}'")]
pub struct InvalidDate(pub String);

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d%b%Y", "%Y%m%d"];

/// Whether a cell stands for a missing value.
pub fn is_null(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "." || value.eq_ignore_ascii_case("NA")
}

/// Parse a registry date cell.
///
/// Accepts `YYYY-MM-DD`, an ISO datetime (date part kept), `MM/DD/YYYY`,
/// SAS `DDMONYYYY` and `YYYYMMDD`. Null markers yield `Ok(None)`.
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, InvalidDate> {
    if is_null(raw) {
        return Ok(None);
    }
    let value = raw.trim();
    let date_part = match value.char_indices().nth(10) {
        Some((idx, 'T' | ' ')) => &value[..idx],
        _ => value,
    };
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .map(Some)
        .ok_or_else(|| InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn accepts_registry_layouts() {
        let expected = Some(date(2016, 3, 7));
        assert_eq!(parse_date("2016-03-07"), Ok(expected));
        assert_eq!(parse_date(" 2016-03-07T00:00:00 "), Ok(expected));
        assert_eq!(parse_date("2016-03-07 13:45:00"), Ok(expected));
        assert_eq!(parse_date("03/07/2016"), Ok(expected));
        assert_eq!(parse_date("07MAR2016"), Ok(expected));
        assert_eq!(parse_date("07mar2016"), Ok(expected));
        assert_eq!(parse_date("20160307"), Ok(expected));
    }

    #[test]
    fn null_markers_are_missing() {
        for value in ["", "  ", ".", "NA", "na"] {
            assert_eq!(parse_date(value), Ok(None), "{value:?}");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            parse_date("2016-13-40"),
            Err(InvalidDate("2016-13-40".to_string()))
        );
        assert!(parse_date("yesterday").is_err());
    }
}
