//! Year of assessment identifiers

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Month in which a South African year of assessment starts (March)
const YEAR_START_MONTH: u32 = 3;

/// A year of assessment, keyed by the calendar year in which it ends.
///
/// `TaxYear(2025)` runs from 1 March 2024 to 28 February 2025 and is
/// displayed as `2024/25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Year of assessment that contains the given date
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= YEAR_START_MONTH {
            TaxYear(date.year() + 1)
        } else {
            TaxYear(date.year())
        }
    }

    /// Calendar year in which this year of assessment ends
    pub fn end_year(&self) -> i32 {
        self.0
    }

    /// First day of the year of assessment
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0 - 1, YEAR_START_MONTH, 1)
    }

    /// Last day of the year of assessment (end of February)
    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, YEAR_START_MONTH, 1).and_then(|d| d.pred_opt())
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.0 - 1, self.0.rem_euclid(100))
    }
}

/// Error returned when a tax year label cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tax year '{0}', expected e.g. 2025 or 2024/25")]
pub struct ParseTaxYearError(pub String);

impl FromStr for TaxYear {
    type Err = ParseTaxYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseTaxYearError(trimmed.to_string());

        match trimmed.split_once('/') {
            None => trimmed.parse::<i32>().map(TaxYear).map_err(|_| err()),
            Some((start, end)) => {
                let start: i32 = start.trim().parse().map_err(|_| err())?;
                let end: i32 = end.trim().parse().map_err(|_| err())?;
                let year = start + 1;
                // "2024/25" or "2024/2025"
                if end == year || end == year.rem_euclid(100) {
                    Ok(TaxYear(year))
                } else {
                    Err(err())
                }
            }
        }
    }
}

impl TryFrom<String> for TaxYear {
    type Error = ParseTaxYearError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaxYear> for String {
    fn from(year: TaxYear) -> Self {
        year.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let year = TaxYear(2025);
        assert_eq!(year.to_string(), "2024/25");
        assert_eq!("2024/25".parse::<TaxYear>().unwrap(), year);
        assert_eq!("2025".parse::<TaxYear>().unwrap(), year);
        assert_eq!("2024/2025".parse::<TaxYear>().unwrap(), year);
        assert!("2024/27".parse::<TaxYear>().is_err());
        assert!("next year".parse::<TaxYear>().is_err());
    }

    #[test]
    fn test_containing() {
        let feb = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let mar = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(TaxYear::containing(feb), TaxYear(2025));
        assert_eq!(TaxYear::containing(mar), TaxYear(2026));
    }

    #[test]
    fn test_year_bounds() {
        let year = TaxYear(2024);
        assert_eq!(year.first_day(), NaiveDate::from_ymd_opt(2023, 3, 1));
        // 2024 is a leap year
        assert_eq!(year.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_serde_uses_label() {
        let json = serde_json::to_string(&TaxYear(2026)).unwrap();
        assert_eq!(json, "\"2025/26\"");
        let back: TaxYear = serde_json::from_str("\"2025/26\"").unwrap();
        assert_eq!(back, TaxYear(2026));
    }
}
