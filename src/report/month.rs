use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, Context};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

/// Calendar month used to select records. Shifting by any amount of months always produces a
/// valid month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthCursor {
    year: i32,
    /// 1 based.
    month: u32,
}

impl MonthCursor {
    pub fn new_opt(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn containing<Tz: TimeZone>(date: &DateTime<Tz>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Moves by whole months, rolling over years in both directions.
    pub fn shift(self, offset: i32) -> Self {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) + offset as i64;
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// Displays as `March 2024`.
impl Display for MonthCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.first_day() {
            Some(day) => write!(f, "{}", day.format("%B %Y")),
            None => write!(f, "{:04}-{:02}", self.year, self.month),
        }
    }
}

/// Parses `YYYY-MM`.
impl FromStr for MonthCursor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| anyhow!("Expected YYYY-MM, got {s}"))?;
        let year = year
            .parse::<i32>()
            .with_context(|| format!("Failed to parse year in {s}"))?;
        let month = month
            .parse::<u32>()
            .with_context(|| format!("Failed to parse month in {s}"))?;
        MonthCursor::new_opt(year, month).ok_or_else(|| anyhow!("{month} is not a month"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::MonthCursor;

    fn month(year: i32, month: u32) -> MonthCursor {
        MonthCursor::new_opt(year, month).unwrap()
    }

    #[test]
    fn test_shift_rolls_over_years() {
        assert_eq!(month(2024, 12).shift(1), month(2025, 1));
        assert_eq!(month(2024, 1).shift(-1), month(2023, 12));
        assert_eq!(month(2024, 3).shift(-27), month(2021, 12));
        assert_eq!(month(2024, 3).shift(0), month(2024, 3));
        assert_eq!(month(2024, 3).shift(12 * 10 + 1), month(2034, 4));
    }

    #[test]
    fn test_shift_is_reversible() {
        let start = month(2024, 7);
        for offset in -40..40 {
            assert_eq!(start.shift(offset).shift(-offset), start);
        }
    }

    #[test]
    fn test_contains() {
        let january = month(2024, 1);

        assert!(january.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!january.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert!(!january.contains(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()));
    }

    #[test]
    fn test_containing() {
        let date = Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap();
        assert_eq!(MonthCursor::containing(&date), month(2024, 2));
    }

    #[test]
    fn test_parse_and_display() -> anyhow::Result<()> {
        let parsed: MonthCursor = "2024-03".parse()?;

        assert_eq!(parsed, month(2024, 3));
        assert_eq!(parsed.to_string(), "March 2024");
        assert!("2024-13".parse::<MonthCursor>().is_err());
        assert!("2024".parse::<MonthCursor>().is_err());
        assert!("march-2024".parse::<MonthCursor>().is_err());
        Ok(())
    }
}
