//! Date parsing, formatting, and the report date range.

use time::macros::format_description;
use time::{Date, Month, OffsetDateTime};

use crate::error::{Error, Result};

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_iso_date(value: &str) -> Result<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).map_err(|_| Error::InvalidDate {
        value: value.to_string(),
    })
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format)
        .expect("year-month-day formatting cannot fail")
}

/// An inclusive begin/end date pair for the date-ranged resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub begin: Date,
    pub end: Date,
}

impl DateRange {
    #[must_use]
    pub fn new(begin: Date, end: Date) -> Self {
        Self { begin, end }
    }

    /// January 1st of the current year through today, in UTC.
    #[must_use]
    pub fn year_to_date() -> Self {
        let today = OffsetDateTime::now_utc().date();
        Self {
            begin: start_of_year(today),
            end: today,
        }
    }

    /// Build a range from optional `YYYY-MM-DD` strings. Each end defaults
    /// independently: begin to January 1st of the current year, end to
    /// today.
    pub fn from_strings(begin: Option<&str>, end: Option<&str>) -> Result<Self> {
        let today = OffsetDateTime::now_utc().date();
        let begin = match begin {
            Some(value) => parse_iso_date(value)?,
            None => start_of_year(today),
        };
        let end = match end {
            Some(value) => parse_iso_date(value)?,
            None => today,
        };
        Ok(Self { begin, end })
    }

    /// The `view` query parameter value: `<begin>_<end>`.
    #[must_use]
    pub fn view_parameter(&self) -> String {
        format!(
            "{}_{}",
            format_iso_date(self.begin),
            format_iso_date(self.end)
        )
    }
}

fn start_of_year(today: Date) -> Date {
    Date::from_calendar_date(today.year(), Month::January, 1)
        .expect("January 1st exists in every year")
}
