use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::reports::ReportError;
use crate::types::ParseError;

/// Reporting window, resolved against the current time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    /// Everything up to now.
    All,
    #[default]
    ThisMonth,
    LastMonth,
    ThisYear,
    /// From the first day of the start month to the last instant of the end month.
    Custom {
        start_year: i32,
        start_month: u32,
        end_year: i32,
        end_month: u32
    }
}

impl DateRange {
    /// Inclusive `(start, end)` bounds. Month ends are `23:59:59.999` on their last day.
    pub fn bounds(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), ReportError> {
        let (year, month) = (now.year(), now.month());

        match *self {
            DateRange::All => Ok((DateTime::<Utc>::UNIX_EPOCH, now)),
            DateRange::ThisMonth => Ok((start_of_month(year, month)?, end_of_month(year, month)?)),
            DateRange::LastMonth => {
                let (year, month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
                Ok((start_of_month(year, month)?, end_of_month(year, month)?))
            }
            DateRange::ThisYear => Ok((start_of_month(year, 1)?, end_of_month(year, 12)?)),
            DateRange::Custom { start_year, start_month, end_year, end_month } => {
                let start = start_of_month(start_year, start_month)?;
                let end = end_of_month(end_year, end_month)?;

                if start > end {
                    return Err(ReportError::ReversedRange)
                }

                Ok((start, end))
            }
        }
    }
}

fn start_of_month(year: i32, month: u32) -> Result<DateTime<Utc>, ReportError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|start| start.and_utc())
        .ok_or_else(|| ReportError::invalid_month(year, month))
}

fn end_of_month(year: i32, month: u32) -> Result<DateTime<Utc>, ReportError> {
    start_of_month(year, month)?
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::milliseconds(1))
        .ok_or_else(|| ReportError::invalid_month(year, month))
}

/// Accepts `all`, `this-month`, `last-month`, `this-year` or `YYYY-MM:YYYY-MM`.
impl FromStr for DateRange {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "this-month" | "thismonth" => Ok(DateRange::ThisMonth),
            "last-month" | "lastmonth" => Ok(DateRange::LastMonth),
            "this-year" | "thisyear" => Ok(DateRange::ThisYear),
            custom => parse_custom(custom).ok_or_else(|| ParseError::DateRange(value.to_string()))
        }
    }
}

fn parse_custom(value: &str) -> Option<DateRange> {
    let (start, end) = value.split_once(':')?;
    let (start_year, start_month) = parse_year_month(start)?;
    let (end_year, end_month) = parse_year_month(end)?;

    Some(DateRange::Custom { start_year, start_month, end_year, end_month })
}

fn parse_year_month(value: &str) -> Option<(i32, u32)> {
    let (year, month) = value.trim().split_once('-')?;
    Some((year.parse().ok()?, month.parse().ok()?))
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DateRange::All => write!(f, "all"),
            DateRange::ThisMonth => write!(f, "this-month"),
            DateRange::LastMonth => write!(f, "last-month"),
            DateRange::ThisYear => write!(f, "this-year"),
            DateRange::Custom { start_year, start_month, end_year, end_month } => {
                write!(f, "{start_year:04}-{start_month:02}:{end_year:04}-{end_month:02}")
            }
        }
    }
}
