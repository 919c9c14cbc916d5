use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Invalid month {month} for year {year}")]
    InvalidMonth {
        year: i32,
        month: u32
    },
    #[error("Report range starts after it ends")]
    ReversedRange
}

impl ReportError {
    pub fn invalid_month(year: i32, month: u32) -> Self {
        Self::InvalidMonth { year, month }
    }
}
