use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error: unknown transaction type '{0}'")]
    TransactionType(String),
    #[error("Parse error: unknown grouping '{0}'")]
    GroupBy(String),
    #[error("Parse error: unknown date range '{0}'")]
    DateRange(String)
}
