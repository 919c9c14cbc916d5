mod date_range;
mod errors;
mod grouping;
mod report;

pub use date_range::DateRange;
pub use errors::ReportError;
pub use grouping::{GroupBy, UNCATEGORIZED};
pub use report::{expense_breakdown, income_vs_expense, BreakdownEntry, IncomeExpenseEntry, Report, ReportFilter};
