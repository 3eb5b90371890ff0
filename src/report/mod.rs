//! Driver-summary reporting: running totals across pages and the report
//! view that drives page navigation.

mod accumulator;
mod driver_summary;

pub use accumulator::{CumulativeTotals, PageAccumulator};
pub use driver_summary::{DriverSummaryReport, DriverSummarySource, ReportQuery};
