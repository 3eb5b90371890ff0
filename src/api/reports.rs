use chrono::NaiveDate;
use std::fmt;

use super::ApiClient;
use crate::error::Result;
use crate::models::{AggregateReport, DriverSummaryPage};
use crate::report::{DriverSummarySource, ReportQuery};

/// The date-range reports that return a single aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    LeaseRevenue,
    CreditCardRevenue,
    ChargesRevenue,
    FixedExpenses,
}

impl AggregateKind {
    fn path(self) -> &'static str {
        match self {
            AggregateKind::LeaseRevenue => "/reports/lease-revenue",
            AggregateKind::CreditCardRevenue => "/reports/credit-card-revenue",
            AggregateKind::ChargesRevenue => "/reports/charges-revenue",
            AggregateKind::FixedExpenses => "/reports/fixed-expenses",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AggregateKind::LeaseRevenue => "Lease revenue",
            AggregateKind::CreditCardRevenue => "Credit card revenue",
            AggregateKind::ChargesRevenue => "Charges revenue",
            AggregateKind::FixedExpenses => "Fixed expenses",
        })
    }
}

impl ApiClient {
    pub fn aggregate_report(
        &self,
        kind: AggregateKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AggregateReport> {
        self.get(
            kind.path(),
            &[("startDate", start.to_string()), ("endDate", end.to_string())],
        )
    }
}

impl DriverSummarySource for ApiClient {
    fn driver_summary(&self, query: &ReportQuery, page: usize) -> Result<DriverSummaryPage> {
        self.get("/reports/driver-summary", &query.to_params(page))
    }
}
