use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Declares the driver-summary money fields once: the totals struct used
/// everywhere, plus the two prefixed wire shapes the report page carries
/// (page-local subtotals and server grand totals).
macro_rules! summary_totals {
    ($( $(#[$doc:meta])* $field:ident => $page_key:literal, $grand_key:literal; )+) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct SummaryTotals {
            $( $(#[$doc])* #[serde(default)] pub $field: Decimal, )+
        }

        impl SummaryTotals {
            /// Field-wise sum
            pub fn add(&self, other: &SummaryTotals) -> SummaryTotals {
                SummaryTotals { $( $field: self.$field + other.$field, )+ }
            }
        }

        #[derive(Debug, Default, Deserialize)]
        struct PageSubtotals {
            $( #[serde(rename = $page_key, default)] $field: Decimal, )+
        }

        #[derive(Debug, Default, Deserialize)]
        struct GrandTotals {
            $( #[serde(rename = $grand_key, default)] $field: Decimal, )+
        }

        impl From<PageSubtotals> for SummaryTotals {
            fn from(t: PageSubtotals) -> Self {
                SummaryTotals { $( $field: t.$field, )+ }
            }
        }

        impl From<GrandTotals> for SummaryTotals {
            fn from(t: GrandTotals) -> Self {
                SummaryTotals { $( $field: t.$field, )+ }
            }
        }
    };
}

summary_totals! {
    lease_revenue => "pageLeaseRevenue", "grandLeaseRevenue";
    credit_card_revenue => "pageCreditCardRevenue", "grandCreditCardRevenue";
    charges_revenue => "pageChargesRevenue", "grandChargesRevenue";
    other_revenue => "pageOtherRevenue", "grandOtherRevenue";
    total_revenue => "pageTotalRevenue", "grandTotalRevenue";
    fixed_expense => "pageFixedExpense", "grandFixedExpense";
    variable_expense => "pageVariableExpense", "grandVariableExpense";
    insurance_expense => "pageInsuranceExpense", "grandInsuranceExpense";
    commission => "pageCommission", "grandCommission";
    total_expense => "pageTotalExpense", "grandTotalExpense";
    total_paid => "pageTotalPaid", "grandTotalPaid";
    /// Revenue minus expenses minus payments already made
    net_owed => "pageNetOwed", "grandNetOwed";
}

/// One driver's line in the driver-summary report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSummary {
    pub driver_id: i64,
    pub driver_name: String,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(flatten)]
    pub totals: SummaryTotals,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDriverSummaryPage {
    #[serde(default)]
    driver_summaries: Vec<DriverSummary>,
    #[serde(alias = "page", alias = "number", default)]
    current_page: usize,
    #[serde(default)]
    total_pages: usize,
    #[serde(default)]
    total_elements: u64,
    #[serde(flatten)]
    page_totals: PageSubtotals,
    #[serde(flatten)]
    grand_totals: GrandTotals,
}

/// One server response to `GET /reports/driver-summary`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireDriverSummaryPage")]
pub struct DriverSummaryPage {
    pub items: Vec<DriverSummary>,
    /// 0-based
    pub page_index: usize,
    pub total_pages: usize,
    pub total_elements: u64,
    pub page_totals: SummaryTotals,
    pub grand_totals: SummaryTotals,
}

impl From<WireDriverSummaryPage> for DriverSummaryPage {
    fn from(w: WireDriverSummaryPage) -> Self {
        DriverSummaryPage {
            items: w.driver_summaries,
            page_index: w.current_page,
            total_pages: w.total_pages,
            total_elements: w.total_elements,
            page_totals: w.page_totals.into(),
            grand_totals: w.grand_totals.into(),
        }
    }
}

impl DriverSummaryPage {
    pub fn is_first(&self) -> bool {
        self.page_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.page_index + 1 >= self.total_pages
    }
}

/// One line of an aggregate revenue/expense report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateLine {
    #[serde(alias = "name", alias = "category")]
    pub label: String,
    #[serde(default)]
    pub count: Option<u64>,
    pub amount: Decimal,
}

/// Response of the lease / credit-card / charges revenue and fixed-expense reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(alias = "total")]
    pub total_amount: Decimal,
    #[serde(default, alias = "items", alias = "breakdown")]
    pub lines: Vec<AggregateLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_separates_page_and_grand_totals() {
        let body = json!({
            "driverSummaries": [
                {"driverId": 1, "driverName": "Ann Lee", "leaseRevenue": 500, "netOwed": 120.5},
                {"driverId": 2, "driverName": "Bo Diaz", "netOwed": "80.25"}
            ],
            "currentPage": 1,
            "totalPages": 3,
            "totalElements": 120,
            "pageNetOwed": 200.75,
            "pageLeaseRevenue": 500,
            "grandNetOwed": "9001.10",
            "grandLeaseRevenue": 25000
        });
        let page: DriverSummaryPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page_index, 1);
        assert!(!page.is_first());
        assert!(!page.is_last());
        assert_eq!(page.page_totals.net_owed, Decimal::new(20075, 2));
        assert_eq!(page.grand_totals.net_owed, Decimal::new(900110, 2));
        assert_eq!(page.grand_totals.lease_revenue, Decimal::new(25000, 0));
        assert_eq!(page.page_totals.commission, Decimal::ZERO);
        assert_eq!(page.items[1].totals.net_owed, Decimal::new(8025, 2));
    }

    #[test]
    fn add_is_field_wise() {
        let a = SummaryTotals {
            net_owed: Decimal::new(110, 1),
            commission: Decimal::new(2, 0),
            ..Default::default()
        };
        let b = SummaryTotals {
            net_owed: Decimal::new(220, 1),
            total_paid: Decimal::new(5, 0),
            ..Default::default()
        };
        let sum = a.add(&b);
        assert_eq!(sum.net_owed, Decimal::new(33, 0));
        assert_eq!(sum.commission, Decimal::new(2, 0));
        assert_eq!(sum.total_paid, Decimal::new(5, 0));
    }

    #[test]
    fn aggregate_report_accepts_aliases() {
        let report: AggregateReport = serde_json::from_value(json!({
            "startDate": "2025-01-01",
            "endDate": "2025-01-31",
            "total": 1500,
            "items": [{"name": "Weekly lease", "count": 10, "amount": 1500}]
        }))
        .unwrap();
        assert_eq!(report.lines[0].label, "Weekly lease");
        assert_eq!(report.total_amount, Decimal::new(1500, 0));
    }
}
