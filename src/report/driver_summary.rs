use chrono::NaiveDate;
use tracing::{debug, warn};

use super::accumulator::{CumulativeTotals, PageAccumulator};
use crate::charges::SortDir;
use crate::error::{FareflowError, Result};
use crate::fetch::LoadState;
use crate::models::DriverSummaryPage;

/// Parameters of a driver-summary report; changing any of them starts over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub page_size: usize,
    pub sort: String,
    pub direction: SortDir,
}

impl ReportQuery {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, page_size: usize) -> Self {
        ReportQuery {
            start_date,
            end_date,
            page_size,
            sort: "driverName".to_string(),
            direction: SortDir::Asc,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.end_date < self.start_date {
            return Err(FareflowError::Validation(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if self.page_size == 0 {
            return Err(FareflowError::Validation(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_params(&self, page: usize) -> Vec<(&'static str, String)> {
        vec![
            ("startDate", self.start_date.to_string()),
            ("endDate", self.end_date.to_string()),
            ("page", page.to_string()),
            ("size", self.page_size.to_string()),
            ("sort", self.sort.clone()),
            ("direction", self.direction.to_string()),
        ]
    }
}

/// Where report pages come from
pub trait DriverSummarySource {
    fn driver_summary(&self, query: &ReportQuery, page: usize) -> Result<DriverSummaryPage>;
}

/// The driver-summary report view: current page plus running totals
#[derive(Debug, Default)]
pub struct DriverSummaryReport {
    query: Option<ReportQuery>,
    page: Option<DriverSummaryPage>,
    accumulator: PageAccumulator,
    state: LoadState,
}

impl DriverSummaryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn query(&self) -> Option<&ReportQuery> {
        self.query.as_ref()
    }

    pub fn page(&self) -> Option<&DriverSummaryPage> {
        self.page.as_ref()
    }

    pub fn totals(&self) -> &CumulativeTotals {
        self.accumulator.totals()
    }

    /// Start a report for `query` at its first page. If the fetch fails the
    /// previous report stays on screen.
    pub fn generate<S: DriverSummarySource>(
        &mut self,
        source: &S,
        query: ReportQuery,
    ) -> Result<&CumulativeTotals> {
        query.validate()?;
        self.state = LoadState::Loading;
        debug!(start = %query.start_date, end = %query.end_date, "generating driver summary");

        let first = match source.driver_summary(&query, 0) {
            Ok(page) => page,
            Err(e) => return Err(self.fail(e)),
        };

        self.accumulator.reset();
        self.accumulator.on_page_loaded(&first)?;
        self.query = Some(query);
        self.page = Some(first);
        self.state = LoadState::Loaded;
        Ok(self.accumulator.totals())
    }

    pub fn next_page<S: DriverSummarySource>(&mut self, source: &S) -> Result<&CumulativeTotals> {
        let current = self.page.as_ref().ok_or(FareflowError::NoReport)?;
        if current.is_last() {
            return Err(FareflowError::Validation("already on the last page".to_string()));
        }
        let next = current.page_index + 1;
        self.goto(source, next)
    }

    pub fn previous_page<S: DriverSummarySource>(&mut self, source: &S) -> Result<&CumulativeTotals> {
        let current = self.page.as_ref().ok_or(FareflowError::NoReport)?;
        if current.is_first() {
            return Err(FareflowError::Validation("already on the first page".to_string()));
        }
        let prev = current.page_index - 1;
        self.goto(source, prev)
    }

    pub fn last_page<S: DriverSummarySource>(&mut self, source: &S) -> Result<&CumulativeTotals> {
        let current = self.page.as_ref().ok_or(FareflowError::NoReport)?;
        let last = current.total_pages.saturating_sub(1);
        self.goto(source, last)
    }

    /// Load page `index` of the current report. Jumping forward past a page
    /// that has not been seen is refused before any request is made.
    ///
    /// After a jump from the first page straight to the last, the pages in
    /// between are still unseen, so `previous_page` from there fails with
    /// `PageOutOfSequence`; go back to page 0 and walk forward instead.
    pub fn goto<S: DriverSummarySource>(
        &mut self,
        source: &S,
        index: usize,
    ) -> Result<&CumulativeTotals> {
        let query = self.query.clone().ok_or(FareflowError::NoReport)?;
        let total_pages = self.page.as_ref().map_or(0, |p| p.total_pages);

        if index >= total_pages.max(1) {
            return Err(FareflowError::Validation(format!(
                "page {} does not exist (report has {} page(s))",
                index + 1,
                total_pages
            )));
        }
        if !self.accumulator.accepts(index, total_pages) {
            return Err(FareflowError::PageOutOfSequence {
                requested: index,
                next: self.accumulator.visited_pages(),
            });
        }

        self.state = LoadState::Loading;
        let page = match source.driver_summary(&query, index) {
            Ok(page) => page,
            Err(e) => return Err(self.fail(e)),
        };

        if let Err(e) = self.accumulator.on_page_loaded(&page) {
            // The server's page count moved under us; keep what we had
            self.state = LoadState::Loaded;
            return Err(e);
        }
        self.page = Some(page);
        self.state = LoadState::Loaded;
        Ok(self.accumulator.totals())
    }

    fn fail(&mut self, e: FareflowError) -> FareflowError {
        warn!(error = %e, "driver summary fetch failed; keeping previous totals");
        self.state = LoadState::Failed(e.to_string());
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DriverSummary, SummaryTotals};
    use rust_decimal::Decimal;
    use std::cell::{Cell, RefCell};

    /// Serves a report of `total` drivers where each driver owes 1.00
    struct ScriptedSource {
        total: usize,
        fail: Cell<bool>,
        requests: RefCell<Vec<usize>>,
    }

    impl ScriptedSource {
        fn new(total: usize) -> Self {
            ScriptedSource {
                total,
                fail: Cell::new(false),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl DriverSummarySource for ScriptedSource {
        fn driver_summary(&self, query: &ReportQuery, page: usize) -> Result<DriverSummaryPage> {
            self.requests.borrow_mut().push(page);
            if self.fail.get() {
                return Err(FareflowError::Network {
                    url: "http://fleet.test/reports/driver-summary".to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            let size = query.page_size;
            let start = page * size;
            let count = size.min(self.total.saturating_sub(start));
            let items = (start..start + count)
                .map(|i| DriverSummary {
                    driver_id: i as i64,
                    driver_name: format!("Driver {i}"),
                    is_owner: false,
                    totals: SummaryTotals::default(),
                })
                .collect();
            Ok(DriverSummaryPage {
                items,
                page_index: page,
                total_pages: self.total.div_ceil(size),
                total_elements: self.total as u64,
                page_totals: SummaryTotals {
                    net_owed: Decimal::new(count as i64, 0),
                    ..Default::default()
                },
                grand_totals: SummaryTotals {
                    net_owed: Decimal::new(999, 0),
                    ..Default::default()
                },
            })
        }
    }

    fn query(size: usize) -> ReportQuery {
        ReportQuery::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            size,
        )
    }

    #[test]
    fn walks_forward_to_the_last_page_and_back() {
        let source = ScriptedSource::new(120);
        let mut report = DriverSummaryReport::new();

        assert_eq!(report.generate(&source, query(50)).unwrap().driver_count, 50);
        assert_eq!(report.next_page(&source).unwrap().driver_count, 100);
        let last = report.next_page(&source).unwrap();
        assert_eq!(last.driver_count, 120);
        assert_eq!(last.totals.net_owed, Decimal::new(999, 0));
        assert!(report.next_page(&source).is_err());

        let back = report.previous_page(&source).unwrap();
        assert_eq!(back.driver_count, 100);
        assert_eq!(back.totals.net_owed, Decimal::new(100, 0));
        assert_eq!(report.state(), &LoadState::Loaded);
    }

    #[test]
    fn jumping_over_unseen_pages_is_refused_without_a_request() {
        let source = ScriptedSource::new(500);
        let mut report = DriverSummaryReport::new();
        report.generate(&source, query(50)).unwrap();

        let err = report.goto(&source, 4).unwrap_err();
        assert!(matches!(
            err,
            FareflowError::PageOutOfSequence { requested: 4, next: 1 }
        ));
        assert_eq!(*source.requests.borrow(), vec![0]);
        assert_eq!(report.totals().driver_count, 50);

        // The final page is always reachable
        assert_eq!(report.last_page(&source).unwrap().driver_count, 500);
    }

    #[test]
    fn failed_fetch_keeps_previous_totals() {
        let source = ScriptedSource::new(120);
        let mut report = DriverSummaryReport::new();
        report.generate(&source, query(50)).unwrap();
        let before = report.totals().clone();

        source.fail.set(true);
        assert!(matches!(
            report.next_page(&source),
            Err(FareflowError::Network { .. })
        ));
        assert!(matches!(report.state(), LoadState::Failed(_)));
        assert_eq!(report.totals(), &before);
        assert_eq!(report.page().unwrap().page_index, 0);

        assert!(report.generate(&source, query(10)).is_err());
        assert_eq!(report.query().unwrap().page_size, 50);
        assert_eq!(report.totals(), &before);
    }

    #[test]
    fn new_parameters_restart_at_page_zero() {
        let source = ScriptedSource::new(120);
        let mut report = DriverSummaryReport::new();
        report.generate(&source, query(50)).unwrap();
        report.next_page(&source).unwrap();

        let mut resorted = query(50);
        resorted.direction = SortDir::Desc;
        let totals = report.generate(&source, resorted).unwrap();
        assert_eq!(totals.driver_count, 50);
        assert_eq!(report.page().unwrap().page_index, 0);
    }

    #[test]
    fn navigation_needs_a_report() {
        let source = ScriptedSource::new(10);
        let mut report = DriverSummaryReport::new();
        assert!(matches!(report.next_page(&source), Err(FareflowError::NoReport)));
        assert!(source.requests.borrow().is_empty());
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let mut q = query(50);
        std::mem::swap(&mut q.start_date, &mut q.end_date);
        assert!(q.validate().is_err());
        let params = query(25).to_params(3);
        assert!(params.contains(&("page", "3".to_string())));
        assert!(params.contains(&("direction", "asc".to_string())));
    }

    #[test]
    fn previous_after_jumping_to_last_needs_a_walk_from_the_start() {
        let source = ScriptedSource::new(200);
        let mut report = DriverSummaryReport::new();
        report.generate(&source, query(50)).unwrap();
        report.last_page(&source).unwrap();

        assert!(matches!(
            report.previous_page(&source),
            Err(FareflowError::PageOutOfSequence { requested: 2, next: 1 })
        ));
        assert_eq!(report.page().unwrap().page_index, 3);

        assert_eq!(report.goto(&source, 0).unwrap().driver_count, 50);
        assert_eq!(report.next_page(&source).unwrap().driver_count, 100);
    }
}
