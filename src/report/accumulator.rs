use serde::Serialize;
use tracing::debug;

use crate::error::{FareflowError, Result};
use crate::models::{DriverSummaryPage, SummaryTotals};

/// Totals across the report pages seen so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeTotals {
    #[serde(flatten)]
    pub totals: SummaryTotals,
    pub driver_count: u64,
}

/// Running totals over a paginated driver-summary report.
///
/// Pages must be visited in order from the first; the last page may be
/// reached from anywhere because it carries the server's grand totals.
/// The cumulative value after each in-order page is kept so stepping back
/// restores it instead of re-summing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAccumulator {
    current: CumulativeTotals,
    /// `visited[i]` is the cumulative value after page `i`
    visited: Vec<CumulativeTotals>,
}

impl PageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> &CumulativeTotals {
        &self.current
    }

    /// Number of pages seen in order from the first
    pub fn visited_pages(&self) -> usize {
        self.visited.len()
    }

    /// Back to the zero state; used whenever the report parameters change
    pub fn reset(&mut self) {
        self.current = CumulativeTotals::default();
        self.visited.clear();
    }

    /// Whether `page_index` can be folded in without skipping a page
    pub fn accepts(&self, page_index: usize, total_pages: usize) -> bool {
        page_index == 0 || page_index + 1 >= total_pages || page_index <= self.visited.len()
    }

    pub fn on_page_loaded(&mut self, page: &DriverSummaryPage) -> Result<&CumulativeTotals> {
        let idx = page.page_index;
        let items = page.items.len() as u64;

        if page.is_last() {
            // Grand totals are authoritative; never re-derive them by summing
            self.current = CumulativeTotals {
                totals: page.grand_totals.clone(),
                driver_count: page.total_elements,
            };
            if idx == 0 {
                self.visited = vec![self.current.clone()];
            } else if idx == self.visited.len() {
                self.visited.push(self.current.clone());
            }
        } else if idx == 0 {
            self.current = CumulativeTotals {
                totals: page.page_totals.clone(),
                driver_count: items,
            };
            self.visited = vec![self.current.clone()];
        } else if idx == self.visited.len() {
            let prior = &self.visited[idx - 1];
            self.current = CumulativeTotals {
                totals: prior.totals.add(&page.page_totals),
                driver_count: prior.driver_count + items,
            };
            self.visited.push(self.current.clone());
        } else if idx < self.visited.len() {
            self.current = self.visited[idx].clone();
        } else {
            return Err(FareflowError::PageOutOfSequence {
                requested: idx,
                next: self.visited.len(),
            });
        }

        debug!(
            page = idx,
            drivers = self.current.driver_count,
            net_owed = %self.current.totals.net_owed,
            "cumulative totals updated"
        );
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DriverSummary;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn totals(net_owed: &str, lease: &str) -> SummaryTotals {
        SummaryTotals {
            net_owed: dec(net_owed),
            lease_revenue: dec(lease),
            ..Default::default()
        }
    }

    fn drivers(n: usize, offset: i64) -> Vec<DriverSummary> {
        (0..n as i64)
            .map(|i| DriverSummary {
                driver_id: offset + i,
                driver_name: format!("Driver {}", offset + i),
                is_owner: false,
                totals: SummaryTotals::default(),
            })
            .collect()
    }

    /// 120 drivers at 50 per page: three pages, the last one short
    fn report_page(index: usize) -> DriverSummaryPage {
        let (count, page_totals) = match index {
            0 => (50, totals("1000.10", "5000")),
            1 => (50, totals("2000.20", "5000")),
            _ => (20, totals("400.05", "2000")),
        };
        DriverSummaryPage {
            items: drivers(count, (index * 50) as i64),
            page_index: index,
            total_pages: 3,
            total_elements: 120,
            page_totals,
            // Deliberately not the sum of the page subtotals
            grand_totals: totals("3400.00", "12000"),
        }
    }

    #[test]
    fn sequential_pages_accumulate_then_snap_to_grand_totals() {
        let mut acc = PageAccumulator::new();

        let t = acc.on_page_loaded(&report_page(0)).unwrap();
        assert_eq!(t.driver_count, 50);
        assert_eq!(t.totals.net_owed, dec("1000.10"));

        let t = acc.on_page_loaded(&report_page(1)).unwrap();
        assert_eq!(t.driver_count, 100);
        assert_eq!(t.totals.net_owed, dec("3000.30"));
        assert_eq!(t.totals.lease_revenue, dec("10000"));

        let t = acc.on_page_loaded(&report_page(2)).unwrap();
        assert_eq!(t.driver_count, 120);
        assert_eq!(t.totals.net_owed, dec("3400.00"));
        assert_ne!(t.totals.net_owed, dec("3400.35"));
        assert_eq!(t.totals.lease_revenue, dec("12000"));
    }

    #[test]
    fn intermediate_pages_are_exact_field_wise_sums() {
        let pages: Vec<DriverSummaryPage> = (0..5)
            .map(|i| DriverSummaryPage {
                items: drivers(10, i * 10),
                page_index: i as usize,
                total_pages: 6,
                total_elements: 60,
                page_totals: SummaryTotals {
                    net_owed: dec("0.10"),
                    commission: dec("0.20"),
                    total_paid: Decimal::new(i, 0),
                    ..Default::default()
                },
                grand_totals: SummaryTotals::default(),
            })
            .collect();

        let mut acc = PageAccumulator::new();
        for (k, page) in pages.iter().enumerate() {
            acc.on_page_loaded(page).unwrap();
            let expected = pages[..=k]
                .iter()
                .fold(SummaryTotals::default(), |sum, p| sum.add(&p.page_totals));
            assert_eq!(acc.totals().totals, expected);
            assert_eq!(acc.totals().driver_count, 10 * (k as u64 + 1));
        }
        // Ten cents five times is exactly fifty cents, no float drift
        assert_eq!(acc.totals().totals.net_owed, dec("0.50"));
    }

    #[test]
    fn jump_straight_to_last_page_uses_grand_totals() {
        let mut acc = PageAccumulator::new();
        acc.on_page_loaded(&report_page(0)).unwrap();
        let t = acc.on_page_loaded(&report_page(2)).unwrap();
        assert_eq!(t.totals.net_owed, dec("3400.00"));
        assert_eq!(t.driver_count, 120);
    }

    #[test]
    fn skipping_an_unvisited_middle_page_is_rejected() {
        let pages: Vec<DriverSummaryPage> = (0..4)
            .map(|i| {
                let mut p = report_page(i.min(1));
                p.page_index = i;
                p.total_pages = 5;
                p
            })
            .collect();

        let mut acc = PageAccumulator::new();
        acc.on_page_loaded(&pages[0]).unwrap();
        let before = acc.clone();

        assert!(!acc.accepts(2, 5));
        match acc.on_page_loaded(&pages[2]) {
            Err(FareflowError::PageOutOfSequence { requested, next }) => {
                assert_eq!(requested, 2);
                assert_eq!(next, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(acc, before);
    }

    #[test]
    fn stepping_back_restores_the_earlier_running_total() {
        let mut acc = PageAccumulator::new();
        acc.on_page_loaded(&report_page(0)).unwrap();
        acc.on_page_loaded(&report_page(1)).unwrap();
        let after_page_one = acc.totals().clone();
        acc.on_page_loaded(&report_page(2)).unwrap();

        let t = acc.on_page_loaded(&report_page(1)).unwrap();
        assert_eq!(t, &after_page_one);
        assert_eq!(t.driver_count, 100);

        // Forward again does not double count
        acc.on_page_loaded(&report_page(2)).unwrap();
        assert_eq!(acc.totals().driver_count, 120);
    }

    #[test]
    fn reset_then_first_page_matches_a_fresh_report() {
        let mut used = PageAccumulator::new();
        used.on_page_loaded(&report_page(0)).unwrap();
        used.on_page_loaded(&report_page(1)).unwrap();
        used.reset();
        assert_eq!(used.totals(), &CumulativeTotals::default());
        used.on_page_loaded(&report_page(0)).unwrap();

        let mut fresh = PageAccumulator::new();
        fresh.on_page_loaded(&report_page(0)).unwrap();

        assert_eq!(used, fresh);
    }

    #[test]
    fn single_page_report_shows_grand_totals() {
        let page = DriverSummaryPage {
            items: drivers(3, 0),
            page_index: 0,
            total_pages: 1,
            total_elements: 3,
            page_totals: totals("10", "0"),
            grand_totals: totals("10", "0"),
        };
        let mut acc = PageAccumulator::new();
        let t = acc.on_page_loaded(&page).unwrap();
        assert_eq!(t.driver_count, 3);
        assert_eq!(t.totals.net_owed, dec("10"));
    }

    #[test]
    fn empty_report_is_all_zero() {
        let page = DriverSummaryPage {
            items: Vec::new(),
            page_index: 0,
            total_pages: 0,
            total_elements: 0,
            page_totals: SummaryTotals::default(),
            grand_totals: SummaryTotals::default(),
        };
        let mut acc = PageAccumulator::new();
        assert_eq!(acc.on_page_loaded(&page).unwrap(), &CumulativeTotals::default());
    }
}
