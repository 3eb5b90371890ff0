mod bulk_edit;
mod export;
mod filters;

pub use bulk_edit::{BulkEditor, ChargeField, EditableRow, RowFailure, SaveReport};
pub use export::{export_csv, CSV_HEADER};
pub use filters::{ChargeFilters, ChargeQuery, FilterState, SortDir};

use tracing::debug;

use crate::error::{FareflowError, Result};
use crate::fetch::LoadState;
use crate::models::{AccountCharge, ChargeUpdate, Page};

/// Backend operations the charges table needs
pub trait ChargeStore: Sync {
    fn list_charges(&self, query: &ChargeQuery) -> Result<Page<AccountCharge>>;
    fn update_charge(&self, update: &ChargeUpdate) -> Result<AccountCharge>;
}

/// The account-charges table: filters, paging, sorting and bulk edit
#[derive(Debug)]
pub struct ChargesTable {
    pub filters: FilterState<ChargeFilters>,
    page: usize,
    size: usize,
    sort_by: String,
    sort_dir: SortDir,
    current: Option<Page<AccountCharge>>,
    state: LoadState,
    editor: BulkEditor,
}

impl ChargesTable {
    pub fn new(size: usize) -> Self {
        ChargesTable {
            filters: FilterState::new(),
            page: 0,
            size: size.max(1),
            sort_by: "tripDate".to_string(),
            sort_dir: SortDir::Desc,
            current: None,
            state: LoadState::Idle,
            editor: BulkEditor::new(),
        }
    }

    pub fn query(&self) -> ChargeQuery {
        ChargeQuery {
            filters: self.filters.applied().clone(),
            page: self.page,
            size: self.size,
            sort_by: self.sort_by.clone(),
            sort_dir: self.sort_dir,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn current(&self) -> Option<&Page<AccountCharge>> {
        self.current.as_ref()
    }

    pub fn charges(&self) -> &[AccountCharge] {
        self.current.as_ref().map_or(&[], |p| p.content.as_slice())
    }

    pub fn editor(&self) -> &BulkEditor {
        &self.editor
    }

    /// Fetch the page for the current query. A failure keeps the rows
    /// already shown.
    pub fn load<S: ChargeStore>(&mut self, store: &S) -> Result<&Page<AccountCharge>> {
        let query = self.query();
        self.state = LoadState::Loading;
        debug!(page = query.page, size = query.size, "loading charges");

        match store.list_charges(&query) {
            Ok(page) => {
                self.state = LoadState::Loaded;
                Ok(&*self.current.insert(page))
            }
            Err(e) => {
                self.state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Confirm the draft filters and reload from the first page
    pub fn apply_filters<S: ChargeStore>(&mut self, store: &S) -> Result<&Page<AccountCharge>> {
        self.filters.apply();
        self.page = 0;
        self.load(store)
    }

    pub fn clear_filters<S: ChargeStore>(&mut self, store: &S) -> Result<&Page<AccountCharge>> {
        self.filters.clear();
        self.page = 0;
        self.load(store)
    }

    pub fn sort<S: ChargeStore>(
        &mut self,
        store: &S,
        sort_by: &str,
        sort_dir: SortDir,
    ) -> Result<&Page<AccountCharge>> {
        self.sort_by = sort_by.to_string();
        self.sort_dir = sort_dir;
        self.page = 0;
        self.load(store)
    }

    pub fn goto<S: ChargeStore>(&mut self, store: &S, page: usize) -> Result<&Page<AccountCharge>> {
        self.page = page;
        self.load(store)
    }

    pub fn begin_bulk_edit(&mut self) -> Result<()> {
        let page = self.current.as_ref().ok_or_else(|| {
            FareflowError::Validation("load a page of charges before editing".to_string())
        })?;
        self.editor.enter(&page.content);
        Ok(())
    }

    pub fn change(&mut self, row: usize, field: ChargeField, value: impl Into<String>) -> Result<()> {
        self.editor.change(row, field, value)
    }

    pub fn cancel_bulk_edit(&mut self) {
        self.editor.cancel();
    }

    /// Save the bulk edit; after a full success the page is reloaded from
    /// the server rather than patched locally.
    pub fn save_bulk<S: ChargeStore>(&mut self, store: &S, concurrency: usize) -> Result<SaveReport> {
        let report = self.editor.save(store, concurrency)?;
        if report.is_success() {
            self.load(store)?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// In-memory backend keyed by id, filtered by `paid`
    struct MemoryStore {
        charges: Mutex<Vec<AccountCharge>>,
        queries: Mutex<Vec<ChargeQuery>>,
        fail_lists: bool,
    }

    impl MemoryStore {
        fn new(n: i64) -> Self {
            let charges = (1..=n)
                .map(|id| AccountCharge {
                    id,
                    job_code: Some(format!("J-{id}")),
                    trip_date: None,
                    passenger_name: None,
                    pickup_address: None,
                    dropoff_address: None,
                    fare_amount: Decimal::new(10 * id, 0),
                    tip_amount: Decimal::ZERO,
                    paid: id % 2 == 0,
                    invoice_number: None,
                    customer: None,
                    cab: None,
                    driver: None,
                })
                .collect();
            MemoryStore {
                charges: Mutex::new(charges),
                queries: Mutex::new(Vec::new()),
                fail_lists: false,
            }
        }
    }

    impl ChargeStore for MemoryStore {
        fn list_charges(&self, query: &ChargeQuery) -> Result<Page<AccountCharge>> {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail_lists {
                return Err(FareflowError::Network {
                    url: "memory".to_string(),
                    reason: "down".to_string(),
                });
            }
            let all: Vec<AccountCharge> = self
                .charges
                .lock()
                .unwrap()
                .iter()
                .filter(|c| query.filters.paid.map_or(true, |p| c.paid == p))
                .cloned()
                .collect();
            let total = all.len();
            let content = all
                .into_iter()
                .skip(query.page * query.size)
                .take(query.size)
                .collect();
            Ok(Page {
                content,
                number: query.page,
                size: query.size,
                total_elements: total as u64,
                total_pages: total.div_ceil(query.size),
            })
        }

        fn update_charge(&self, update: &ChargeUpdate) -> Result<AccountCharge> {
            let mut charges = self.charges.lock().unwrap();
            let charge = charges.iter_mut().find(|c| c.id == update.id).unwrap();
            charge.fare_amount = update.fare_amount;
            charge.tip_amount = update.tip_amount;
            charge.paid = update.paid;
            charge.job_code = update.job_code.clone();
            Ok(charge.clone())
        }
    }

    #[test]
    fn applying_filters_resets_to_first_page() {
        let store = MemoryStore::new(10);
        let mut table = ChargesTable::new(3);
        table.goto(&store, 2).unwrap();
        assert_eq!(table.charges()[0].id, 7);

        table.filters.draft_mut().paid = Some(true);
        assert_eq!(table.query().filters, ChargeFilters::default());

        let page = table.apply_filters(&store).unwrap();
        assert_eq!(page.number, 0);
        assert!(page.content.iter().all(|c| c.paid));
    }

    #[test]
    fn clearing_filters_returns_initial_result_set() {
        let store = MemoryStore::new(5);
        let mut table = ChargesTable::new(10);
        let initial = table.load(&store).unwrap().content.clone();

        table.filters.draft_mut().paid = Some(false);
        table.apply_filters(&store).unwrap();
        assert_ne!(table.charges(), initial.as_slice());

        table.clear_filters(&store).unwrap();
        table.apply_filters(&store).unwrap();
        assert_eq!(table.charges(), initial.as_slice());
    }

    #[test]
    fn bulk_save_reloads_from_server() {
        let store = MemoryStore::new(3);
        let mut table = ChargesTable::new(10);
        table.load(&store).unwrap();

        table.begin_bulk_edit().unwrap();
        table.change(0, ChargeField::FareAmount, "12.75").unwrap();
        table.change(1, ChargeField::Paid, "no").unwrap();
        let report = table.save_bulk(&store, 4).unwrap();

        assert!(report.is_success());
        assert!(!table.editor().is_active());
        assert_eq!(table.charges()[0].fare_amount, Decimal::new(1275, 2));
        assert!(!table.charges()[1].paid);
        assert_eq!(store.queries.lock().unwrap().len(), 2);
    }

    #[test]
    fn failed_load_keeps_previous_rows() {
        let mut store = MemoryStore::new(3);
        let mut table = ChargesTable::new(10);
        table.load(&store).unwrap();

        store.fail_lists = true;
        assert!(table.goto(&store, 1).is_err());
        assert!(matches!(table.state(), LoadState::Failed(_)));
        assert_eq!(table.charges().len(), 3);
    }

    #[test]
    fn bulk_edit_needs_a_loaded_page() {
        let mut table = ChargesTable::new(10);
        assert!(table.begin_bulk_edit().is_err());
    }
}
