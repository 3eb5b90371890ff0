use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info, warn};

use super::ChargeStore;
use crate::error::{FareflowError, Result};
use crate::models::{AccountCharge, ChargeUpdate};

/// The business fields of a charge that can be edited in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChargeField {
    JobCode,
    PassengerName,
    PickupAddress,
    DropoffAddress,
    FareAmount,
    TipAmount,
    Paid,
    InvoiceNumber,
    CustomerId,
    CabId,
    DriverId,
}

impl ChargeField {
    pub const ALL: [ChargeField; 11] = [
        ChargeField::JobCode,
        ChargeField::PassengerName,
        ChargeField::PickupAddress,
        ChargeField::DropoffAddress,
        ChargeField::FareAmount,
        ChargeField::TipAmount,
        ChargeField::Paid,
        ChargeField::InvoiceNumber,
        ChargeField::CustomerId,
        ChargeField::CabId,
        ChargeField::DriverId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChargeField::JobCode => "job_code",
            ChargeField::PassengerName => "passenger_name",
            ChargeField::PickupAddress => "pickup_address",
            ChargeField::DropoffAddress => "dropoff_address",
            ChargeField::FareAmount => "fare_amount",
            ChargeField::TipAmount => "tip_amount",
            ChargeField::Paid => "paid",
            ChargeField::InvoiceNumber => "invoice_number",
            ChargeField::CustomerId => "customer_id",
            ChargeField::CabId => "cab_id",
            ChargeField::DriverId => "driver_id",
        }
    }
}

impl fmt::Display for ChargeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChargeField {
    type Err = FareflowError;

    /// Accepts `fare_amount`, `fare-amount` and `fareAmount`
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        ChargeField::ALL
            .into_iter()
            .find(|f| f.name().replace('_', "") == wanted)
            .ok_or_else(|| FareflowError::UnknownField(s.to_string()))
    }
}

/// A displayed charge plus the raw text typed into its cells
#[derive(Debug, Clone, PartialEq)]
pub struct EditableRow {
    charge: AccountCharge,
    edits: BTreeMap<ChargeField, String>,
}

impl EditableRow {
    fn new(charge: AccountCharge) -> Self {
        EditableRow {
            charge,
            edits: BTreeMap::new(),
        }
    }

    pub fn charge(&self) -> &AccountCharge {
        &self.charge
    }

    pub fn edit(&self, field: ChargeField) -> Option<&str> {
        self.edits.get(&field).map(String::as_str)
    }

    pub fn is_edited(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Current cell text: the edit if there is one, else the record's value
    pub fn value(&self, field: ChargeField) -> String {
        if let Some(edit) = self.edit(field) {
            return edit.to_string();
        }
        let c = &self.charge;
        match field {
            ChargeField::JobCode => c.job_code.clone().unwrap_or_default(),
            ChargeField::PassengerName => c.passenger_name.clone().unwrap_or_default(),
            ChargeField::PickupAddress => c.pickup_address.clone().unwrap_or_default(),
            ChargeField::DropoffAddress => c.dropoff_address.clone().unwrap_or_default(),
            ChargeField::FareAmount => c.fare_amount.to_string(),
            ChargeField::TipAmount => c.tip_amount.to_string(),
            ChargeField::Paid => c.paid.to_string(),
            ChargeField::InvoiceNumber => c.invoice_number.clone().unwrap_or_default(),
            ChargeField::CustomerId => id_text(c.customer.as_ref().map(|r| r.id)),
            ChargeField::CabId => id_text(c.cab.as_ref().map(|r| r.id)),
            ChargeField::DriverId => id_text(c.driver.as_ref().map(|r| r.id)),
        }
    }

    /// Build the update body for this row. `row` is the 0-based index,
    /// only used in errors.
    pub fn to_update(&self, row: usize) -> Result<ChargeUpdate> {
        let mut update = ChargeUpdate::from(&self.charge);

        for (field, raw) in &self.edits {
            let text = raw.trim();
            match field {
                ChargeField::JobCode => update.job_code = optional_text(text),
                ChargeField::PassengerName => update.passenger_name = optional_text(text),
                ChargeField::PickupAddress => update.pickup_address = optional_text(text),
                ChargeField::DropoffAddress => update.dropoff_address = optional_text(text),
                ChargeField::InvoiceNumber => update.invoice_number = optional_text(text),
                ChargeField::FareAmount => {
                    update.fare_amount =
                        Decimal::from_str(text).map_err(|_| FareflowError::InvalidAmount {
                            row,
                            field: "fare amount".to_string(),
                            value: raw.clone(),
                        })?;
                }
                // An unreadable tip is treated as no tip
                ChargeField::TipAmount => {
                    update.tip_amount = Decimal::from_str(text).unwrap_or(Decimal::ZERO);
                }
                ChargeField::Paid => update.paid = parse_paid(row, text)?,
                ChargeField::CustomerId => update.customer_id = parse_id(row, *field, text)?,
                ChargeField::CabId => update.cab_id = parse_id(row, *field, text)?,
                ChargeField::DriverId => update.driver_id = parse_id(row, *field, text)?,
            }
        }

        Ok(update)
    }
}

fn id_text(id: Option<i64>) -> String {
    id.map(|i| i.to_string()).unwrap_or_default()
}

fn optional_text(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn parse_paid(row: usize, text: &str) -> Result<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "paid" => Ok(true),
        "" | "false" | "no" | "n" | "0" | "unpaid" => Ok(false),
        _ => Err(FareflowError::Validation(format!(
            "row {}: paid must be yes or no, got '{text}'",
            row + 1
        ))),
    }
}

fn parse_id(row: usize, field: ChargeField, text: &str) -> Result<Option<i64>> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<i64>().map(Some).map_err(|_| {
        FareflowError::Validation(format!(
            "row {}: {field} must be a numeric id, got '{text}'",
            row + 1
        ))
    })
}

/// A row whose update request did not succeed
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub row: usize,
    pub charge_id: i64,
    pub reason: String,
}

/// Outcome of a bulk save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub submitted: usize,
    pub updated: usize,
    pub failures: Vec<RowFailure>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// In-place editing of every row on the current page
#[derive(Debug, Default)]
pub struct BulkEditor {
    rows: Option<Vec<EditableRow>>,
}

impl BulkEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.rows.is_some()
    }

    /// Editable rows, empty when not editing
    pub fn rows(&self) -> &[EditableRow] {
        self.rows.as_deref().unwrap_or(&[])
    }

    /// Snapshot the displayed rows. The caller's list is never modified.
    pub fn enter(&mut self, items: &[AccountCharge]) {
        debug!(rows = items.len(), "entering bulk edit");
        self.rows = Some(items.iter().cloned().map(EditableRow::new).collect());
    }

    /// Set one field of one row; nothing else is touched or validated
    pub fn change(&mut self, row: usize, field: ChargeField, value: impl Into<String>) -> Result<()> {
        let rows = self.rows.as_mut().ok_or(FareflowError::NotEditing)?;
        let count = rows.len();
        let target = rows
            .get_mut(row)
            .ok_or(FareflowError::RowOutOfRange { row, count })?;
        target.edits.insert(field, value.into());
        Ok(())
    }

    /// Throw the edits away
    pub fn cancel(&mut self) {
        if self.rows.take().is_some() {
            debug!("bulk edit cancelled");
        }
    }

    /// One update body per row, in row order. Any invalid row fails the
    /// whole batch before a single request is sent.
    pub fn payloads(&self) -> Result<Vec<ChargeUpdate>> {
        let rows = self.rows.as_ref().ok_or(FareflowError::NotEditing)?;
        rows.iter()
            .enumerate()
            .map(|(i, row)| row.to_update(i))
            .collect()
    }

    /// Submit every row through `store` with at most `concurrency` requests
    /// in flight.
    ///
    /// On full success the editor leaves edit mode; the caller is expected
    /// to reload the page from the server. On any failure the edits are kept
    /// so the save can be retried.
    pub fn save<S: ChargeStore>(&mut self, store: &S, concurrency: usize) -> Result<SaveReport> {
        let payloads = self.payloads()?;
        let results = dispatch(store, &payloads, concurrency);

        let mut failures: Vec<RowFailure> = results
            .into_iter()
            .filter_map(|(row, result)| {
                result.err().map(|e| RowFailure {
                    row,
                    charge_id: payloads[row].id,
                    reason: e.to_string(),
                })
            })
            .collect();
        failures.sort_by_key(|f| f.row);

        let report = SaveReport {
            submitted: payloads.len(),
            updated: payloads.len() - failures.len(),
            failures,
        };

        if report.is_success() {
            info!(updated = report.updated, "bulk save complete");
            self.rows = None;
        } else {
            warn!(
                failed = report.failures.len(),
                submitted = report.submitted,
                "bulk save partially failed; staying in edit mode"
            );
        }

        Ok(report)
    }
}

/// Run one update per payload on a fixed-width pool of scoped threads.
/// Results come back tagged with the payload index, in completion order.
fn dispatch<S: ChargeStore>(
    store: &S,
    payloads: &[ChargeUpdate],
    concurrency: usize,
) -> Vec<(usize, Result<AccountCharge>)> {
    let workers = concurrency.max(1).min(payloads.len());
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || loop {
                let idx = next.fetch_add(1, Ordering::Relaxed);
                let Some(payload) = payloads.get(idx) else {
                    break;
                };
                let result = store.update_charge(payload);
                if tx.send((idx, result)).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    rx.into_iter().collect()
}
