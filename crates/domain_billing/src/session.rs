//! The bill editing session and its lifecycle
//!
//! A [`BillSession`] pairs one [`Bill`] with the tax catalog it is being
//! edited against and tracks where the record stands: `Draft` while
//! editable, `Persisted` once handed to the store. Every mutation that
//! can move money runs the reconciliation calculator and swaps the
//! bill's totals wholesale, so readers never observe a half-updated
//! derived state.

use crate::bill::Bill;
use crate::error::BillingError;
use crate::reconcile::{reconcile, BillTotals};
use crate::service_line::{ServiceLedger, ServiceLine};
use crate::tax::TaxCatalog;
use crate::wire::BillWire;
use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{ClinicId, DoctorId, EncounterId, Money, PatientId, TaxId};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Lifecycle state of a bill within an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillState {
    /// Being edited; not yet (or no longer) in sync with the store.
    Draft { since: DateTime<Utc> },
    /// Handed to the store; editing re-enters `Draft`.
    Persisted { saved_at: DateTime<Utc> },
}

impl BillState {
    fn name(&self) -> &'static str {
        match self {
            BillState::Draft { .. } => "Draft",
            BillState::Persisted { .. } => "Persisted",
        }
    }
}

/// An editing session for one bill against one tax catalog.
#[derive(Debug, Clone)]
pub struct BillSession {
    bill: Bill,
    catalog: TaxCatalog,
    state: BillState,
}

impl BillSession {
    /// Starts a draft session for a brand-new bill.
    pub fn new_draft(
        catalog: TaxCatalog,
        patient_id: PatientId,
        patient_name: impl Into<String>,
        doctor_id: DoctorId,
        doctor_name: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let bill = Bill::new(patient_id, patient_name, doctor_id, doctor_name, date);
        Self {
            bill,
            catalog,
            state: BillState::Draft { since: Utc::now() },
        }
    }

    /// Re-hydrates a stored record into a draft session for editing.
    ///
    /// The stored derived figures are restored verbatim: loading is not a
    /// change, so nothing is recomputed until the first monetary edit.
    /// That keeps historical bills intact even when the session catalog
    /// carries different rates than the one the bill was computed under.
    ///
    /// Tax selections are re-derived by matching the persisted snapshots
    /// against the catalog by name; snapshots with no current counterpart
    /// stay in the restored totals but cannot be re-ticked.
    pub fn load(catalog: TaxCatalog, wire: BillWire) -> Self {
        let BillWire {
            id,
            bill_number,
            patient_id,
            patient_name,
            doctor_id,
            doctor_name,
            clinic_id,
            clinic_name,
            encounter_id,
            services,
            taxes,
            discount,
            paid_amount,
            sub_total,
            tax_amount,
            total_amount,
            amount_due,
            status,
            date,
            time,
            notes,
            created_at,
            updated_at,
        } = wire;

        let lines: Vec<ServiceLine> = services.into_iter().map(Into::into).collect();
        let ledger = ServiceLedger::from_lines(lines);

        let selected: BTreeSet<TaxId> = taxes
            .iter()
            .filter_map(|tax| catalog.match_by_name(&tax.name))
            .collect();

        let totals = BillTotals {
            sub_total,
            tax_amount,
            taxes: taxes.into_iter().map(Into::into).collect(),
            total_amount,
            amount_due,
            status,
        };

        let fresh = Bill::new(patient_id, patient_name, doctor_id, doctor_name, date)
            .with_time_label(time);
        // Records saved before ids or numbering keep the fresh ones.
        let restored_id = id.unwrap_or_else(|| fresh.id());
        let restored_number = if bill_number.is_empty() {
            fresh.bill_number().to_string()
        } else {
            bill_number
        };

        let bill = fresh
            .with_restored_identity(restored_id, restored_number)
            .with_restored_clinic(clinic_id, clinic_name)
            .with_restored_encounter(encounter_id)
            .with_restored_ledger(ledger)
            .with_restored_selection(selected)
            .with_restored_payment(discount, paid_amount)
            .with_restored_notes(notes)
            .with_restored_timestamps(created_at, updated_at)
            .with_restored_totals(totals);

        info!(bill_id = %bill.id(), bill_number = %bill.bill_number(), "loaded bill for editing");

        Self {
            bill,
            catalog,
            state: BillState::Draft { since: Utc::now() },
        }
    }

    // Ledger edits.

    /// Appends a blank service line.
    pub fn add_line(&mut self) {
        self.begin_mutation();
        self.bill.ledger_mut().push_default();
        self.recompute();
    }

    /// Edits the service line at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; indices come from rendered
    /// rows, so a bad one is a caller bug.
    pub fn update_line(&mut self, index: usize, edit: impl FnOnce(&mut ServiceLine)) {
        self.begin_mutation();
        self.bill.ledger_mut().update_line(index, edit);
        self.recompute();
    }

    /// Removes the service line at `index`.
    ///
    /// Returns `false` without removing when it is the only line left.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range while more than one line exists.
    pub fn remove_line(&mut self, index: usize) -> bool {
        self.begin_mutation();
        let removed = self.bill.ledger_mut().remove_line(index);
        self.recompute();
        removed
    }

    // Tax and payment edits.

    /// Ticks or unticks a tax, returning the new membership.
    ///
    /// Ids outside the catalog are accepted; they simply contribute
    /// nothing when applied.
    pub fn toggle_tax(&mut self, tax_id: TaxId) -> bool {
        self.begin_mutation();
        let selection = self.bill.selection_mut();
        let selected = if selection.remove(&tax_id) {
            false
        } else {
            selection.insert(tax_id);
            true
        };
        self.recompute();
        selected
    }

    /// Sets the flat discount. Negative input clamps to zero.
    pub fn set_discount(&mut self, discount: Money) {
        self.begin_mutation();
        self.bill.set_discount(discount.max(Money::ZERO));
        self.recompute();
    }

    /// Sets the amount already paid. Negative input clamps to zero.
    pub fn set_paid_amount(&mut self, paid_amount: Money) {
        self.begin_mutation();
        self.bill.set_paid_amount(paid_amount.max(Money::ZERO));
        self.recompute();
    }

    // Identity and metadata edits. None of these move money, so none
    // recompute.

    pub fn set_patient(&mut self, patient_id: PatientId, patient_name: impl Into<String>) {
        self.begin_mutation();
        self.bill.set_patient(patient_id, patient_name.into());
    }

    pub fn set_doctor(&mut self, doctor_id: DoctorId, doctor_name: impl Into<String>) {
        self.begin_mutation();
        self.bill.set_doctor(doctor_id, doctor_name.into());
    }

    pub fn set_clinic(&mut self, clinic_id: ClinicId, clinic_name: impl Into<String>) {
        self.begin_mutation();
        self.bill.set_clinic(clinic_id, clinic_name.into());
    }

    pub fn clear_clinic(&mut self) {
        self.begin_mutation();
        self.bill.clear_clinic();
    }

    pub fn set_encounter(&mut self, encounter_id: Option<EncounterId>) {
        self.begin_mutation();
        self.bill.set_encounter(encounter_id);
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.begin_mutation();
        self.bill.set_date(date);
    }

    pub fn set_time_label(&mut self, time_label: impl Into<String>) {
        self.begin_mutation();
        self.bill.set_time_label(time_label.into());
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.begin_mutation();
        self.bill.set_notes(notes);
    }

    // Lifecycle.

    /// Submits the draft, returning the record to hand to the store.
    ///
    /// The returned wire record carries resolved tax snapshots, never
    /// live catalog references.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::InvalidStateTransition`] if the bill is
    /// already `Persisted`.
    pub fn submit(&mut self) -> Result<BillWire, BillingError> {
        match self.state {
            BillState::Draft { .. } => {
                self.bill.touch();
                self.state = BillState::Persisted {
                    saved_at: Utc::now(),
                };
                info!(
                    bill_id = %self.bill.id(),
                    bill_number = %self.bill.bill_number(),
                    total = %self.bill.totals().total_amount,
                    status = %self.bill.totals().status,
                    "bill submitted"
                );
                Ok(BillWire::from(&self.bill))
            }
            BillState::Persisted { .. } => Err(self.transition_error("Persisted")),
        }
    }

    /// Explicitly reopens a persisted bill for editing.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::InvalidStateTransition`] if the bill is
    /// still a draft.
    pub fn reopen(&mut self) -> Result<(), BillingError> {
        match self.state {
            BillState::Persisted { .. } => {
                self.state = BillState::Draft { since: Utc::now() };
                Ok(())
            }
            BillState::Draft { .. } => Err(self.transition_error("Draft")),
        }
    }

    // Read access.

    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub fn catalog(&self) -> &TaxCatalog {
        &self.catalog
    }

    pub fn state(&self) -> BillState {
        self.state
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.state, BillState::Draft { .. })
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self.state, BillState::Persisted { .. })
    }

    /// Editing a persisted bill re-enters `Draft` before the edit lands.
    fn begin_mutation(&mut self) {
        if let BillState::Persisted { .. } = self.state {
            self.state = BillState::Draft { since: Utc::now() };
        }
        self.bill.touch();
    }

    fn recompute(&mut self) {
        let totals = reconcile(
            self.bill.ledger(),
            self.bill.selected_taxes(),
            &self.catalog,
            self.bill.discount(),
            self.bill.paid_amount(),
        );
        debug!(
            bill_id = %self.bill.id(),
            sub_total = %totals.sub_total,
            total = %totals.total_amount,
            status = %totals.status,
            "recomputed bill totals"
        );
        self.bill.set_totals(totals);
    }

    fn transition_error(&self, to: &str) -> BillingError {
        BillingError::InvalidStateTransition {
            from: self.state.name().to_string(),
            to: to.to_string(),
        }
    }
}
