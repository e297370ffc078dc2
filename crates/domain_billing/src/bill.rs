//! The bill aggregate
//!
//! A [`Bill`] is the full patient-visit billing record: who was billed,
//! for what, under which taxes, and the derived totals. Fields are
//! private; reads go through accessors and writes go through the editing
//! session, which is the only place recomputation is wired in.

use crate::reconcile::BillTotals;
use crate::service_line::ServiceLedger;
use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{BillId, ClinicId, DoctorId, EncounterId, Money, PatientId, TaxId};
use std::collections::BTreeSet;

/// A patient bill: identity, editable inputs, and derived totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    id: BillId,
    bill_number: String,
    patient_id: PatientId,
    patient_name: String,
    doctor_id: DoctorId,
    doctor_name: String,
    clinic_id: Option<ClinicId>,
    clinic_name: Option<String>,
    encounter_id: Option<EncounterId>,
    ledger: ServiceLedger,
    selected_taxes: BTreeSet<TaxId>,
    discount: Money,
    paid_amount: Money,
    date: NaiveDate,
    time_label: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    totals: BillTotals,
}

impl Bill {
    /// Creates a fresh bill for a patient visit.
    ///
    /// The new record has one blank service line, no taxes selected, and
    /// all-zero totals, matching what the billing form first shows.
    pub fn new(
        patient_id: PatientId,
        patient_name: impl Into<String>,
        doctor_id: DoctorId,
        doctor_name: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BillId::new_v7(),
            bill_number: generate_bill_number(),
            patient_id,
            patient_name: patient_name.into(),
            doctor_id,
            doctor_name: doctor_name.into(),
            clinic_id: None,
            clinic_name: None,
            encounter_id: None,
            ledger: ServiceLedger::new(),
            selected_taxes: BTreeSet::new(),
            discount: Money::ZERO,
            paid_amount: Money::ZERO,
            date,
            time_label: String::new(),
            notes: None,
            created_at: now,
            updated_at: now,
            totals: BillTotals::default(),
        }
    }

    /// Attaches the clinic where the visit took place.
    pub fn with_clinic(mut self, clinic_id: ClinicId, clinic_name: impl Into<String>) -> Self {
        self.clinic_id = Some(clinic_id);
        self.clinic_name = Some(clinic_name.into());
        self
    }

    /// Links the bill to a clinical encounter.
    pub fn with_encounter(mut self, encounter_id: EncounterId) -> Self {
        self.encounter_id = Some(encounter_id);
        self
    }

    /// Sets the free-text visit time shown on the bill.
    pub fn with_time_label(mut self, time_label: impl Into<String>) -> Self {
        self.time_label = time_label.into();
        self
    }

    /// Sets the free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    // Restoration hooks for re-hydrating a persisted record. Only the
    // session's load path uses these; they bypass recomputation on
    // purpose so stored figures survive verbatim.

    pub(crate) fn with_restored_identity(mut self, id: BillId, bill_number: String) -> Self {
        self.id = id;
        self.bill_number = bill_number;
        self
    }

    pub(crate) fn with_restored_clinic(
        mut self,
        clinic_id: Option<ClinicId>,
        clinic_name: Option<String>,
    ) -> Self {
        self.clinic_id = clinic_id;
        self.clinic_name = clinic_name;
        self
    }

    pub(crate) fn with_restored_encounter(mut self, encounter_id: Option<EncounterId>) -> Self {
        self.encounter_id = encounter_id;
        self
    }

    pub(crate) fn with_restored_ledger(mut self, ledger: ServiceLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub(crate) fn with_restored_selection(mut self, selected: BTreeSet<TaxId>) -> Self {
        self.selected_taxes = selected;
        self
    }

    pub(crate) fn with_restored_payment(mut self, discount: Money, paid_amount: Money) -> Self {
        self.discount = discount;
        self.paid_amount = paid_amount;
        self
    }

    pub(crate) fn with_restored_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub(crate) fn with_restored_totals(mut self, totals: BillTotals) -> Self {
        self.totals = totals;
        self
    }

    pub(crate) fn with_restored_timestamps(
        mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        if let Some(created_at) = created_at {
            self.created_at = created_at;
        }
        if let Some(updated_at) = updated_at {
            self.updated_at = updated_at;
        }
        self
    }

    // Mutation hooks for the editing session.

    pub(crate) fn ledger_mut(&mut self) -> &mut ServiceLedger {
        &mut self.ledger
    }

    pub(crate) fn selection_mut(&mut self) -> &mut BTreeSet<TaxId> {
        &mut self.selected_taxes
    }

    pub(crate) fn set_discount(&mut self, discount: Money) {
        self.discount = discount;
    }

    pub(crate) fn set_paid_amount(&mut self, paid_amount: Money) {
        self.paid_amount = paid_amount;
    }

    pub(crate) fn set_patient(&mut self, patient_id: PatientId, patient_name: String) {
        self.patient_id = patient_id;
        self.patient_name = patient_name;
    }

    pub(crate) fn set_doctor(&mut self, doctor_id: DoctorId, doctor_name: String) {
        self.doctor_id = doctor_id;
        self.doctor_name = doctor_name;
    }

    pub(crate) fn set_clinic(&mut self, clinic_id: ClinicId, clinic_name: String) {
        self.clinic_id = Some(clinic_id);
        self.clinic_name = Some(clinic_name);
    }

    pub(crate) fn clear_clinic(&mut self) {
        self.clinic_id = None;
        self.clinic_name = None;
    }

    pub(crate) fn set_encounter(&mut self, encounter_id: Option<EncounterId>) {
        self.encounter_id = encounter_id;
    }

    pub(crate) fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub(crate) fn set_time_label(&mut self, time_label: String) {
        self.time_label = time_label;
    }

    pub(crate) fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    pub(crate) fn set_totals(&mut self, totals: BillTotals) {
        self.totals = totals;
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // Read access.

    pub fn id(&self) -> BillId {
        self.id
    }

    pub fn bill_number(&self) -> &str {
        &self.bill_number
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn doctor_id(&self) -> DoctorId {
        self.doctor_id
    }

    pub fn doctor_name(&self) -> &str {
        &self.doctor_name
    }

    pub fn clinic_id(&self) -> Option<ClinicId> {
        self.clinic_id
    }

    pub fn clinic_name(&self) -> Option<&str> {
        self.clinic_name.as_deref()
    }

    pub fn encounter_id(&self) -> Option<EncounterId> {
        self.encounter_id
    }

    pub fn ledger(&self) -> &ServiceLedger {
        &self.ledger
    }

    pub fn selected_taxes(&self) -> &BTreeSet<TaxId> {
        &self.selected_taxes
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time_label(&self) -> &str {
        &self.time_label
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn totals(&self) -> &BillTotals {
        &self.totals
    }
}

/// Generates a display number of the form `BILL-0123456789`.
fn generate_bill_number() -> String {
    let millis = Utc::now().timestamp_millis() % 10_000_000_000;
    format!("BILL-{:010}", millis)
}
