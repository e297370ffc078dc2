//! Wire DTOs for the persistence collaborator
//!
//! Bills are exchanged with the OneCare store as camelCase JSON. The
//! store is schemaless and has lived through several shapes, so reading
//! is tolerant: service lines may arrive as bare name strings (the
//! original shape) or full objects, monetary fields coerce through the
//! kernel's lenient deserializers, and almost everything has a default.
//! Writing always emits the current full shape.

use crate::bill::Bill;
use crate::reconcile::BillStatus;
use crate::service_line::{ServiceCategory, ServiceLine};
use crate::tax::AppliedTax;
use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{
    lenient_money, lenient_rate, BillId, ClinicId, DoctorId, EncounterId, Money, PatientId, Rate,
};
use serde::{Deserialize, Serialize};

/// A service line as stored: either the original bare-name shape or the
/// full object shape. Old records carry `["X-Ray", "Blood Test"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceLineWire {
    Full {
        #[serde(default)]
        name: String,
        #[serde(default)]
        category: ServiceCategory,
        #[serde(default)]
        description: String,
        #[serde(default, deserialize_with = "lenient_money")]
        amount: Money,
    },
    Legacy(String),
}

impl From<ServiceLineWire> for ServiceLine {
    fn from(wire: ServiceLineWire) -> Self {
        match wire {
            ServiceLineWire::Full {
                name,
                category,
                description,
                amount,
            } => ServiceLine {
                name,
                category,
                description,
                amount,
            },
            ServiceLineWire::Legacy(name) => ServiceLine::named(name),
        }
    }
}

impl From<&ServiceLine> for ServiceLineWire {
    fn from(line: &ServiceLine) -> Self {
        ServiceLineWire::Full {
            name: line.name.clone(),
            category: line.category,
            description: line.description.clone(),
            amount: line.amount,
        }
    }
}

/// A persisted applied-tax snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedTaxWire {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub rate: Rate,
    #[serde(default, deserialize_with = "lenient_money")]
    pub amount: Money,
}

impl From<AppliedTaxWire> for AppliedTax {
    fn from(wire: AppliedTaxWire) -> Self {
        AppliedTax {
            name: wire.name,
            rate: wire.rate,
            amount: wire.amount,
        }
    }
}

impl From<&AppliedTax> for AppliedTaxWire {
    fn from(tax: &AppliedTax) -> Self {
        AppliedTaxWire {
            name: tax.name.clone(),
            rate: tax.rate,
            amount: tax.amount,
        }
    }
}

/// The persisted bill record.
///
/// Identity fields are required; a record without its patient, doctor,
/// or date is unusable. Everything derived or optional defaults, and
/// monetary fields coerce rather than fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillWire {
    #[serde(default)]
    pub id: Option<BillId>,
    #[serde(default)]
    pub bill_number: String,

    pub patient_id: PatientId,
    pub patient_name: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    #[serde(default)]
    pub clinic_id: Option<ClinicId>,
    #[serde(default)]
    pub clinic_name: Option<String>,
    #[serde(default)]
    pub encounter_id: Option<EncounterId>,

    #[serde(default)]
    pub services: Vec<ServiceLineWire>,
    #[serde(default)]
    pub taxes: Vec<AppliedTaxWire>,
    #[serde(default, deserialize_with = "lenient_money")]
    pub discount: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub paid_amount: Money,

    #[serde(default, deserialize_with = "lenient_money")]
    pub sub_total: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub tax_amount: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub total_amount: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub amount_due: Money,
    #[serde(default)]
    pub status: BillStatus,

    pub date: NaiveDate,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Bill> for BillWire {
    fn from(bill: &Bill) -> Self {
        let totals = bill.totals();
        BillWire {
            id: Some(bill.id()),
            bill_number: bill.bill_number().to_string(),
            patient_id: bill.patient_id(),
            patient_name: bill.patient_name().to_string(),
            doctor_id: bill.doctor_id(),
            doctor_name: bill.doctor_name().to_string(),
            clinic_id: bill.clinic_id(),
            clinic_name: bill.clinic_name().map(str::to_string),
            encounter_id: bill.encounter_id(),
            services: bill.ledger().lines().iter().map(Into::into).collect(),
            taxes: totals.taxes.iter().map(Into::into).collect(),
            discount: bill.discount(),
            paid_amount: bill.paid_amount(),
            sub_total: totals.sub_total,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            amount_due: totals.amount_due,
            status: totals.status,
            date: bill.date(),
            time: bill.time_label().to_string(),
            notes: bill.notes().map(str::to_string),
            created_at: Some(bill.created_at()),
            updated_at: Some(bill.updated_at()),
        }
    }
}
