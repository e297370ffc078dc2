//! The bill reconciliation calculator
//!
//! Everything derived on a bill flows from one pure function:
//! [`reconcile`] takes the editable inputs (service lines, tax selection,
//! discount, paid amount) and the session catalog, and returns the full
//! derived slice as a [`BillTotals`]. Callers replace their totals
//! wholesale with the result; no derived field is ever patched in place.

use crate::service_line::ServiceLedger;
use crate::tax::{AppliedTax, TaxBreakdown, TaxCatalog};
use core_kernel::{Money, TaxId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Settlement status of a bill, derived from total and paid amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Paid,
    #[default]
    Unpaid,
    Partial,
}

impl BillStatus {
    /// Derives the status from the reconciled total and the paid amount.
    ///
    /// The branches are checked in a fixed priority order:
    ///
    /// 1. `paid >= total` with a positive total is `Paid`.
    /// 2. A positive payment short of the total is `Partial`.
    /// 3. No payment at all is `Unpaid`, whatever the total.
    /// 4. A payment against a non-positive total is `Paid`; nothing
    ///    further is owed.
    ///
    /// `paid` is never negative (monetary inputs are clamped at entry).
    pub fn derive(total: Money, paid: Money) -> Self {
        if paid >= total && total.is_positive() {
            BillStatus::Paid
        } else if paid.is_positive() && paid < total {
            BillStatus::Partial
        } else if paid.is_zero() {
            BillStatus::Unpaid
        } else {
            BillStatus::Paid
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillStatus::Paid => "paid",
            BillStatus::Unpaid => "unpaid",
            BillStatus::Partial => "partial",
        };
        write!(f, "{}", label)
    }
}

/// The derived slice of a bill: every figure computed from the inputs.
///
/// A fresh bill carries the `Default` value (all zeros, `Unpaid`) until
/// its first recomputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillTotals {
    pub sub_total: Money,
    pub tax_amount: Money,
    pub taxes: Vec<AppliedTax>,
    pub total_amount: Money,
    pub amount_due: Money,
    pub status: BillStatus,
}

/// Reconciles a bill's editable inputs into its derived totals.
///
/// Pure and total: no clock, no I/O, an answer for every input. Calling
/// it again with unchanged inputs returns an identical value.
///
/// `total_amount` is deliberately unclamped; a discount larger than the
/// taxed subtotal produces a negative total. `amount_due` floors at zero,
/// overpayment never shows as negative dues.
pub fn reconcile(
    ledger: &ServiceLedger,
    selected: &BTreeSet<TaxId>,
    catalog: &TaxCatalog,
    discount: Money,
    paid_amount: Money,
) -> BillTotals {
    let sub_total = ledger.subtotal();
    let TaxBreakdown { tax_amount, taxes } = catalog.apply(sub_total, selected);

    let total_amount = sub_total + tax_amount - discount;
    let amount_due = (total_amount - paid_amount).max(Money::ZERO);
    let status = BillStatus::derive(total_amount, paid_amount);

    BillTotals {
        sub_total,
        tax_amount,
        taxes,
        total_amount,
        amount_due,
        status,
    }
}
