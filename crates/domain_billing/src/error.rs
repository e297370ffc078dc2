//! Billing domain errors
//!
//! The error surface is deliberately narrow. Malformed numeric input
//! coerces to zero rather than erroring, deleting the last service line
//! is a silent no-op, and an out-of-range line index is a programming
//! error that panics. What remains is the caller-visible contract:
//! catalog construction and lifecycle transitions.

use core_kernel::TaxId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BillingError {
    #[error("Duplicate tax in catalog: {0}")]
    DuplicateTax(TaxId),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}
