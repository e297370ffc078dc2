//! Billing domain for the OneCare engine
//!
//! Covers the billing form's whole computational surface: the ordered
//! service-line ledger, the tax catalog with its applied-tax snapshots,
//! the pure reconciliation calculator, the bill aggregate, and the
//! editing session that ties them together and tracks the draft /
//! persisted lifecycle. Persistence itself lives elsewhere; this crate
//! only produces and consumes the wire records.

pub mod bill;
pub mod error;
pub mod reconcile;
pub mod service_line;
pub mod session;
pub mod tax;
pub mod wire;

pub use bill::Bill;
pub use error::BillingError;
pub use reconcile::{reconcile, BillStatus, BillTotals};
pub use service_line::{ServiceCategory, ServiceLedger, ServiceLine};
pub use session::{BillSession, BillState};
pub use tax::{AppliedTax, TaxBreakdown, TaxCatalog, TaxOption};
pub use wire::{AppliedTaxWire, BillWire, ServiceLineWire};
