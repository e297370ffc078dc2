//! Core kernel for the OneCare billing engine
//!
//! Shared value types used by every domain crate: precise decimal money
//! and rates, strongly-typed identifiers, and common error variants.
//! Nothing in here knows about bills or taxes; those live in the domain
//! crates built on top.

pub mod error;
pub mod identifiers;
pub mod money;

pub use error::CoreError;
pub use identifiers::{BillId, ClinicId, DoctorId, EncounterId, PatientId, TaxId};
pub use money::{lenient_money, lenient_rate, Money, Rate};
