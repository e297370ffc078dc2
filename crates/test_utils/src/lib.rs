//! Shared test utilities for the OneCare billing engine
//!
//! Fixtures for canonical amounts, catalogs, and dates; builders for
//! assembling billing sessions in a readable way; proptest generators;
//! and assertion helpers that check whole invariants at once. Intended
//! for use from integration tests as a dev-dependency.

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;

pub use assertions::{assert_money_eq, assert_totals_consistent};
pub use builders::{TestBillBuilder, TestCatalogBuilder};
pub use fixtures::{CatalogFixtures, DateFixtures, IdFixtures, MoneyFixtures};
