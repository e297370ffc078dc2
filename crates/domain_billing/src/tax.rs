//! Tax catalog and applied-tax snapshots
//!
//! The catalog is read-only reference data handed to a billing session at
//! start. Applying it to a subtotal produces frozen [`AppliedTax`]
//! snapshots: name, rate, and computed amount at the moment of
//! calculation. Snapshots are what a bill persists, so historical bills
//! keep their figures even after catalog rates change.

use crate::error::BillingError;
use core_kernel::{Money, Rate, TaxId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A tax offered for selection on the billing form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxOption {
    pub id: TaxId,
    pub name: String,
    pub rate: Rate,
}

impl TaxOption {
    /// Creates a catalog entry with a fresh identifier.
    pub fn new(name: impl Into<String>, rate: Rate) -> Self {
        Self {
            id: TaxId::new(),
            name: name.into(),
            rate,
        }
    }
}

/// A tax as applied to one bill: the frozen snapshot that gets persisted.
///
/// Deliberately carries no [`TaxId`]. Once computed, a snapshot stands on
/// its own; only the live selection refers back to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedTax {
    pub name: String,
    pub rate: Rate,
    pub amount: Money,
}

/// The result of applying a tax selection to a subtotal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub tax_amount: Money,
    pub taxes: Vec<AppliedTax>,
}

/// The set of taxes available to a billing session, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCatalog {
    options: Vec<TaxOption>,
}

impl TaxCatalog {
    /// Builds a catalog from externally supplied options.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::DuplicateTax`] if two options share an id.
    pub fn from_options(options: Vec<TaxOption>) -> Result<Self, BillingError> {
        let mut seen = HashSet::new();
        for option in &options {
            if !seen.insert(option.id) {
                return Err(BillingError::DuplicateTax(option.id));
            }
        }
        Ok(Self { options })
    }

    /// An empty catalog (sessions without configured taxes).
    pub fn empty() -> Self {
        Self {
            options: Vec::new(),
        }
    }

    /// Looks up an option by id.
    pub fn get(&self, id: TaxId) -> Option<&TaxOption> {
        self.options.iter().find(|option| option.id == id)
    }

    /// All options in their configured display order.
    pub fn options(&self) -> &[TaxOption] {
        &self.options
    }

    /// Finds the first option with exactly this name.
    ///
    /// Used to re-tick selections when a saved bill is reopened: the
    /// persisted snapshots carry names, not ids.
    pub fn match_by_name(&self, name: &str) -> Option<TaxId> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| option.id)
    }

    /// Applies the selected taxes to a subtotal.
    ///
    /// Each selected tax is computed independently against the subtotal
    /// (taxes never compound) and snapshotted. Catalog order decides the
    /// breakdown order, so the selection set contributes membership only.
    /// Selected ids missing from the catalog are skipped.
    pub fn apply(&self, sub_total: Money, selected: &BTreeSet<TaxId>) -> TaxBreakdown {
        let taxes: Vec<AppliedTax> = self
            .options
            .iter()
            .filter(|option| selected.contains(&option.id))
            .map(|option| AppliedTax {
                name: option.name.clone(),
                rate: option.rate,
                amount: option.rate.apply(sub_total),
            })
            .collect();

        let tax_amount = taxes.iter().map(|tax| tax.amount).sum();

        TaxBreakdown { tax_amount, taxes }
    }
}

impl Default for TaxCatalog {
    fn default() -> Self {
        Self::empty()
    }
}
