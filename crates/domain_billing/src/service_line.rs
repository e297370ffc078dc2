//! Service lines and the ordered ledger of a bill
//!
//! A bill itemizes the services rendered during a visit. The ledger holds
//! the lines in entry order and is never empty: a bill always shows at
//! least one line, even if it is still blank.

use core_kernel::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a billed service, as shown on the billing form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceCategory {
    #[default]
    Consultation,
    Laboratory,
    Radiology,
    Pharmacy,
    Procedure,
    Other,
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceCategory::Consultation => "Consultation",
            ServiceCategory::Laboratory => "Laboratory",
            ServiceCategory::Radiology => "Radiology",
            ServiceCategory::Pharmacy => "Pharmacy",
            ServiceCategory::Procedure => "Procedure",
            ServiceCategory::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

/// One itemized charge on a bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub name: String,
    pub category: ServiceCategory,
    pub description: String,
    pub amount: Money,
}

impl ServiceLine {
    /// Creates a line with the given name and defaults everywhere else.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Ordered list of service lines. Never empty.
///
/// The ledger enforces two structural rules: it starts with one blank
/// line, and the last remaining line cannot be removed. Amounts reach
/// the ledger already coerced non-negative by the wire and parsing
/// boundaries, so [`subtotal`] is a plain sum.
///
/// [`subtotal`]: ServiceLedger::subtotal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLedger {
    lines: Vec<ServiceLine>,
}

impl ServiceLedger {
    /// Creates a ledger holding a single default line.
    pub fn new() -> Self {
        Self {
            lines: vec![ServiceLine::default()],
        }
    }

    /// Rebuilds a ledger from loaded lines, restoring the never-empty
    /// rule when the stored list is empty.
    pub fn from_lines(lines: Vec<ServiceLine>) -> Self {
        if lines.is_empty() {
            Self::new()
        } else {
            Self { lines }
        }
    }

    /// Appends a fresh default line for the user to fill in.
    pub fn push_default(&mut self) {
        self.lines.push(ServiceLine::default());
    }

    /// Applies an edit to the line at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Line indices come from the
    /// rendered rows, so a bad index is a caller bug, not user input.
    pub fn update_line(&mut self, index: usize, edit: impl FnOnce(&mut ServiceLine)) {
        edit(&mut self.lines[index]);
    }

    /// Removes the line at `index`.
    ///
    /// Returns `false` without removing anything when only one line
    /// remains; a bill never drops to zero lines.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range while more than one line exists.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if self.lines.len() == 1 {
            return false;
        }
        self.lines.remove(index);
        true
    }

    /// Sum of all line amounts.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|line| line.amount).sum()
    }

    /// Number of lines (always at least one).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// All lines in entry order.
    pub fn lines(&self) -> &[ServiceLine] {
        &self.lines
    }

    /// The line at `index`, if in range.
    pub fn line(&self, index: usize) -> Option<&ServiceLine> {
        self.lines.get(index)
    }
}

impl Default for ServiceLedger {
    fn default() -> Self {
        Self::new()
    }
}
