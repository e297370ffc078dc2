//! Builders for assembling billing sessions in tests

use crate::fixtures::{CatalogFixtures, DateFixtures, IdFixtures};
use chrono::NaiveDate;
use core_kernel::{Money, Rate};
use domain_billing::{BillSession, ServiceCategory, TaxCatalog, TaxOption};
use rust_decimal::Decimal;

/// Builds a draft [`BillSession`] with sensible defaults.
///
/// Starts from a GST catalog, a fixture patient and doctor, and no
/// lines beyond the blank one every bill opens with.
pub struct TestBillBuilder {
    catalog: TaxCatalog,
    patient_name: String,
    doctor_name: String,
    date: NaiveDate,
    lines: Vec<(String, ServiceCategory, Money)>,
    taxes: Vec<String>,
    discount: Money,
    paid_amount: Money,
}

impl TestBillBuilder {
    pub fn new() -> Self {
        Self {
            catalog: CatalogFixtures::gst_catalog(),
            patient_name: "Asha Rao".to_string(),
            doctor_name: "Dr. Mehta".to_string(),
            date: DateFixtures::visit_date(),
            lines: Vec::new(),
            taxes: Vec::new(),
            discount: Money::ZERO,
            paid_amount: Money::ZERO,
        }
    }

    pub fn with_catalog(mut self, catalog: TaxCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_patient_name(mut self, name: impl Into<String>) -> Self {
        self.patient_name = name.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Adds a consultation-category line with the given amount.
    pub fn with_line(self, name: impl Into<String>, amount: Money) -> Self {
        self.with_categorized_line(name, ServiceCategory::Consultation, amount)
    }

    pub fn with_categorized_line(
        mut self,
        name: impl Into<String>,
        category: ServiceCategory,
        amount: Money,
    ) -> Self {
        self.lines.push((name.into(), category, amount));
        self
    }

    /// Selects a tax from the builder's catalog by name.
    pub fn with_tax(mut self, name: impl Into<String>) -> Self {
        self.taxes.push(name.into());
        self
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_paid_amount(mut self, paid_amount: Money) -> Self {
        self.paid_amount = paid_amount;
        self
    }

    /// Builds the draft session and applies every queued edit through
    /// the session API, so totals are already reconciled.
    pub fn build(self) -> BillSession {
        let mut session = BillSession::new_draft(
            self.catalog,
            IdFixtures::patient(),
            self.patient_name,
            IdFixtures::doctor(),
            self.doctor_name,
            self.date,
        );

        for (index, (name, category, amount)) in self.lines.into_iter().enumerate() {
            if index > 0 {
                session.add_line();
            }
            session.update_line(index, |line| {
                line.name = name;
                line.category = category;
                line.amount = amount;
            });
        }

        for name in self.taxes {
            let id = session
                .catalog()
                .match_by_name(&name)
                .expect("builder tax name must exist in the catalog");
            session.toggle_tax(id);
        }

        session.set_discount(self.discount);
        session.set_paid_amount(self.paid_amount);
        session
    }
}

impl Default for TestBillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds ad-hoc tax catalogs for tests.
pub struct TestCatalogBuilder {
    options: Vec<TaxOption>,
}

impl TestCatalogBuilder {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
        }
    }

    pub fn with_tax(mut self, name: impl Into<String>, percent: Decimal) -> Self {
        self.options
            .push(TaxOption::new(name, Rate::from_percent(percent)));
        self
    }

    pub fn build(self) -> TaxCatalog {
        TaxCatalog::from_options(self.options).expect("builder catalog ids are fresh")
    }
}

impl Default for TestCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
