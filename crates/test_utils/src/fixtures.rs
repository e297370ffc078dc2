//! Canonical fixture values for billing tests

use chrono::NaiveDate;
use core_kernel::{DoctorId, Money, PatientId, Rate, TaxId};
use domain_billing::{TaxCatalog, TaxOption};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Common monetary amounts.
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn consultation_fee() -> Money {
        Money::from_rupees(500)
    }

    pub fn xray_charge() -> Money {
        Money::from_rupees(650)
    }

    pub fn round_thousand() -> Money {
        Money::from_rupees(1000)
    }

    pub fn small_discount() -> Money {
        Money::from_rupees(100)
    }

    pub fn odd_paise() -> Money {
        Money::new(dec!(333.33))
    }
}

/// Standard tax catalogs in the GST style the billing form configures.
pub struct CatalogFixtures;

impl CatalogFixtures {
    /// CGST 9%, SGST 9%, IGST 18%, Service Charge 5%.
    pub fn gst_catalog() -> TaxCatalog {
        TaxCatalog::from_options(vec![
            TaxOption::new("CGST", Rate::from_percent(dec!(9))),
            TaxOption::new("SGST", Rate::from_percent(dec!(9))),
            TaxOption::new("IGST", Rate::from_percent(dec!(18))),
            TaxOption::new("Service Charge", Rate::from_percent(dec!(5))),
        ])
        .expect("fixture catalog ids are fresh")
    }

    /// A single flat 18% GST entry.
    pub fn single_gst() -> TaxCatalog {
        TaxCatalog::from_options(vec![TaxOption::new("GST", Rate::from_percent(dec!(18)))])
            .expect("fixture catalog ids are fresh")
    }

    pub fn empty() -> TaxCatalog {
        TaxCatalog::empty()
    }
}

/// Deterministic identifiers for tests that compare records.
pub struct IdFixtures;

impl IdFixtures {
    pub fn patient() -> PatientId {
        PatientId::from_uuid(Self::uuid("7b1c9a52-4c7e-4a86-9e0e-0aafce91d7a1"))
    }

    pub fn doctor() -> DoctorId {
        DoctorId::from_uuid(Self::uuid("e3a7cbe5-889e-4d80-b2a3-0a2f5a8a7f11"))
    }

    pub fn unknown_tax() -> TaxId {
        TaxId::from_uuid(Self::uuid("00000000-0000-4000-8000-00000000dead"))
    }

    fn uuid(s: &str) -> Uuid {
        Uuid::parse_str(s).expect("fixture uuid literal")
    }
}

/// Dates used across the billing tests.
pub struct DateFixtures;

impl DateFixtures {
    pub fn visit_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid fixture date")
    }

    pub fn earlier_visit() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 2).expect("valid fixture date")
    }
}
