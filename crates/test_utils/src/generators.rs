//! Proptest strategies for billing domain values

use core_kernel::{Money, Rate, TaxId};
use domain_billing::{ServiceCategory, ServiceLedger, ServiceLine, TaxCatalog, TaxOption};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Whole-rupee amounts in a realistic billing range.
pub fn rupee_amount() -> impl Strategy<Value = Money> {
    (0i64..1_000_000i64).prop_map(Money::from_rupees)
}

/// Amounts with paise precision (two decimal places).
pub fn paise_amount() -> impl Strategy<Value = Money> {
    (0i64..100_000_000i64).prop_map(|paise| Money::new(Decimal::new(paise, 2)))
}

/// Tax rates from 0% to 100%.
pub fn tax_rate() -> impl Strategy<Value = Rate> {
    (0u32..=100u32).prop_map(|pct| Rate::from_percent(Decimal::from(pct)))
}

pub fn service_category() -> impl Strategy<Value = ServiceCategory> {
    prop_oneof![
        Just(ServiceCategory::Consultation),
        Just(ServiceCategory::Laboratory),
        Just(ServiceCategory::Radiology),
        Just(ServiceCategory::Pharmacy),
        Just(ServiceCategory::Procedure),
        Just(ServiceCategory::Other),
    ]
}

pub fn service_line() -> impl Strategy<Value = ServiceLine> {
    ("[A-Z][a-z]{2,12}", service_category(), paise_amount()).prop_map(
        |(name, category, amount)| ServiceLine {
            name,
            category,
            description: String::new(),
            amount,
        },
    )
}

/// Ledgers of one to `max_lines` populated lines.
pub fn ledger(max_lines: usize) -> impl Strategy<Value = ServiceLedger> {
    prop::collection::vec(service_line(), 1..=max_lines).prop_map(ServiceLedger::from_lines)
}

/// Catalogs of zero to five distinctly named taxes.
pub fn catalog() -> impl Strategy<Value = TaxCatalog> {
    prop::collection::btree_map("[A-Z]{2,6}", tax_rate(), 0..=5).prop_map(|entries| {
        let options = entries
            .into_iter()
            .map(|(name, rate)| TaxOption::new(name, rate))
            .collect();
        TaxCatalog::from_options(options).expect("generated ids are fresh")
    })
}

/// A catalog together with a selected subset of its taxes.
pub fn catalog_with_selection() -> impl Strategy<Value = (TaxCatalog, BTreeSet<TaxId>)> {
    catalog()
        .prop_flat_map(|catalog| {
            let len = catalog.options().len();
            (
                Just(catalog),
                prop::collection::vec(any::<bool>(), len..=len),
            )
        })
        .prop_map(|(catalog, mask)| {
            let selected = catalog
                .options()
                .iter()
                .zip(mask)
                .filter(|(_, ticked)| *ticked)
                .map(|(option, _)| option.id)
                .collect();
            (catalog, selected)
        })
}
