//! Integration tests for the billing domain
//!
//! Exercises the billing form's computational surface end to end: ledger
//! edits, tax application, reconciliation, the draft/persisted lifecycle,
//! and the tolerant wire formats, using the shared test_utils fixtures.

use core_kernel::{Money, Rate, TaxId};
use domain_billing::{
    reconcile, BillSession, BillStatus, BillWire, ServiceCategory, ServiceLedger, ServiceLine,
    TaxCatalog, TaxOption,
};
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use test_utils::{
    assert_money_eq, assert_totals_consistent, CatalogFixtures, DateFixtures, IdFixtures,
    MoneyFixtures, TestBillBuilder, TestCatalogBuilder,
};

// ============================================================================
// Ledger Tests
// ============================================================================

mod ledger_tests {
    use super::*;

    #[test]
    fn subtotal_is_the_sum_of_all_lines() {
        let session = TestBillBuilder::new()
            .with_line("Consultation", MoneyFixtures::consultation_fee())
            .with_categorized_line("X-Ray", ServiceCategory::Radiology, MoneyFixtures::xray_charge())
            .with_line("Dressing", Money::from_rupees(150))
            .build();

        assert_money_eq(
            session.bill().totals().sub_total,
            Money::from_rupees(1300),
            "three-line subtotal",
        );
    }

    #[test]
    fn blank_lines_contribute_zero() {
        let mut session = TestBillBuilder::new()
            .with_line("Consultation", MoneyFixtures::consultation_fee())
            .build();
        session.add_line();
        session.add_line();

        assert_money_eq(
            session.bill().totals().sub_total,
            MoneyFixtures::consultation_fee(),
            "blank lines must not change the subtotal",
        );
        assert_eq!(session.bill().ledger().line_count(), 3);
    }

    #[test]
    fn removing_a_line_updates_totals() {
        let mut session = TestBillBuilder::new()
            .with_line("Consultation", Money::from_rupees(500))
            .with_line("ECG", Money::from_rupees(300))
            .build();

        assert!(session.remove_line(1));
        assert_money_eq(
            session.bill().totals().sub_total,
            Money::from_rupees(500),
            "subtotal after removal",
        );
    }

    #[test]
    fn the_last_line_survives_removal() {
        let mut session = TestBillBuilder::new()
            .with_line("Consultation", Money::from_rupees(500))
            .build();

        assert!(!session.remove_line(0));
        assert_eq!(session.bill().ledger().line_count(), 1);
        assert_money_eq(
            session.bill().totals().sub_total,
            Money::from_rupees(500),
            "last line must remain untouched",
        );
    }
}

// ============================================================================
// Tax Tests
// ============================================================================

mod tax_tests {
    use super::*;

    #[test]
    fn single_tax_is_linear_in_the_subtotal() {
        let session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::single_gst())
            .with_line("Consultation", MoneyFixtures::round_thousand())
            .with_tax("GST")
            .build();

        let totals = session.bill().totals();
        assert_money_eq(totals.tax_amount, Money::from_rupees(180), "18% of 1000");
        assert_eq!(totals.taxes.len(), 1);
        assert_eq!(totals.taxes[0].rate, Rate::from_percent(dec!(18)));
    }

    #[test]
    fn multiple_taxes_each_apply_to_the_subtotal() {
        let session = TestBillBuilder::new()
            .with_line("Consultation", MoneyFixtures::round_thousand())
            .with_tax("CGST")
            .with_tax("SGST")
            .build();

        // 9% + 9%, never compounded.
        assert_money_eq(
            session.bill().totals().tax_amount,
            Money::from_rupees(180),
            "CGST + SGST",
        );
    }

    #[test]
    fn selection_order_does_not_change_the_breakdown() {
        let forward = TestBillBuilder::new()
            .with_line("Consultation", MoneyFixtures::round_thousand())
            .with_tax("CGST")
            .with_tax("Service Charge")
            .build();
        let reverse = TestBillBuilder::new()
            .with_line("Consultation", MoneyFixtures::round_thousand())
            .with_tax("Service Charge")
            .with_tax("CGST")
            .build();

        assert_eq!(
            forward.bill().totals().taxes,
            reverse.bill().totals().taxes,
            "breakdown must follow catalog order, not click order"
        );
    }

    #[test]
    fn unknown_selected_tax_contributes_nothing() {
        let mut session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::single_gst())
            .with_line("Consultation", MoneyFixtures::round_thousand())
            .build();

        assert!(session.toggle_tax(IdFixtures::unknown_tax()));
        assert_money_eq(
            session.bill().totals().tax_amount,
            Money::ZERO,
            "selection outside the catalog",
        );
    }

    #[test]
    fn snapshots_freeze_name_rate_and_amount() {
        let session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::single_gst())
            .with_line("MRI Scan", Money::from_rupees(4500))
            .with_tax("GST")
            .build();

        let snapshot = &session.bill().totals().taxes[0];
        assert_eq!(snapshot.name, "GST");
        assert_eq!(snapshot.rate, Rate::from_percent(dec!(18)));
        assert_money_eq(snapshot.amount, Money::from_rupees(810), "18% of 4500");
    }
}

// ============================================================================
// Reconciliation Tests
// ============================================================================

mod reconcile_tests {
    use super::*;

    #[test]
    fn total_follows_the_formula() {
        let session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::single_gst())
            .with_line("Consultation", MoneyFixtures::round_thousand())
            .with_tax("GST")
            .with_discount(MoneyFixtures::small_discount())
            .build();

        let totals = session.bill().totals();
        assert_money_eq(totals.total_amount, Money::from_rupees(1080), "1000 + 180 - 100");
        assert_totals_consistent(
            totals,
            session.bill().ledger(),
            session.bill().discount(),
            session.bill().paid_amount(),
        );
    }

    #[test]
    fn overpayment_floors_amount_due_at_zero() {
        let session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::empty())
            .with_line("Consultation", Money::from_rupees(500))
            .with_paid_amount(Money::from_rupees(700))
            .build();

        let totals = session.bill().totals();
        assert_money_eq(totals.amount_due, Money::ZERO, "overpaid bill");
        assert_eq!(totals.status, BillStatus::Paid);
    }

    #[test]
    fn oversized_discount_yields_negative_total() {
        let session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::empty())
            .with_line("Consultation", Money::from_rupees(100))
            .with_discount(Money::from_rupees(250))
            .build();

        let totals = session.bill().totals();
        assert_money_eq(totals.total_amount, Money::from_rupees(-150), "unclamped total");
        assert_money_eq(totals.amount_due, Money::ZERO, "due never goes negative");
        assert_eq!(totals.status, BillStatus::Unpaid);
    }

    #[test]
    fn status_covers_every_boundary() {
        let cases = [
            (1000, 1000, BillStatus::Paid),
            (1000, 1200, BillStatus::Paid),
            (1000, 400, BillStatus::Partial),
            (1000, 0, BillStatus::Unpaid),
            (0, 0, BillStatus::Unpaid),
            (0, 50, BillStatus::Paid),
            (-150, 50, BillStatus::Paid),
            (-150, 0, BillStatus::Unpaid),
        ];

        for (total, paid, expected) in cases {
            assert_eq!(
                BillStatus::derive(Money::from_rupees(total), Money::from_rupees(paid)),
                expected,
                "total {} paid {}",
                total,
                paid
            );
        }
    }

    #[test]
    fn partial_payment_reduces_amount_due() {
        let session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::single_gst())
            .with_line("Consultation", MoneyFixtures::round_thousand())
            .with_tax("GST")
            .with_discount(MoneyFixtures::small_discount())
            .with_paid_amount(Money::from_rupees(500))
            .build();

        let totals = session.bill().totals();
        assert_money_eq(totals.amount_due, Money::from_rupees(580), "1080 - 500");
        assert_eq!(totals.status, BillStatus::Partial);
    }

    #[test]
    fn reconciling_twice_gives_identical_totals() {
        let ledger = {
            let mut ledger = ServiceLedger::new();
            ledger.update_line(0, |line| line.amount = MoneyFixtures::odd_paise());
            ledger
        };
        let catalog = CatalogFixtures::single_gst();
        let selected: BTreeSet<TaxId> = catalog.options().iter().map(|o| o.id).collect();

        let first = reconcile(
            &ledger,
            &selected,
            &catalog,
            Money::from_rupees(10),
            Money::from_rupees(50),
        );
        let second = reconcile(
            &ledger,
            &selected,
            &catalog,
            Money::from_rupees(10),
            Money::from_rupees(50),
        );

        assert_eq!(first, second);
    }

    #[test]
    fn exact_arithmetic_survives_odd_paise() {
        let session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::single_gst())
            .with_line("Consultation", MoneyFixtures::odd_paise())
            .with_tax("GST")
            .build();

        // 18% of 333.33 is 59.9994, kept exact rather than rounded.
        assert_eq!(
            session.bill().totals().tax_amount.amount(),
            dec!(59.9994)
        );
        assert_totals_consistent(
            session.bill().totals(),
            session.bill().ledger(),
            session.bill().discount(),
            session.bill().paid_amount(),
        );
    }
}

// ============================================================================
// Session Lifecycle Tests
// ============================================================================

mod session_tests {
    use super::*;

    #[test]
    fn submit_moves_draft_to_persisted() {
        let mut session = TestBillBuilder::new()
            .with_line("Consultation", Money::from_rupees(500))
            .build();
        assert!(session.is_draft());

        let wire = session.submit().expect("draft must submit");
        assert!(session.is_persisted());
        assert_eq!(wire.sub_total, Money::from_rupees(500));
        assert!(wire.bill_number.starts_with("BILL-"));
    }

    #[test]
    fn double_submit_is_rejected() {
        let mut session = TestBillBuilder::new().build();
        session.submit().unwrap();

        let err = session.submit().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid state transition from Persisted to Persisted"
        );
    }

    #[test]
    fn reopen_only_works_on_persisted_bills() {
        let mut session = TestBillBuilder::new().build();
        assert!(session.reopen().is_err());

        session.submit().unwrap();
        assert!(session.reopen().is_ok());
        assert!(session.is_draft());
    }

    #[test]
    fn editing_a_persisted_bill_reenters_draft() {
        let mut session = TestBillBuilder::new()
            .with_line("Consultation", Money::from_rupees(500))
            .build();
        session.submit().unwrap();

        session.set_discount(Money::from_rupees(50));
        assert!(session.is_draft());
        assert_money_eq(
            session.bill().totals().total_amount,
            Money::from_rupees(450),
            "edit after reopen must reconcile",
        );
    }

    #[test]
    fn load_preserves_persisted_totals_verbatim() {
        // Bill computed under an 18% catalog, reopened under 12%.
        let stored = serde_json::json!({
            "patientId": "7b1c9a52-4c7e-4a86-9e0e-0aafce91d7a1",
            "patientName": "Asha Rao",
            "doctorId": "e3a7cbe5-889e-4d80-b2a3-0a2f5a8a7f11",
            "doctorName": "Dr. Mehta",
            "date": "2023-01-02",
            "services": [{"name": "Consultation", "amount": 1000}],
            "taxes": [{"name": "GST", "rate": 18, "amount": 180}],
            "subTotal": 1000,
            "taxAmount": 180,
            "totalAmount": 1180,
            "amountDue": 1180,
            "status": "unpaid"
        });
        let wire: BillWire = serde_json::from_value(stored).unwrap();

        let current_catalog = TestCatalogBuilder::new().with_tax("GST", dec!(12)).build();
        let session = BillSession::load(current_catalog, wire);

        let totals = session.bill().totals();
        assert_money_eq(totals.tax_amount, Money::from_rupees(180), "stored figure");
        assert_money_eq(totals.total_amount, Money::from_rupees(1180), "stored figure");
        assert_eq!(totals.taxes[0].rate, Rate::from_percent(dec!(18)));
    }

    #[test]
    fn first_edit_after_load_recomputes_under_the_current_catalog() {
        let stored = serde_json::json!({
            "patientId": "7b1c9a52-4c7e-4a86-9e0e-0aafce91d7a1",
            "patientName": "Asha Rao",
            "doctorId": "e3a7cbe5-889e-4d80-b2a3-0a2f5a8a7f11",
            "doctorName": "Dr. Mehta",
            "date": "2023-01-02",
            "services": [{"name": "Consultation", "amount": 1000}],
            "taxes": [{"name": "GST", "rate": 18, "amount": 180}],
            "subTotal": 1000,
            "taxAmount": 180,
            "totalAmount": 1180,
            "amountDue": 1180
        });
        let wire: BillWire = serde_json::from_value(stored).unwrap();
        let current_catalog = TestCatalogBuilder::new().with_tax("GST", dec!(12)).build();

        let mut session = BillSession::load(current_catalog, wire);
        // The GST selection was re-derived from the snapshot by name.
        session.update_line(0, |line| line.amount = Money::from_rupees(2000));

        let totals = session.bill().totals();
        assert_money_eq(totals.tax_amount, Money::from_rupees(240), "12% of 2000");
        assert_money_eq(totals.total_amount, Money::from_rupees(2240), "recomputed");
    }

    #[test]
    fn load_restores_identity_and_metadata() {
        let stored = serde_json::json!({
            "id": "f6a2f4da-5c19-4f50-93d8-7d3e9a3a6b21",
            "billNumber": "BILL-0004567890",
            "patientId": "7b1c9a52-4c7e-4a86-9e0e-0aafce91d7a1",
            "patientName": "Asha Rao",
            "doctorId": "e3a7cbe5-889e-4d80-b2a3-0a2f5a8a7f11",
            "doctorName": "Dr. Mehta",
            "clinicId": "b19f3266-67b4-4f2e-8a0e-2f1f6c4b7d55",
            "clinicName": "City Clinic",
            "date": "2023-01-02",
            "time": "10:30 AM",
            "notes": "insurance pending"
        });
        let wire: BillWire = serde_json::from_value(stored).unwrap();
        let session = BillSession::load(CatalogFixtures::empty(), wire);

        let bill = session.bill();
        assert_eq!(bill.bill_number(), "BILL-0004567890");
        assert_eq!(bill.patient_name(), "Asha Rao");
        assert_eq!(bill.clinic_name(), Some("City Clinic"));
        assert_eq!(bill.time_label(), "10:30 AM");
        assert_eq!(bill.notes(), Some("insurance pending"));
        assert_eq!(bill.date(), DateFixtures::earlier_visit());
        assert!(session.is_draft());
    }

    #[test]
    fn identity_edits_never_touch_totals() {
        let mut session = TestBillBuilder::new()
            .with_line("Consultation", Money::from_rupees(500))
            .build();
        let before = session.bill().totals().clone();

        session.set_doctor(IdFixtures::doctor(), "Dr. Iyer");
        session.set_date(DateFixtures::earlier_visit());
        session.clear_clinic();

        assert_eq!(session.bill().totals(), &before);
    }
}

// ============================================================================
// Wire Format Tests
// ============================================================================

mod wire_tests {
    use super::*;

    #[test]
    fn legacy_string_services_become_default_shaped_lines() {
        let stored = serde_json::json!({
            "patientId": "7b1c9a52-4c7e-4a86-9e0e-0aafce91d7a1",
            "patientName": "Asha Rao",
            "doctorId": "e3a7cbe5-889e-4d80-b2a3-0a2f5a8a7f11",
            "doctorName": "Dr. Mehta",
            "date": "2023-01-02",
            "services": ["X-Ray", "Blood Test"]
        });
        let wire: BillWire = serde_json::from_value(stored).unwrap();
        let session = BillSession::load(CatalogFixtures::empty(), wire);

        let lines = session.bill().ledger().lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "X-Ray");
        assert_eq!(lines[0].category, ServiceCategory::Consultation);
        assert_eq!(lines[0].description, "");
        assert_money_eq(lines[0].amount, Money::ZERO, "legacy line amount");
        assert_eq!(lines[1].name, "Blood Test");
    }

    #[test]
    fn resubmitted_legacy_bills_upgrade_to_the_full_shape() {
        let stored = serde_json::json!({
            "patientId": "7b1c9a52-4c7e-4a86-9e0e-0aafce91d7a1",
            "patientName": "Asha Rao",
            "doctorId": "e3a7cbe5-889e-4d80-b2a3-0a2f5a8a7f11",
            "doctorName": "Dr. Mehta",
            "date": "2023-01-02",
            "services": ["X-Ray"]
        });
        let wire: BillWire = serde_json::from_value(stored).unwrap();
        let mut session = BillSession::load(CatalogFixtures::empty(), wire);

        let out = session.submit().unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["services"][0]["name"], "X-Ray");
        assert_eq!(json["services"][0]["category"], "Consultation");
    }

    #[test]
    fn garbage_monetary_fields_coerce_to_zero() {
        let stored = serde_json::json!({
            "patientId": "7b1c9a52-4c7e-4a86-9e0e-0aafce91d7a1",
            "patientName": "Asha Rao",
            "doctorId": "e3a7cbe5-889e-4d80-b2a3-0a2f5a8a7f11",
            "doctorName": "Dr. Mehta",
            "date": "2023-01-02",
            "services": [
                {"name": "ECG", "amount": "abc"},
                {"name": "Dressing", "amount": null},
                {"name": "Consultation", "amount": "500"}
            ],
            "discount": "not a number",
            "paidAmount": null
        });
        let wire: BillWire = serde_json::from_value(stored).unwrap();

        assert_money_eq(wire.discount, Money::ZERO, "garbage discount");
        assert_money_eq(wire.paid_amount, Money::ZERO, "null paid amount");

        let mut session = BillSession::load(CatalogFixtures::empty(), wire);
        // Trigger a recomputation so the coerced lines flow into totals.
        session.add_line();
        assert_money_eq(
            session.bill().totals().sub_total,
            Money::from_rupees(500),
            "only the parseable amount counts",
        );
    }

    #[test]
    fn empty_stored_services_fix_up_to_one_blank_line() {
        let stored = serde_json::json!({
            "patientId": "7b1c9a52-4c7e-4a86-9e0e-0aafce91d7a1",
            "patientName": "Asha Rao",
            "doctorId": "e3a7cbe5-889e-4d80-b2a3-0a2f5a8a7f11",
            "doctorName": "Dr. Mehta",
            "date": "2023-01-02",
            "services": []
        });
        let wire: BillWire = serde_json::from_value(stored).unwrap();
        let session = BillSession::load(CatalogFixtures::empty(), wire);

        assert_eq!(session.bill().ledger().line_count(), 1);
        assert_eq!(session.bill().ledger().line(0).unwrap(), &ServiceLine::default());
    }

    #[test]
    fn submitted_wire_round_trips_losslessly() {
        let mut session = TestBillBuilder::new()
            .with_catalog(CatalogFixtures::gst_catalog())
            .with_line("Consultation", MoneyFixtures::round_thousand())
            .with_tax("CGST")
            .with_tax("SGST")
            .with_discount(MoneyFixtures::small_discount())
            .with_paid_amount(Money::from_rupees(500))
            .build();

        let out = session.submit().unwrap();
        let json = serde_json::to_string(&out).unwrap();
        let back: BillWire = serde_json::from_str(&json).unwrap();

        assert_eq!(back, out);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use test_utils::generators;

    proptest! {
        #[test]
        fn subtotal_equals_the_sum_of_line_amounts(ledger in generators::ledger(8)) {
            let expected: Money = ledger.lines().iter().map(|line| line.amount).sum();
            prop_assert_eq!(ledger.subtotal(), expected);
        }

        #[test]
        fn reconciled_totals_are_always_consistent(
            ledger in generators::ledger(6),
            (catalog, selected) in generators::catalog_with_selection(),
            discount in generators::rupee_amount(),
            paid in generators::rupee_amount()
        ) {
            let totals = reconcile(&ledger, &selected, &catalog, discount, paid);
            assert_totals_consistent(&totals, &ledger, discount, paid);
        }

        #[test]
        fn amount_due_never_goes_negative(
            ledger in generators::ledger(6),
            (catalog, selected) in generators::catalog_with_selection(),
            discount in generators::rupee_amount(),
            paid in generators::rupee_amount()
        ) {
            let totals = reconcile(&ledger, &selected, &catalog, discount, paid);
            prop_assert!(!totals.amount_due.is_negative());
        }

        #[test]
        fn tax_amount_equals_the_snapshot_sum(
            ledger in generators::ledger(6),
            (catalog, selected) in generators::catalog_with_selection()
        ) {
            let breakdown = catalog.apply(ledger.subtotal(), &selected);
            let snapshot_sum: Money = breakdown.taxes.iter().map(|tax| tax.amount).sum();
            prop_assert_eq!(breakdown.tax_amount, snapshot_sum);
        }

        #[test]
        fn reconciliation_is_idempotent(
            ledger in generators::ledger(6),
            (catalog, selected) in generators::catalog_with_selection(),
            discount in generators::rupee_amount(),
            paid in generators::rupee_amount()
        ) {
            let first = reconcile(&ledger, &selected, &catalog, discount, paid);
            let second = reconcile(&ledger, &selected, &catalog, discount, paid);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn status_never_panics(total in -1_000_000i64..1_000_000i64, paid in generators::rupee_amount()) {
            let _ = BillStatus::derive(Money::from_rupees(total), paid);
        }
    }
}

// ============================================================================
// Catalog Construction Tests
// ============================================================================

mod catalog_tests {
    use super::*;
    use domain_billing::BillingError;

    #[test]
    fn duplicate_tax_ids_are_rejected() {
        let gst = TaxOption::new("GST", Rate::from_percent(dec!(18)));
        let duplicate = gst.clone();

        let err = TaxCatalog::from_options(vec![gst, duplicate]).unwrap_err();
        assert!(matches!(err, BillingError::DuplicateTax(_)));
    }

    #[test]
    fn same_name_different_ids_is_allowed() {
        // Two entries named GST with distinct ids; name matching picks
        // the first.
        let catalog = TestCatalogBuilder::new()
            .with_tax("GST", dec!(18))
            .with_tax("GST", dec!(12))
            .build();

        let first = catalog.match_by_name("GST").unwrap();
        assert_eq!(catalog.get(first).unwrap().rate, Rate::from_percent(dec!(18)));
    }
}
