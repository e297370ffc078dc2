//! Assertion helpers that check whole billing invariants at once

use core_kernel::Money;
use domain_billing::{BillStatus, BillTotals, ServiceLedger};

/// Asserts two amounts are equal with a labelled failure message.
pub fn assert_money_eq(actual: Money, expected: Money, context: &str) {
    assert_eq!(
        actual, expected,
        "{}: expected {}, got {}",
        context, expected, actual
    );
}

/// Asserts that a reconciled [`BillTotals`] is internally consistent
/// with the inputs it was derived from.
///
/// Checks the full chain: subtotal additivity, the tax breakdown sum,
/// the total formula, the amount-due floor, and the derived status.
pub fn assert_totals_consistent(
    totals: &BillTotals,
    ledger: &ServiceLedger,
    discount: Money,
    paid_amount: Money,
) {
    assert_money_eq(totals.sub_total, ledger.subtotal(), "sub_total");

    let snapshot_sum: Money = totals.taxes.iter().map(|tax| tax.amount).sum();
    assert_money_eq(totals.tax_amount, snapshot_sum, "tax_amount");

    assert_money_eq(
        totals.total_amount,
        totals.sub_total + totals.tax_amount - discount,
        "total_amount",
    );

    assert_money_eq(
        totals.amount_due,
        (totals.total_amount - paid_amount).max(Money::ZERO),
        "amount_due",
    );

    assert_eq!(
        totals.status,
        BillStatus::derive(totals.total_amount, paid_amount),
        "status must match the derivation for total {} and paid {}",
        totals.total_amount,
        paid_amount
    );
}
