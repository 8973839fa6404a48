//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful error
//! messages than the standard macros.

use core_kernel::Money;
use domain_ledger::{BalanceSummary, SettlementStatus};

/// Asserts the full shape of a balance summary in one call.
///
/// # Panics
///
/// Panics with a labelled message naming the field that differs.
pub fn assert_balance(summary: &BalanceSummary, bill: Money, paid: Money, balance: Money) {
    assert_eq!(
        summary.bill_amount, bill,
        "bill_amount: actual={}, expected={}",
        summary.bill_amount, bill
    );
    assert_eq!(
        summary.total_paid, paid,
        "total_paid: actual={}, expected={}",
        summary.total_paid, paid
    );
    assert_eq!(
        summary.balance, balance,
        "balance: actual={}, expected={}",
        summary.balance, balance
    );
}

/// Asserts that a document values as fully settled
pub fn assert_paid(summary: &BalanceSummary) {
    assert_eq!(
        summary.status,
        SettlementStatus::Paid,
        "Expected Paid, got {:?} with balance {}",
        summary.status,
        summary.balance
    );
}

/// Asserts that a document still carries a positive balance
pub fn assert_pending(summary: &BalanceSummary) {
    assert_eq!(
        summary.status,
        SettlementStatus::Pending,
        "Expected Pending, got {:?} with balance {}",
        summary.status,
        summary.balance
    );
    assert!(
        summary.balance.is_positive(),
        "Pending status requires a positive balance, got {}",
        summary.balance
    );
}
