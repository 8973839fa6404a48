//! Property-based test data generators

use chrono::NaiveDate;
use proptest::prelude::*;

use core_kernel::{DocumentId, DocumentKind, DocumentRef, Money};

/// Strategy for positive money amounts in paise, up to one crore rupees
pub fn positive_money() -> impl Strategy<Value = Money> {
    (1i64..=1_000_000_000i64).prop_map(Money::from_paise)
}

/// Strategy for nullable bill amounts, including the not-yet-billed case
pub fn bill_amount() -> impl Strategy<Value = Option<Money>> {
    proptest::option::of((0i64..=1_000_000_000i64).prop_map(Money::from_paise))
}

/// Strategy over every document kind
pub fn document_kind() -> impl Strategy<Value = DocumentKind> {
    proptest::sample::select(DocumentKind::ALL.to_vec())
}

/// Strategy for fresh document references of any kind
pub fn document_ref() -> impl Strategy<Value = DocumentRef> {
    document_kind().prop_map(|kind| DocumentRef::new(kind, DocumentId::new()))
}

/// Strategy for dates within the 2026-27 financial year
pub fn fy_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..365).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2026, 4, 1)
            .unwrap()
            .checked_add_days(chrono::Days::new(offset))
            .unwrap()
    })
}
