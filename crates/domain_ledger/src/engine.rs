//! Payment ledger engine
//!
//! Single source of truth for recording, editing, deleting, and valuing
//! payments against any document kind.
//!
//! # Invariants
//!
//! - `amount_paid` is strictly positive on every stored payment
//! - every payment references a document that existed when it was recorded;
//!   document deletion must go through [`PaymentLedger::remove_document_payments`]
//!   so no orphans remain
//! - balances are never stored; [`PaymentLedger::get_balance`] recomputes
//!   from the live payment set on every call, so edits and deletes can
//!   never leave a stale figure behind

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{DocumentRef, Money, PaymentId};

use crate::error::LedgerError;
use crate::payment::{Payment, REMARKS_MAX_LEN};
use crate::ports::DocumentResolver;

/// Settlement status of a document, derived from its balance.
///
/// Overpayment (negative balance) is reported as `Paid`; the ledger does
/// not cap payments against the remaining balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
    Paid,
    Pending,
}

impl SettlementStatus {
    /// `Paid` when the balance is zero or negative, `Pending` otherwise.
    pub fn from_balance(balance: Money) -> Self {
        if balance.is_positive() {
            SettlementStatus::Pending
        } else {
            SettlementStatus::Paid
        }
    }
}

/// The valuation of one document: bill, paid-to-date, and what remains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Stored bill amount, with a missing bill valued as zero
    pub bill_amount: Money,
    /// Sum over the document's payment set
    pub total_paid: Money,
    /// `bill_amount - total_paid`; negative means overpaid
    pub balance: Money,
    pub status: SettlementStatus,
}

impl BalanceSummary {
    /// Values a document from its (nullable) bill and its payment total.
    pub fn compute(bill_amount: Option<Money>, total_paid: Money) -> Self {
        let bill_amount = bill_amount.unwrap_or_else(Money::zero);
        let balance = bill_amount - total_paid;
        Self {
            bill_amount,
            total_paid,
            balance,
            status: SettlementStatus::from_balance(balance),
        }
    }
}

/// The payment ledger: owns every payment row and values documents.
///
/// The ledger is owner-agnostic. Authorization (which operator may touch
/// which citizen's documents) happens at the boundary before any call
/// reaches here.
#[derive(Debug, Default)]
pub struct PaymentLedger {
    payments: HashMap<PaymentId, Payment>,
    /// Per-document payment ids in insertion order
    by_document: HashMap<DocumentRef, Vec<PaymentId>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new payment against a document.
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is not strictly positive or the remarks
    ///   exceed the column limit
    /// - `NotFound` if the document does not resolve in its kind's collection
    pub fn record_payment(
        &mut self,
        resolver: &dyn DocumentResolver,
        document: DocumentRef,
        amount_paid: Money,
        payment_date: NaiveDate,
        remarks: Option<String>,
    ) -> Result<Payment, LedgerError> {
        validate_payment_input(amount_paid, remarks.as_deref())?;

        if resolver.resolve(document).is_none() {
            return Err(LedgerError::not_found(format!("document {document}")));
        }

        let payment = Payment::new(document, amount_paid, payment_date, remarks);
        debug!(payment = %payment.id, %document, amount = %amount_paid, "recording payment");

        self.by_document.entry(document).or_default().push(payment.id);
        self.payments.insert(payment.id, payment.clone());

        Ok(payment)
    }

    /// Edits an existing payment in place.
    ///
    /// Same validation as [`PaymentLedger::record_payment`]; the payment
    /// keeps its document association and its position in insertion order.
    pub fn update_payment(
        &mut self,
        payment_id: PaymentId,
        amount_paid: Money,
        payment_date: NaiveDate,
        remarks: Option<String>,
    ) -> Result<Payment, LedgerError> {
        validate_payment_input(amount_paid, remarks.as_deref())?;

        let payment = self
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| LedgerError::not_found(format!("payment {payment_id}")))?;

        payment.amount_paid = amount_paid;
        payment.payment_date = payment_date;
        payment.remarks = remarks;

        Ok(payment.clone())
    }

    /// Deletes one payment. The parent document is untouched.
    pub fn delete_payment(&mut self, payment_id: PaymentId) -> Result<(), LedgerError> {
        let payment = self
            .payments
            .remove(&payment_id)
            .ok_or_else(|| LedgerError::not_found(format!("payment {payment_id}")))?;

        if let Some(ids) = self.by_document.get_mut(&payment.document) {
            ids.retain(|id| *id != payment_id);
            if ids.is_empty() {
                self.by_document.remove(&payment.document);
            }
        }

        debug!(payment = %payment_id, document = %payment.document, "deleted payment");
        Ok(())
    }

    /// Looks up a single payment.
    pub fn payment(&self, payment_id: PaymentId) -> Option<&Payment> {
        self.payments.get(&payment_id)
    }

    /// All payments for a document, ordered by payment date then by the
    /// order they were recorded.
    pub fn payments_for(&self, document: DocumentRef) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .by_document
            .get(&document)
            .map(|ids| ids.iter().filter_map(|id| self.payments.get(id)).cloned().collect())
            .unwrap_or_default();
        payments.sort_by_key(|p| p.payment_date);
        payments
    }

    /// Sum over the document's payment set. Order-independent.
    pub fn total_paid(&self, document: DocumentRef) -> Money {
        self.by_document
            .get(&document)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.payments.get(id))
                    .map(|p| p.amount_paid)
                    .sum()
            })
            .unwrap_or_else(Money::zero)
    }

    /// Values a document: bill, total paid, balance, status.
    ///
    /// Pure read, recomputed fresh from the payment set. A document with no
    /// bill amount is still valued (bill treated as zero), so the balance of
    /// an unbilled-but-paid document comes out negative and reports `Paid`.
    pub fn get_balance(
        &self,
        resolver: &dyn DocumentResolver,
        document: DocumentRef,
    ) -> Result<BalanceSummary, LedgerError> {
        let meta = resolver
            .resolve(document)
            .ok_or_else(|| LedgerError::not_found(format!("document {document}")))?;

        Ok(BalanceSummary::compute(meta.bill_amount, self.total_paid(document)))
    }

    /// Cascade hook: removes every payment of a document being deleted.
    ///
    /// Returns how many payments were removed. Idempotent; a document with
    /// no payments removes zero.
    pub fn remove_document_payments(&mut self, document: DocumentRef) -> usize {
        let ids = self.by_document.remove(&document).unwrap_or_default();
        for id in &ids {
            self.payments.remove(id);
        }
        if !ids.is_empty() {
            debug!(%document, count = ids.len(), "cascaded payment deletion");
        }
        ids.len()
    }

    /// Total number of payments across all documents.
    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Loads an existing payment row, e.g. when rehydrating from storage.
    ///
    /// Skips validation-by-construction only in the sense that the row is
    /// assumed to have been validated when first recorded.
    pub fn load(&mut self, payment: Payment) {
        self.by_document
            .entry(payment.document)
            .or_default()
            .push(payment.id);
        self.payments.insert(payment.id, payment);
    }
}

fn validate_payment_input(amount: Money, remarks: Option<&str>) -> Result<(), LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::validation("Amount must be positive"));
    }
    if let Some(remarks) = remarks {
        if remarks.len() > REMARKS_MAX_LEN {
            return Err(LedgerError::validation(format!(
                "Remarks must be at most {REMARKS_MAX_LEN} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{DocumentId, DocumentKind, VehicleId};
    use rust_decimal_macros::dec;

    use crate::ports::DocumentMeta;

    /// Resolver over a fixed set of documents, for engine-level tests.
    struct FixedResolver(Vec<DocumentMeta>);

    impl DocumentResolver for FixedResolver {
        fn resolve(&self, document: DocumentRef) -> Option<DocumentMeta> {
            self.0.iter().find(|m| m.document == document).cloned()
        }
    }

    fn tax_doc(bill: Option<Money>) -> (FixedResolver, DocumentRef) {
        let document = DocumentRef::new(DocumentKind::Tax, DocumentId::new());
        let resolver = FixedResolver(vec![DocumentMeta {
            document,
            vehicle_id: VehicleId::new(),
            bill_amount: bill,
            created_at: Utc::now(),
        }]);
        (resolver, document)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    #[test]
    fn test_record_payment_positive_amount_required() {
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(5000)));
        let mut ledger = PaymentLedger::new();

        let err = ledger
            .record_payment(&resolver, doc, Money::zero(), date(1), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err = ledger
            .record_payment(&resolver, doc, Money::new(dec!(-10)), date(1), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn test_record_payment_unknown_document() {
        let (resolver, _) = tax_doc(Some(Money::from_rupees(5000)));
        let mut ledger = PaymentLedger::new();
        let stranger = DocumentRef::new(DocumentKind::Permit, DocumentId::new());

        let err = ledger
            .record_payment(&resolver, stranger, Money::from_rupees(100), date(1), None)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_record_payment_oversized_remarks() {
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(5000)));
        let mut ledger = PaymentLedger::new();

        let err = ledger
            .record_payment(
                &resolver,
                doc,
                Money::from_rupees(100),
                date(1),
                Some("x".repeat(REMARKS_MAX_LEN + 1)),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn test_balance_recomputed_through_lifecycle() {
        // Bill 5000, pay 2000 + 1500, delete the 1500, then pay 3000.
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(5000)));
        let mut ledger = PaymentLedger::new();

        ledger
            .record_payment(&resolver, doc, Money::from_rupees(2000), date(1), None)
            .unwrap();
        let second = ledger
            .record_payment(&resolver, doc, Money::from_rupees(1500), date(5), None)
            .unwrap();

        let summary = ledger.get_balance(&resolver, doc).unwrap();
        assert_eq!(summary.total_paid.amount(), dec!(3500));
        assert_eq!(summary.balance.amount(), dec!(1500));
        assert_eq!(summary.status, SettlementStatus::Pending);

        ledger.delete_payment(second.id).unwrap();
        let summary = ledger.get_balance(&resolver, doc).unwrap();
        assert_eq!(summary.total_paid.amount(), dec!(2000));
        assert_eq!(summary.balance.amount(), dec!(3000));
        assert_eq!(summary.status, SettlementStatus::Pending);

        ledger
            .record_payment(&resolver, doc, Money::from_rupees(3000), date(9), None)
            .unwrap();
        let summary = ledger.get_balance(&resolver, doc).unwrap();
        assert_eq!(summary.total_paid.amount(), dec!(5000));
        assert_eq!(summary.balance.amount(), dec!(0));
        assert_eq!(summary.status, SettlementStatus::Paid);
    }

    #[test]
    fn test_null_bill_amount_goes_negative() {
        let (resolver, doc) = tax_doc(None);
        let mut ledger = PaymentLedger::new();

        ledger
            .record_payment(&resolver, doc, Money::from_rupees(500), date(2), None)
            .unwrap();

        let summary = ledger.get_balance(&resolver, doc).unwrap();
        assert_eq!(summary.bill_amount, Money::zero());
        assert_eq!(summary.balance.amount(), dec!(-500));
        assert_eq!(summary.status, SettlementStatus::Paid);
    }

    #[test]
    fn test_update_payment() {
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(1000)));
        let mut ledger = PaymentLedger::new();

        let payment = ledger
            .record_payment(&resolver, doc, Money::from_rupees(400), date(1), Some("Cash".into()))
            .unwrap();

        let updated = ledger
            .update_payment(payment.id, Money::from_rupees(600), date(3), Some("UPI".into()))
            .unwrap();
        assert_eq!(updated.amount_paid.amount(), dec!(600));
        assert_eq!(updated.remarks.as_deref(), Some("UPI"));

        let summary = ledger.get_balance(&resolver, doc).unwrap();
        assert_eq!(summary.balance.amount(), dec!(400));
    }

    #[test]
    fn test_update_payment_validation_leaves_state_unchanged() {
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(1000)));
        let mut ledger = PaymentLedger::new();

        let payment = ledger
            .record_payment(&resolver, doc, Money::from_rupees(400), date(1), None)
            .unwrap();

        let err = ledger
            .update_payment(payment.id, Money::zero(), date(3), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        // Failed write must not have partially applied.
        assert_eq!(ledger.payment(payment.id).unwrap().amount_paid.amount(), dec!(400));
        assert_eq!(ledger.payment(payment.id).unwrap().payment_date, date(1));
    }

    #[test]
    fn test_delete_payment_not_found() {
        let mut ledger = PaymentLedger::new();
        let err = ledger.delete_payment(PaymentId::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_deleting_a_fresh_payment_leaves_no_trace() {
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(5000)));
        let mut ledger = PaymentLedger::new();

        let payment = ledger
            .record_payment(&resolver, doc, Money::from_rupees(2000), date(1), None)
            .unwrap();
        ledger.delete_payment(payment.id).unwrap();

        assert!(ledger.is_empty());
        assert!(ledger.payments_for(doc).is_empty());
        let summary = ledger.get_balance(&resolver, doc).unwrap();
        assert_eq!(summary.total_paid.amount(), dec!(0));
        assert_eq!(summary.balance.amount(), dec!(5000));
    }

    #[test]
    fn test_reverting_an_edit_restores_the_original() {
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(1000)));
        let mut ledger = PaymentLedger::new();

        let original = ledger
            .record_payment(
                &resolver,
                doc,
                Money::from_rupees(400),
                date(1),
                Some("Cash".to_string()),
            )
            .unwrap();

        ledger
            .update_payment(original.id, Money::from_rupees(900), date(5), None)
            .unwrap();
        let restored = ledger
            .update_payment(
                original.id,
                original.amount_paid,
                original.payment_date,
                original.remarks.clone(),
            )
            .unwrap();

        assert_eq!(restored.amount_paid, original.amount_paid);
        assert_eq!(restored.payment_date, original.payment_date);
        assert_eq!(restored.remarks, original.remarks);
        let summary = ledger.get_balance(&resolver, doc).unwrap();
        assert_eq!(summary.balance.amount(), dec!(600));
    }

    #[test]
    fn test_cascade_removes_all_payments() {
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(5000)));
        let mut ledger = PaymentLedger::new();

        for day in 1..=3 {
            ledger
                .record_payment(&resolver, doc, Money::from_rupees(100), date(day), None)
                .unwrap();
        }

        assert_eq!(ledger.remove_document_payments(doc), 3);
        assert!(ledger.is_empty());
        assert!(ledger.payments_for(doc).is_empty());
        // Idempotent on the second pass
        assert_eq!(ledger.remove_document_payments(doc), 0);
    }

    #[test]
    fn test_payments_for_ordered_by_date_then_insertion() {
        let (resolver, doc) = tax_doc(Some(Money::from_rupees(5000)));
        let mut ledger = PaymentLedger::new();

        let late = ledger
            .record_payment(&resolver, doc, Money::from_rupees(1), date(20), None)
            .unwrap();
        let early_a = ledger
            .record_payment(&resolver, doc, Money::from_rupees(2), date(5), None)
            .unwrap();
        let early_b = ledger
            .record_payment(&resolver, doc, Money::from_rupees(3), date(5), None)
            .unwrap();

        let ordered: Vec<PaymentId> = ledger.payments_for(doc).iter().map(|p| p.id).collect();
        assert_eq!(ordered, vec![early_a.id, early_b.id, late.id]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{DocumentId, DocumentKind, VehicleId};
    use proptest::prelude::*;

    use crate::ports::DocumentMeta;

    struct SingleDoc(DocumentMeta);

    impl DocumentResolver for SingleDoc {
        fn resolve(&self, document: DocumentRef) -> Option<DocumentMeta> {
            (self.0.document == document).then(|| self.0.clone())
        }
    }

    proptest! {
        /// balance(D) == bill(D) - sum(payments(D)) for any payment set.
        #[test]
        fn balance_equals_bill_minus_payment_sum(
            bill in 0i64..10_000_000i64,
            amounts in proptest::collection::vec(1i64..1_000_000i64, 0..30)
        ) {
            let document = DocumentRef::new(DocumentKind::Insurance, DocumentId::new());
            let resolver = SingleDoc(DocumentMeta {
                document,
                vehicle_id: VehicleId::new(),
                bill_amount: Some(Money::from_paise(bill)),
                created_at: Utc::now(),
            });

            let mut ledger = PaymentLedger::new();
            let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
            for paise in &amounts {
                ledger
                    .record_payment(&resolver, document, Money::from_paise(*paise), date, None)
                    .unwrap();
            }

            let expected_paid: Money = amounts.iter().map(|p| Money::from_paise(*p)).sum();
            let summary = ledger.get_balance(&resolver, document).unwrap();
            prop_assert_eq!(summary.total_paid, expected_paid);
            prop_assert_eq!(summary.balance, Money::from_paise(bill) - expected_paid);
        }

        /// Deleting a payment removes exactly its contribution.
        #[test]
        fn delete_removes_exact_contribution(
            amounts in proptest::collection::vec(1i64..1_000_000i64, 1..20),
            victim_index in 0usize..20
        ) {
            let document = DocumentRef::new(DocumentKind::Fitness, DocumentId::new());
            let resolver = SingleDoc(DocumentMeta {
                document,
                vehicle_id: VehicleId::new(),
                bill_amount: Some(Money::from_rupees(100)),
                created_at: Utc::now(),
            });

            let mut ledger = PaymentLedger::new();
            let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
            let mut recorded = Vec::new();
            for paise in &amounts {
                let p = ledger
                    .record_payment(&resolver, document, Money::from_paise(*paise), date, None)
                    .unwrap();
                recorded.push(p);
            }

            let victim = &recorded[victim_index % recorded.len()];
            let before = ledger.total_paid(document);
            ledger.delete_payment(victim.id).unwrap();
            let after = ledger.total_paid(document);
            prop_assert_eq!(before - after, victim.amount_paid);
        }
    }
}
