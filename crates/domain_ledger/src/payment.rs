//! Payment records
//!
//! A payment is one money-received entry against a specific document. A
//! document may carry any number of payments (installments); each payment
//! belongs to exactly one document through its polymorphic reference.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentRef, Money, PaymentId};

/// Maximum length accepted for the free-text remarks field.
pub const REMARKS_MAX_LEN: usize = 255;

/// One money-received entry against a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// The document this payment settles (polymorphic parent)
    pub document: DocumentRef,
    /// Amount received; always strictly positive
    pub amount_paid: Money,
    /// Date the money was received
    pub payment_date: NaiveDate,
    /// Free text, e.g. "Cash", "UPI"
    pub remarks: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment record with a fresh time-ordered id.
    ///
    /// Validation (positive amount, remarks length) is the ledger engine's
    /// job; this constructor only assembles the record.
    pub fn new(
        document: DocumentRef,
        amount_paid: Money,
        payment_date: NaiveDate,
        remarks: Option<String>,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            document,
            amount_paid,
            payment_date,
            remarks,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{DocumentId, DocumentKind};
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_new() {
        let doc = DocumentRef::new(DocumentKind::Tax, DocumentId::new());
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let payment = Payment::new(doc, Money::new(dec!(2000)), date, Some("UPI".into()));

        assert_eq!(payment.document, doc);
        assert_eq!(payment.amount_paid.amount(), dec!(2000));
        assert_eq!(payment.payment_date, date);
        assert_eq!(payment.remarks.as_deref(), Some("UPI"));
    }

    #[test]
    fn test_payment_serde_round_trip() {
        let doc = DocumentRef::new(DocumentKind::Pucc, DocumentId::new());
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let payment = Payment::new(doc, Money::new(dec!(500)), date, None);

        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payment);
    }
}
