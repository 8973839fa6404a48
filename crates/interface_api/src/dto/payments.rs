//! Payment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{DocumentId, DocumentRef, UnknownKind};
use domain_ledger::{BalanceSummary, Payment, SettlementStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    /// Wire name of the document kind (tax, insurance, fitness, permit,
    /// pucc, speed_gov, vltd)
    pub payable_kind: String,
    pub payable_id: Uuid,
    pub amount_paid: Decimal,
    pub payment_date: NaiveDate,
    #[validate(length(max = 255))]
    pub remarks: Option<String>,
}

impl RecordPaymentRequest {
    pub fn document(&self) -> Result<DocumentRef, UnknownKind> {
        let kind = self.payable_kind.parse()?;
        Ok(DocumentRef::new(kind, DocumentId::from_uuid(self.payable_id)))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaymentRequest {
    pub amount_paid: Decimal,
    pub payment_date: NaiveDate,
    #[validate(length(max = 255))]
    pub remarks: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub payable_kind: String,
    pub payable_id: Uuid,
    pub amount_paid: Decimal,
    pub payment_date: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            payable_kind: payment.document.kind.wire_name().to_string(),
            payable_id: *payment.document.id.as_uuid(),
            amount_paid: payment.amount_paid.amount(),
            payment_date: payment.payment_date,
            remarks: payment.remarks,
            created_at: payment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub payable_kind: String,
    pub payable_id: Uuid,
    pub bill_amount: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
    pub status: SettlementStatus,
}

impl BalanceResponse {
    pub fn new(document: DocumentRef, summary: BalanceSummary) -> Self {
        Self {
            payable_kind: document.kind.wire_name().to_string(),
            payable_id: *document.id.as_uuid(),
            bill_amount: summary.bill_amount.amount(),
            total_paid: summary.total_paid.amount(),
            balance: summary.balance.amount(),
            status: summary.status,
        }
    }
}
