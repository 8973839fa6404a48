//! Payment repository implementation
//!
//! All payments live in one table regardless of which document kind they
//! settle; the `(payable_kind, payable_id)` pair is the polymorphic key
//! back into the seven document tables. Totals are aggregated in SQL so
//! a balance read never trusts a stored figure.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{DocumentId, DocumentKind, DocumentRef, Money, PaymentId};
use domain_ledger::Payment;

use crate::error::DatabaseError;

/// Repository for the polymorphic payments table
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

/// Database row for a payment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub payable_kind: String,
    pub payable_id: Uuid,
    pub amount_paid: Decimal,
    pub payment_date: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PaymentRow {
    /// Maps a row back into the domain payment.
    ///
    /// Fails only if the stored `payable_kind` is not one of the seven
    /// wire names, which would mean the table was written around the
    /// application.
    pub fn into_payment(self) -> Result<Payment, DatabaseError> {
        let kind = DocumentKind::from_str(&self.payable_kind).map_err(|_| {
            DatabaseError::ConstraintViolation(format!(
                "unknown payable_kind '{}' on payment {}",
                self.payable_kind, self.id
            ))
        })?;
        Ok(Payment {
            id: PaymentId::from_uuid(self.id),
            document: DocumentRef::new(kind, DocumentId::from_uuid(self.payable_id)),
            amount_paid: Money::new(self.amount_paid),
            payment_date: self.payment_date,
            remarks: self.remarks,
            created_at: self.created_at,
        })
    }
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists one payment row.
    pub async fn insert(&self, payment: &Payment) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, payable_kind, payable_id, amount_paid,
                payment_date, remarks, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.document.kind.wire_name())
        .bind(payment.document.id.as_uuid())
        .bind(payment.amount_paid.amount())
        .bind(payment.payment_date)
        .bind(&payment.remarks)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Updates amount, date, and remarks of an existing payment.
    ///
    /// The document association is immutable; re-pointing a payment at a
    /// different document is a delete plus a fresh insert.
    pub async fn update(
        &self,
        payment_id: PaymentId,
        amount_paid: Money,
        payment_date: NaiveDate,
        remarks: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET amount_paid = $2, payment_date = $3, remarks = $4
            WHERE id = $1
            "#,
        )
        .bind(payment_id.as_uuid())
        .bind(amount_paid.amount())
        .bind(payment_date)
        .bind(remarks)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", payment_id));
        }
        Ok(())
    }

    pub async fn delete(&self, payment_id: PaymentId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment_id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", payment_id));
        }
        Ok(())
    }

    pub async fn fetch(&self, payment_id: PaymentId) -> Result<Payment, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, payable_kind, payable_id, amount_paid,
                   payment_date, remarks, created_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(payment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Payment", payment_id))?;

        row.into_payment()
    }

    /// All payments for one document, oldest payment date first.
    pub async fn list_for_document(
        &self,
        document: DocumentRef,
    ) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, payable_kind, payable_id, amount_paid,
                   payment_date, remarks, created_at
            FROM payments
            WHERE payable_kind = $1 AND payable_id = $2
            ORDER BY payment_date, created_at
            "#,
        )
        .bind(document.kind.wire_name())
        .bind(document.id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }

    /// Sum over the document's payment set, aggregated in the database.
    pub async fn total_paid(&self, document: DocumentRef) -> Result<Money, DatabaseError> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_paid), 0)
            FROM payments
            WHERE payable_kind = $1 AND payable_id = $2
            "#,
        )
        .bind(document.kind.wire_name())
        .bind(document.id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::new(total))
    }

    /// Cascade hook for document deletion. Returns how many rows went.
    pub async fn delete_for_document(&self, document: DocumentRef) -> Result<u64, DatabaseError> {
        let result =
            sqlx::query("DELETE FROM payments WHERE payable_kind = $1 AND payable_id = $2")
                .bind(document.kind.wire_name())
                .bind(document.id.as_uuid())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Every payment row, for ledger rehydration and exports.
    pub async fn load_all(&self) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, payable_kind, payable_id, amount_paid,
                   payment_date, remarks, created_at
            FROM payments
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }
}
