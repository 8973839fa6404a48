//! Document repository implementation
//!
//! Each document kind has its own table with its own column names; this
//! module owns the map from kind to table layout and speaks a normalized
//! row shape (reference / start date / expiry date) to the rest of the
//! system. Document deletion and payment cascade run in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{DocumentKind, DocumentRef, Money, VehicleId};

use crate::error::DatabaseError;

/// Table layout for one document kind.
///
/// All identifiers come from the fixed map below, never from request
/// input, so interpolating them into SQL text is safe.
#[derive(Debug, Clone, Copy)]
pub struct TableProfile {
    pub table: &'static str,
    pub reference_col: &'static str,
    pub start_col: &'static str,
    pub expiry_col: &'static str,
}

/// The kind -> table map. One row per document table in the schema.
pub fn table_profile(kind: DocumentKind) -> TableProfile {
    match kind {
        DocumentKind::Tax => TableProfile {
            table: "taxes",
            reference_col: "tax_mode",
            start_col: "from_date",
            expiry_col: "upto_date",
        },
        DocumentKind::Insurance => TableProfile {
            table: "insurances",
            reference_col: "company",
            start_col: "start_date",
            expiry_col: "end_date",
        },
        DocumentKind::Fitness => TableProfile {
            table: "fitnesses",
            reference_col: "certificate_no",
            start_col: "issue_date",
            expiry_col: "expiry_date",
        },
        DocumentKind::Permit => TableProfile {
            table: "permits",
            reference_col: "permit_no",
            start_col: "issue_date",
            expiry_col: "expiry_date",
        },
        DocumentKind::Pucc => TableProfile {
            table: "puccs",
            reference_col: "pucc_number",
            start_col: "valid_from",
            expiry_col: "valid_until",
        },
        DocumentKind::SpeedGov => TableProfile {
            table: "speed_governors",
            reference_col: "vendor_name",
            start_col: "issue_date",
            expiry_col: "expiry_date",
        },
        DocumentKind::Vltd => TableProfile {
            table: "vltds",
            reference_col: "vendor_name",
            start_col: "issue_date",
            expiry_col: "expiry_date",
        },
    }
}

/// Normalized row shape shared by all seven document tables
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub total_amount: Option<Decimal>,
    pub reference: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl DocumentRow {
    pub fn bill_amount(&self) -> Option<Money> {
        self.total_amount.map(Money::new)
    }
}

/// Data for creating or replacing a document record
#[derive(Debug, Clone)]
pub struct NewDocumentRecord {
    pub vehicle_id: VehicleId,
    pub total_amount: Option<Money>,
    pub reference: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

/// One row of the cross-kind expiry union, joined up the ownership chain
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExpiryRow {
    pub document_id: Uuid,
    pub kind: String,
    pub registration_no: String,
    pub citizen_name: String,
    pub mobile_number: Option<String>,
    pub expiry_date: NaiveDate,
}

/// Repository over the seven per-kind document tables
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new document into its kind's table under the given ref.
    pub async fn insert(
        &self,
        document: DocumentRef,
        record: NewDocumentRecord,
    ) -> Result<(), DatabaseError> {
        let profile = table_profile(document.kind);
        let sql = format!(
            r#"
            INSERT INTO {table} (id, vehicle_id, total_amount, {reference}, {start}, {expiry}, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
            table = profile.table,
            reference = profile.reference_col,
            start = profile.start_col,
            expiry = profile.expiry_col,
        );

        sqlx::query(&sql)
            .bind(document.id.as_uuid())
            .bind(record.vehicle_id.as_uuid())
            .bind(record.total_amount.map(|m| m.amount()))
            .bind(&record.reference)
            .bind(record.start_date)
            .bind(record.expiry_date)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn fetch(&self, document: DocumentRef) -> Result<DocumentRow, DatabaseError> {
        let profile = table_profile(document.kind);
        let sql = format!(
            r#"
            SELECT id, vehicle_id, total_amount,
                   {reference} AS reference, {start} AS start_date,
                   {expiry} AS expiry_date, created_at
            FROM {table}
            WHERE id = $1
            "#,
            table = profile.table,
            reference = profile.reference_col,
            start = profile.start_col,
            expiry = profile.expiry_col,
        );

        sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(document.id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Document", document))
    }

    /// Replaces the bill and normalized fields of an existing document.
    pub async fn update(
        &self,
        document: DocumentRef,
        record: NewDocumentRecord,
    ) -> Result<(), DatabaseError> {
        let profile = table_profile(document.kind);
        let sql = format!(
            r#"
            UPDATE {table}
            SET total_amount = $2, {reference} = $3, {start} = $4, {expiry} = $5
            WHERE id = $1
            "#,
            table = profile.table,
            reference = profile.reference_col,
            start = profile.start_col,
            expiry = profile.expiry_col,
        );

        let result = sqlx::query(&sql)
            .bind(document.id.as_uuid())
            .bind(record.total_amount.map(|m| m.amount()))
            .bind(&record.reference)
            .bind(record.start_date)
            .bind(record.expiry_date)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Document", document));
        }
        Ok(())
    }

    /// Deletes a document and its payments in one transaction.
    ///
    /// Returns how many payments went with it. Either both deletes land
    /// or neither does, so no payment can outlive its document.
    pub async fn delete_cascading(&self, document: DocumentRef) -> Result<u64, DatabaseError> {
        let profile = table_profile(document.kind);
        let mut tx = self.pool.begin().await?;

        let payments = sqlx::query("DELETE FROM payments WHERE payable_kind = $1 AND payable_id = $2")
            .bind(document.kind.wire_name())
            .bind(document.id.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let sql = format!("DELETE FROM {} WHERE id = $1", profile.table);
        let documents = sqlx::query(&sql)
            .bind(document.id.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if documents == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::not_found("Document", document));
        }

        tx.commit().await?;
        debug!(%document, payments_removed = payments, "deleted document");
        Ok(payments)
    }

    /// All documents of one kind attached to a vehicle, in creation order.
    pub async fn list_for_vehicle(
        &self,
        kind: DocumentKind,
        vehicle_id: VehicleId,
    ) -> Result<Vec<DocumentRow>, DatabaseError> {
        let profile = table_profile(kind);
        let sql = format!(
            r#"
            SELECT id, vehicle_id, total_amount,
                   {reference} AS reference, {start} AS start_date,
                   {expiry} AS expiry_date, created_at
            FROM {table}
            WHERE vehicle_id = $1
            ORDER BY created_at
            "#,
            table = profile.table,
            reference = profile.reference_col,
            start = profile.start_col,
            expiry = profile.expiry_col,
        );

        Ok(sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(vehicle_id.as_uuid())
            .fetch_all(&self.pool)
            .await?)
    }

    /// Every row of one kind's table, for exports.
    pub async fn list_all(&self, kind: DocumentKind) -> Result<Vec<DocumentRow>, DatabaseError> {
        let profile = table_profile(kind);
        let sql = format!(
            r#"
            SELECT id, vehicle_id, total_amount,
                   {reference} AS reference, {start} AS start_date,
                   {expiry} AS expiry_date, created_at
            FROM {table}
            ORDER BY created_at
            "#,
            table = profile.table,
            reference = profile.reference_col,
            start = profile.start_col,
            expiry = profile.expiry_col,
        );

        Ok(sqlx::query_as::<_, DocumentRow>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Union over all seven tables: documents expiring in `[from, to]`,
    /// joined to vehicle and citizen, sorted by expiry date.
    pub async fn expiring_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ExpiryRow>, DatabaseError> {
        let arms: Vec<String> = DocumentKind::ALL
            .iter()
            .map(|kind| {
                let profile = table_profile(*kind);
                format!(
                    r#"
                    SELECT d.id AS document_id, '{kind}' AS kind,
                           v.registration_no, c.name AS citizen_name,
                           c.mobile_number, d.{expiry} AS expiry_date
                    FROM {table} d
                    JOIN vehicles v ON v.id = d.vehicle_id
                    JOIN citizens c ON c.id = v.citizen_id
                    WHERE d.{expiry} BETWEEN $1 AND $2
                    "#,
                    kind = kind.wire_name(),
                    table = profile.table,
                    expiry = profile.expiry_col,
                )
            })
            .collect();
        let sql = format!("{} ORDER BY expiry_date, document_id", arms.join(" UNION ALL "));

        Ok(sqlx::query_as::<_, ExpiryRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?)
    }
}
