//! Document DTOs
//!
//! Requests speak the normalized field roles (reference / start date /
//! expiry date); the handler maps them onto the kind's own fields, so the
//! same request shape serves all seven kinds.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_documents::Document;

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertDocumentRequest {
    /// What the citizen owes for this document; omit when not yet billed
    pub total_amount: Option<Decimal>,
    /// Kind-specific identifying text (tax mode, insurer, certificate no)
    #[validate(length(max = 255))]
    pub reference: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub kind: String,
    pub vehicle_id: Uuid,
    pub total_amount: Option<Decimal>,
    pub reference: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentResponse {
    fn from(document: &Document) -> Self {
        let profile = document.details.profile();
        Self {
            id: *document.id.as_uuid(),
            kind: document.kind().wire_name().to_string(),
            vehicle_id: *document.vehicle_id.as_uuid(),
            total_amount: document.bill_amount.map(|m| m.amount()),
            reference: profile.reference.map(String::from),
            start_date: profile.start_date,
            expiry_date: profile.expiry_date,
            created_at: document.created_at,
        }
    }
}
