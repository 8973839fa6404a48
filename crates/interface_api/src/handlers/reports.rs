//! Back-office handlers: expiry report, table exports, reminder runs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use core_kernel::DocumentKind;
use domain_documents::{dispatch_reminders, AlertSender, DocumentError};
use infra_db::{CitizenRepository, DocumentRepository, ExpiryRow, PaymentRepository};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::handlers::require_admin;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExpiryReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ExpiryReportRow {
    pub document_id: Uuid,
    pub kind: String,
    pub registration_no: String,
    pub citizen_name: String,
    pub mobile_number: Option<String>,
    pub expiry_date: NaiveDate,
}

impl From<ExpiryRow> for ExpiryReportRow {
    fn from(row: ExpiryRow) -> Self {
        Self {
            document_id: row.document_id,
            kind: row.kind,
            registration_no: row.registration_no,
            citizen_name: row.citizen_name,
            mobile_number: row.mobile_number,
            expiry_date: row.expiry_date,
        }
    }
}

/// Documents of every kind expiring in the window, joined up the
/// ownership chain. Defaults to today through the reminder horizon.
pub async fn expiry_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ExpiryReportQuery>,
) -> Result<Json<Vec<ExpiryReportRow>>, ApiError> {
    require_admin(&claims)?;

    let today = Utc::now().date_naive();
    let from = query.from.unwrap_or(today);
    let to = query.to.unwrap_or_else(|| {
        from.checked_add_days(Days::new(state.config.notify_days_before as u64))
            .unwrap_or(from)
    });
    if to < from {
        return Err(ApiError::BadRequest(
            "'to' date must not precede 'from' date".to_string(),
        ));
    }

    let rows = DocumentRepository::new(state.pool.clone())
        .expiring_between(from, to)
        .await?;
    Ok(Json(rows.into_iter().map(ExpiryReportRow::from).collect()))
}

/// Exports one table as CSV. Accepts `citizens`, `vehicles`, `payments`,
/// or any document kind wire name.
pub async fn export_table(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(table): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&claims)?;

    let csv = match table.as_str() {
        "citizens" => export_citizens(&state).await?,
        "vehicles" => export_vehicles(&state).await?,
        "payments" => export_payments(&state).await?,
        other => {
            let kind: DocumentKind = other
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("Unknown export table: {other}")))?;
            export_documents(&state, kind).await?
        }
    };

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{table}.csv\""),
        ),
    ];
    Ok((headers, csv))
}

async fn export_citizens(state: &AppState) -> Result<String, ApiError> {
    let rows = CitizenRepository::new(state.pool.clone())
        .list_all_citizens()
        .await?;
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "name",
        "mobile_number",
        "email",
        "address",
        "city_district",
        "state",
        "created_at",
    ])?;
    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.name,
            row.mobile_number.unwrap_or_default(),
            row.email.unwrap_or_default(),
            row.address.unwrap_or_default(),
            row.city_district.unwrap_or_default(),
            row.state.unwrap_or_default(),
            row.created_at.to_rfc3339(),
        ])?;
    }
    finish_csv(writer)
}

async fn export_vehicles(state: &AppState) -> Result<String, ApiError> {
    let rows = CitizenRepository::new(state.pool.clone())
        .list_all_vehicles()
        .await?;
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "citizen_id",
        "registration_no",
        "vehicle_type",
        "make_model",
        "chassis_no",
        "engine_no",
        "created_at",
    ])?;
    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.citizen_id.to_string(),
            row.registration_no,
            row.vehicle_type.unwrap_or_default(),
            row.make_model.unwrap_or_default(),
            row.chassis_no.unwrap_or_default(),
            row.engine_no.unwrap_or_default(),
            row.created_at.to_rfc3339(),
        ])?;
    }
    finish_csv(writer)
}

async fn export_payments(state: &AppState) -> Result<String, ApiError> {
    let payments = PaymentRepository::new(state.pool.clone()).load_all().await?;
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "payable_kind",
        "payable_id",
        "amount_paid",
        "payment_date",
        "remarks",
        "created_at",
    ])?;
    for payment in payments {
        writer.write_record([
            payment.id.as_uuid().to_string(),
            payment.document.kind.wire_name().to_string(),
            payment.document.id.as_uuid().to_string(),
            payment.amount_paid.amount().to_string(),
            payment.payment_date.to_string(),
            payment.remarks.unwrap_or_default(),
            payment.created_at.to_rfc3339(),
        ])?;
    }
    finish_csv(writer)
}

async fn export_documents(state: &AppState, kind: DocumentKind) -> Result<String, ApiError> {
    let rows = DocumentRepository::new(state.pool.clone()).list_all(kind).await?;
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "vehicle_id",
        "total_amount",
        "reference",
        "start_date",
        "expiry_date",
        "created_at",
    ])?;
    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.vehicle_id.to_string(),
            row.total_amount.map(|d| d.to_string()).unwrap_or_default(),
            row.reference.unwrap_or_default(),
            row.start_date.map(|d| d.to_string()).unwrap_or_default(),
            row.expiry_date.to_string(),
            row.created_at.to_rfc3339(),
        ])?;
    }
    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, ApiError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Sender that writes reminders to the structured log. Stands in for the
/// messaging gateway in environments without one configured.
struct LogAlertSender;

impl AlertSender for LogAlertSender {
    fn send(&self, mobile_number: &str, message: &str) -> Result<(), DocumentError> {
        info!(mobile = %mobile_number, %message, "renewal reminder");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationRunResponse {
    pub target_date: NaiveDate,
    pub sent: usize,
}

/// Sends renewal reminders for documents expiring exactly
/// `notify_days_before` days from today
pub async fn run_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<NotificationRunResponse>, ApiError> {
    require_admin(&claims)?;

    let today = Utc::now().date_naive();
    let target_date = today
        .checked_add_days(Days::new(state.config.notify_days_before as u64))
        .ok_or_else(|| ApiError::Internal("Target date out of range".to_string()))?;

    let store = state.store.read().await;
    let sent = dispatch_reminders(&store, target_date, &LogAlertSender);

    Ok(Json(NotificationRunResponse { target_date, sent }))
}
