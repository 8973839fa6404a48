//! Payment handlers
//!
//! The write path goes through the domain ledger first (validation and
//! balance rules live there), then persists the same change through the
//! payment repository. The working set must never run ahead of the
//! database: creates and edits are rolled back in the ledger when the
//! repository call fails, deletes hit the repository first. Locks are
//! held across the repository call so no reader observes the
//! intermediate state.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{DocumentId, DocumentRef, Money, PaymentId};
use infra_db::PaymentRepository;

use crate::auth::Claims;
use crate::dto::payments::{
    BalanceResponse, PaymentResponse, RecordPaymentRequest, UpdatePaymentRequest,
};
use crate::error::ApiError;
use crate::handlers::{authorize_document, parse_kind, require_operator};
use crate::AppState;

/// Records a payment against any document kind
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    require_operator(&claims)?;
    request.validate()?;
    let document = request.document()?;
    authorize_document(&state, &claims, document).await?;

    let store = state.store.read().await;
    let mut ledger = state.ledger.write().await;
    let payment = ledger.record_payment(
        &*store,
        document,
        Money::new(request.amount_paid),
        request.payment_date,
        request.remarks,
    )?;

    if let Err(err) = PaymentRepository::new(state.pool.clone())
        .insert(&payment)
        .await
    {
        let _ = ledger.delete_payment(payment.id);
        return Err(err.into());
    }

    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// Edits an existing payment
pub async fn update_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    require_operator(&claims)?;
    request.validate()?;
    let payment_id = PaymentId::from_uuid(id);

    let document = {
        let ledger = state.ledger.read().await;
        ledger
            .payment(payment_id)
            .map(|p| p.document)
            .ok_or_else(|| ApiError::NotFound(format!("Record not found: payment {payment_id}")))?
    };
    authorize_document(&state, &claims, document).await?;

    let mut ledger = state.ledger.write().await;
    let previous = ledger
        .payment(payment_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Record not found: payment {payment_id}")))?;
    let payment = ledger.update_payment(
        payment_id,
        Money::new(request.amount_paid),
        request.payment_date,
        request.remarks,
    )?;

    if let Err(err) = PaymentRepository::new(state.pool.clone())
        .update(
            payment_id,
            payment.amount_paid,
            payment.payment_date,
            payment.remarks.as_deref(),
        )
        .await
    {
        let _ = ledger.update_payment(
            payment_id,
            previous.amount_paid,
            previous.payment_date,
            previous.remarks,
        );
        return Err(err.into());
    }

    Ok(Json(payment.into()))
}

/// Deletes a payment; the parent document is untouched
pub async fn delete_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_operator(&claims)?;
    let payment_id = PaymentId::from_uuid(id);

    let document = {
        let ledger = state.ledger.read().await;
        ledger
            .payment(payment_id)
            .map(|p| p.document)
            .ok_or_else(|| ApiError::NotFound(format!("Record not found: payment {payment_id}")))?
    };
    authorize_document(&state, &claims, document).await?;

    let mut ledger = state.ledger.write().await;
    PaymentRepository::new(state.pool.clone())
        .delete(payment_id)
        .await?;
    ledger.delete_payment(payment_id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Values one document: bill, total paid, balance, status
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let document = DocumentRef::new(parse_kind(&kind)?, DocumentId::from_uuid(id));
    authorize_document(&state, &claims, document).await?;

    let store = state.store.read().await;
    let ledger = state.ledger.read().await;
    let summary = ledger.get_balance(&*store, document)?;
    Ok(Json(BalanceResponse::new(document, summary)))
}

/// All payments for one document, oldest payment date first
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let document = DocumentRef::new(parse_kind(&kind)?, DocumentId::from_uuid(id));
    authorize_document(&state, &claims, document).await?;

    let ledger = state.ledger.read().await;
    let payments = ledger
        .payments_for(document)
        .into_iter()
        .map(PaymentResponse::from)
        .collect();
    Ok(Json(payments))
}
