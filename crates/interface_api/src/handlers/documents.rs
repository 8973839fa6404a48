//! Document handlers
//!
//! One set of handlers serves all seven kinds; the kind arrives as a path
//! segment and picks the variant (and, through the repository, the table).
//! The store must never run ahead of the database: creates and edits roll
//! back on a failed repository call, the cascading delete persists first.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{DocumentId, DocumentRef, Money, VehicleId};
use domain_documents::{Document, DocumentDetails};
use infra_db::{DocumentRepository, NewDocumentRecord};

use crate::auth::{ensure_owner, Claims};
use crate::dto::documents::{DocumentResponse, UpsertDocumentRequest};
use crate::error::ApiError;
use crate::handlers::{authorize_document, parse_kind, require_operator, vehicle_owner};
use crate::AppState;

/// Creates a document of the given kind under a vehicle
pub async fn create_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((vehicle_id, kind)): Path<(Uuid, String)>,
    Json(request): Json<UpsertDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    require_operator(&claims)?;
    request.validate()?;
    let kind = parse_kind(&kind)?;
    let vehicle_id = VehicleId::from_uuid(vehicle_id);

    let mut store = state.store.write().await;
    ensure_owner(&claims, vehicle_owner(&store, vehicle_id)?)?;

    let details = DocumentDetails::from_profile(
        kind,
        request.reference.clone(),
        request.start_date,
        request.expiry_date,
    );
    let document = Document::new(
        vehicle_id,
        request.total_amount.map(Money::new),
        details,
    );
    store.add_document(document.clone())?;

    if let Err(err) = DocumentRepository::new(state.pool.clone())
        .insert(
            document.document_ref(),
            NewDocumentRecord {
                vehicle_id,
                total_amount: document.bill_amount,
                reference: request.reference,
                start_date: request.start_date,
                expiry_date: request.expiry_date,
            },
        )
        .await
    {
        let mut ledger = state.ledger.write().await;
        let _ = store.delete_document(&mut ledger, document.document_ref());
        return Err(err.into());
    }

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(&document))))
}

/// Fetches one document
pub async fn get_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = DocumentRef::new(parse_kind(&kind)?, DocumentId::from_uuid(id));
    authorize_document(&state, &claims, document).await?;

    let store = state.store.read().await;
    let doc = store.get_document(document)?;
    Ok(Json(DocumentResponse::from(doc)))
}

/// Replaces the bill and fields of a document
pub async fn update_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<UpsertDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    require_operator(&claims)?;
    request.validate()?;
    let document = DocumentRef::new(parse_kind(&kind)?, DocumentId::from_uuid(id));
    authorize_document(&state, &claims, document).await?;

    let mut store = state.store.write().await;
    let previous = store.get_document(document)?.clone();
    let details = DocumentDetails::from_profile(
        document.kind,
        request.reference.clone(),
        request.start_date,
        request.expiry_date,
    );
    store.update_document(document, request.total_amount.map(Money::new), details)?;
    let response = DocumentResponse::from(store.get_document(document)?);

    if let Err(err) = DocumentRepository::new(state.pool.clone())
        .update(
            document,
            NewDocumentRecord {
                vehicle_id: previous.vehicle_id,
                total_amount: request.total_amount.map(Money::new),
                reference: request.reference,
                start_date: request.start_date,
                expiry_date: request.expiry_date,
            },
        )
        .await
    {
        let _ = store.update_document(document, previous.bill_amount, previous.details);
        return Err(err.into());
    }

    Ok(Json(response))
}

/// Deletes a document and every payment recorded against it
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    require_operator(&claims)?;
    let document = DocumentRef::new(parse_kind(&kind)?, DocumentId::from_uuid(id));
    authorize_document(&state, &claims, document).await?;

    let mut store = state.store.write().await;
    let mut ledger = state.ledger.write().await;

    DocumentRepository::new(state.pool.clone())
        .delete_cascading(document)
        .await?;
    store.delete_document(&mut ledger, document)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists a vehicle's documents of one kind, in creation order
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((vehicle_id, kind)): Path<(Uuid, String)>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let vehicle_id = VehicleId::from_uuid(vehicle_id);

    let store = state.store.read().await;
    ensure_owner(&claims, vehicle_owner(&store, vehicle_id)?)?;

    let documents = store
        .documents_of_vehicle(vehicle_id)
        .into_iter()
        .filter(|d| d.kind() == kind)
        .map(DocumentResponse::from)
        .collect();
    Ok(Json(documents))
}
