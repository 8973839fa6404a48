//! Request handlers

pub mod citizens;
pub mod documents;
pub mod health;
pub mod payments;
pub mod reports;

use core_kernel::{DocumentKind, DocumentRef, UserId};

use crate::auth::{ensure_owner, has_role, roles, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Parses a kind segment from the URL path.
pub(crate) fn parse_kind(raw: &str) -> Result<DocumentKind, ApiError> {
    Ok(raw.parse::<DocumentKind>()?)
}

/// Gate for endpoints that change records.
pub(crate) fn require_operator(claims: &Claims) -> Result<(), ApiError> {
    if has_role(claims, roles::OPERATOR) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Operator role required".to_string()))
    }
}

/// Gate for back-office endpoints (reports, exports, reminder runs).
pub(crate) fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    if has_role(claims, roles::ADMIN) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin role required".to_string()))
    }
}

/// Resolves a document's owning operator and checks the caller against it.
pub(crate) async fn authorize_document(
    state: &AppState,
    claims: &Claims,
    document: DocumentRef,
) -> Result<(), ApiError> {
    let store = state.store.read().await;
    let owner = store
        .owner_of_document(document)
        .ok_or_else(|| ApiError::NotFound(format!("Record not found: document {document}")))?;
    ensure_owner(claims, owner)
}

/// Walks vehicle -> citizen to the owning operator.
pub(crate) fn vehicle_owner(
    store: &domain_documents::DocumentStore,
    vehicle_id: core_kernel::VehicleId,
) -> Result<UserId, ApiError> {
    let vehicle = store.get_vehicle(vehicle_id)?;
    let citizen = store.get_citizen(vehicle.citizen_id)?;
    Ok(citizen.user_id)
}
