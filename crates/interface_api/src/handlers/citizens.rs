//! Citizen and vehicle handlers
//!
//! Writes keep the working set aligned with the database: creates and
//! edits roll back in the store when the repository call fails, cascading
//! deletes hit the repository first and drop from the store only after
//! the transaction lands. Store locks are held across the repository
//! call so readers never see the intermediate state.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{CitizenId, VehicleId};
use domain_documents::{Citizen, Vehicle};
use domain_ledger::build_statement;
use infra_db::{CitizenRepository, CitizenRow, VehicleRow};

use crate::auth::{caller_user_id, ensure_owner, Claims};
use crate::dto::citizens::{
    CitizenResponse, UpsertCitizenRequest, UpsertVehicleRequest, VehicleResponse,
};
use crate::error::ApiError;
use crate::handlers::{require_operator, vehicle_owner};
use crate::AppState;

/// Registers a new citizen under the calling operator
pub async fn create_citizen(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<UpsertCitizenRequest>,
) -> Result<(StatusCode, Json<CitizenResponse>), ApiError> {
    require_operator(&claims)?;
    request.validate()?;

    let mut store = state.store.write().await;
    let mut citizen = Citizen::new(caller_user_id(&claims)?, request.name);
    citizen.mobile_number = request.mobile_number;
    citizen.email = request.email;
    citizen.birth_date = request.birth_date;
    citizen.relation_type = request.relation_type;
    citizen.relation_name = request.relation_name;
    citizen.address = request.address;
    citizen.state = request.state;
    citizen.city_district = request.city_district;
    store.add_citizen(citizen.clone())?;

    if let Err(err) = CitizenRepository::new(state.pool.clone())
        .insert_citizen(&CitizenRow::from(&citizen))
        .await
    {
        let mut ledger = state.ledger.write().await;
        let _ = store.delete_citizen(&mut ledger, citizen.id);
        return Err(err.into());
    }

    Ok((StatusCode::CREATED, Json(CitizenResponse::from(&citizen))))
}

pub async fn get_citizen(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<CitizenResponse>, ApiError> {
    let store = state.store.read().await;
    let citizen = store.get_citizen(CitizenId::from_uuid(id))?;
    ensure_owner(&claims, citizen.user_id)?;
    Ok(Json(CitizenResponse::from(citizen)))
}

pub async fn update_citizen(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpsertCitizenRequest>,
) -> Result<Json<CitizenResponse>, ApiError> {
    require_operator(&claims)?;
    request.validate()?;
    let citizen_id = CitizenId::from_uuid(id);

    let mut store = state.store.write().await;
    let previous = store.get_citizen(citizen_id)?.clone();
    ensure_owner(&claims, previous.user_id)?;
    let mut citizen = previous.clone();
    citizen.name = request.name;
    citizen.mobile_number = request.mobile_number;
    citizen.email = request.email;
    citizen.birth_date = request.birth_date;
    citizen.relation_type = request.relation_type;
    citizen.relation_name = request.relation_name;
    citizen.address = request.address;
    citizen.state = request.state;
    citizen.city_district = request.city_district;
    store.update_citizen(citizen.clone())?;

    if let Err(err) = CitizenRepository::new(state.pool.clone())
        .update_citizen(&CitizenRow::from(&citizen))
        .await
    {
        let _ = store.update_citizen(previous);
        return Err(err.into());
    }

    Ok(Json(CitizenResponse::from(&citizen)))
}

/// Deletes a citizen with their vehicles, documents, and payments
pub async fn delete_citizen(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_operator(&claims)?;
    let citizen_id = CitizenId::from_uuid(id);

    let mut store = state.store.write().await;
    let citizen = store.get_citizen(citizen_id)?;
    ensure_owner(&claims, citizen.user_id)?;
    let mut ledger = state.ledger.write().await;

    CitizenRepository::new(state.pool.clone())
        .delete_citizen_cascading(citizen_id)
        .await?;
    store.delete_citizen(&mut ledger, citizen_id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// The account statement: every document of every vehicle with its
/// balance and payment history, newest documents first
pub async fn get_statement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<domain_ledger::AccountStatement>, ApiError> {
    let citizen_id = CitizenId::from_uuid(id);

    let store = state.store.read().await;
    let citizen = store.get_citizen(citizen_id)?;
    ensure_owner(&claims, citizen.user_id)?;

    let ledger = state.ledger.read().await;
    let statement = build_statement(&*store, &ledger, citizen_id)?;
    Ok(Json(statement))
}

/// Adds a vehicle under a citizen
pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpsertVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleResponse>), ApiError> {
    require_operator(&claims)?;
    request.validate()?;
    let citizen_id = CitizenId::from_uuid(id);

    let mut store = state.store.write().await;
    let citizen = store.get_citizen(citizen_id)?;
    ensure_owner(&claims, citizen.user_id)?;

    let mut vehicle = Vehicle::new(citizen_id, request.registration_no);
    vehicle.vehicle_type = request.vehicle_type;
    vehicle.make_model = request.make_model;
    vehicle.chassis_no = request.chassis_no;
    vehicle.engine_no = request.engine_no;
    store.add_vehicle(vehicle.clone())?;

    if let Err(err) = CitizenRepository::new(state.pool.clone())
        .insert_vehicle(&VehicleRow::from(&vehicle))
        .await
    {
        let mut ledger = state.ledger.write().await;
        let _ = store.delete_vehicle(&mut ledger, vehicle.id);
        return Err(err.into());
    }

    Ok((StatusCode::CREATED, Json(VehicleResponse::from(&vehicle))))
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VehicleResponse>>, ApiError> {
    let citizen_id = CitizenId::from_uuid(id);

    let store = state.store.read().await;
    let citizen = store.get_citizen(citizen_id)?;
    ensure_owner(&claims, citizen.user_id)?;

    let vehicles = store
        .vehicles_of_citizen(citizen_id)
        .into_iter()
        .map(VehicleResponse::from)
        .collect();
    Ok(Json(vehicles))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let vehicle_id = VehicleId::from_uuid(id);

    let store = state.store.read().await;
    ensure_owner(&claims, vehicle_owner(&store, vehicle_id)?)?;
    let vehicle = store.get_vehicle(vehicle_id)?;
    Ok(Json(VehicleResponse::from(vehicle)))
}

/// Deletes a vehicle with its documents and payments
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_operator(&claims)?;
    let vehicle_id = VehicleId::from_uuid(id);

    let mut store = state.store.write().await;
    ensure_owner(&claims, vehicle_owner(&store, vehicle_id)?)?;
    let mut ledger = state.ledger.write().await;

    CitizenRepository::new(state.pool.clone())
        .delete_vehicle_cascading(vehicle_id)
        .await?;
    store.delete_vehicle(&mut ledger, vehicle_id)?;

    Ok(StatusCode::NO_CONTENT)
}
