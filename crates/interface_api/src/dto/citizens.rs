//! Citizen and vehicle DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_documents::{Citizen, Vehicle};

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertCitizenRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 20))]
    pub mobile_number: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub relation_type: Option<String>,
    pub relation_name: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city_district: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CitizenResponse {
    pub id: Uuid,
    pub name: String,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub relation_type: Option<String>,
    pub relation_name: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city_district: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Citizen> for CitizenResponse {
    fn from(citizen: &Citizen) -> Self {
        Self {
            id: *citizen.id.as_uuid(),
            name: citizen.name.clone(),
            mobile_number: citizen.mobile_number.clone(),
            email: citizen.email.clone(),
            birth_date: citizen.birth_date,
            relation_type: citizen.relation_type.clone(),
            relation_name: citizen.relation_name.clone(),
            address: citizen.address.clone(),
            state: citizen.state.clone(),
            city_district: citizen.city_district.clone(),
            created_at: citizen.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertVehicleRequest {
    #[validate(length(min = 1, max = 20))]
    pub registration_no: String,
    pub vehicle_type: Option<String>,
    pub make_model: Option<String>,
    pub chassis_no: Option<String>,
    pub engine_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub citizen_id: Uuid,
    pub registration_no: String,
    pub vehicle_type: Option<String>,
    pub make_model: Option<String>,
    pub chassis_no: Option<String>,
    pub engine_no: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Vehicle> for VehicleResponse {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: *vehicle.id.as_uuid(),
            citizen_id: *vehicle.citizen_id.as_uuid(),
            registration_no: vehicle.registration_no.clone(),
            vehicle_type: vehicle.vehicle_type.clone(),
            make_model: vehicle.make_model.clone(),
            chassis_no: vehicle.chassis_no.clone(),
            engine_no: vehicle.engine_no.clone(),
            created_at: vehicle.created_at,
        }
    }
}
