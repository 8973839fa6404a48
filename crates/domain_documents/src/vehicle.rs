//! Vehicle records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CitizenId, VehicleId};

/// A registered vehicle, owned by exactly one citizen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Owning citizen; fixed after creation
    pub citizen_id: CitizenId,
    pub registration_no: String,
    /// e.g. "LMV", "HGV"
    pub vehicle_type: Option<String>,
    pub make_model: Option<String>,
    pub chassis_no: Option<String>,
    pub engine_no: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(citizen_id: CitizenId, registration_no: impl Into<String>) -> Self {
        Self {
            id: VehicleId::new_v7(),
            citizen_id,
            registration_no: registration_no.into(),
            vehicle_type: None,
            make_model: None,
            chassis_no: None,
            engine_no: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = Some(vehicle_type.into());
        self
    }

    pub fn with_make_model(mut self, make_model: impl Into<String>) -> Self {
        self.make_model = Some(make_model.into());
        self
    }

    pub fn with_numbers(
        mut self,
        chassis_no: impl Into<String>,
        engine_no: impl Into<String>,
    ) -> Self {
        self.chassis_no = Some(chassis_no.into());
        self.engine_no = Some(engine_no.into());
        self
    }
}
