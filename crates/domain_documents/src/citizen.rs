//! Citizen records
//!
//! A citizen is a customer of one operator user; every vehicle, and
//! therefore every document and payment, hangs off a citizen.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CitizenId, UserId};

/// One customer record, owned by the operator who created it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citizen {
    pub id: CitizenId,
    /// The operator user this citizen belongs to; fixed after creation
    pub user_id: UserId,
    pub name: String,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// e.g. "S/O", "W/O", "D/O"
    pub relation_type: Option<String>,
    pub relation_name: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city_district: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Citizen {
    /// Creates a new citizen owned by the given operator
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: CitizenId::new_v7(),
            user_id,
            name: name.into(),
            mobile_number: None,
            email: None,
            birth_date: None,
            relation_type: None,
            relation_name: None,
            address: None,
            state: None,
            city_district: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile_number = Some(mobile.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(
        mut self,
        address: impl Into<String>,
        city_district: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.address = Some(address.into());
        self.city_district = Some(city_district.into());
        self.state = Some(state.into());
        self
    }
}
