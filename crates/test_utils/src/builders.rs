//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the rest.

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;

use core_kernel::{CitizenId, DocumentKind, Money, UserId, VehicleId};
use domain_documents::{Citizen, Document, DocumentDetails, Vehicle};

use crate::fixtures::{DateFixtures, MoneyFixtures, StringFixtures};

/// Builder for test citizens
pub struct CitizenBuilder {
    user_id: UserId,
    name: String,
    mobile_number: Option<String>,
}

impl Default for CitizenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CitizenBuilder {
    pub fn new() -> Self {
        Self {
            user_id: UserId::new(),
            name: StringFixtures::citizen_name().to_string(),
            mobile_number: Some(StringFixtures::mobile_number().to_string()),
        }
    }

    /// Randomized name and mobile, for tests that need many distinct rows
    pub fn random() -> Self {
        Self {
            user_id: UserId::new(),
            name: Name().fake(),
            mobile_number: Some(PhoneNumber().fake()),
        }
    }

    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn without_mobile(mut self) -> Self {
        self.mobile_number = None;
        self
    }

    pub fn build(self) -> Citizen {
        let mut citizen = Citizen::new(self.user_id, self.name);
        citizen.mobile_number = self.mobile_number;
        citizen
    }
}

/// Builder for test vehicles
pub struct VehicleBuilder {
    citizen_id: CitizenId,
    registration_no: String,
}

impl VehicleBuilder {
    pub fn for_citizen(citizen_id: CitizenId) -> Self {
        Self {
            citizen_id,
            registration_no: StringFixtures::registration_no().to_string(),
        }
    }

    pub fn registered(mut self, registration_no: impl Into<String>) -> Self {
        self.registration_no = registration_no.into();
        self
    }

    pub fn build(self) -> Vehicle {
        Vehicle::new(self.citizen_id, self.registration_no)
    }
}

/// Builder for test documents of any kind
pub struct DocumentBuilder {
    vehicle_id: VehicleId,
    kind: DocumentKind,
    bill_amount: Option<Money>,
    reference: Option<String>,
    start_date: Option<NaiveDate>,
    expiry_date: NaiveDate,
}

impl DocumentBuilder {
    pub fn tax(vehicle_id: VehicleId) -> Self {
        Self::of_kind(vehicle_id, DocumentKind::Tax).billed(MoneyFixtures::tax_bill())
    }

    pub fn insurance(vehicle_id: VehicleId) -> Self {
        Self::of_kind(vehicle_id, DocumentKind::Insurance).billed(MoneyFixtures::insurance_bill())
    }

    pub fn of_kind(vehicle_id: VehicleId, kind: DocumentKind) -> Self {
        Self {
            vehicle_id,
            kind,
            bill_amount: None,
            reference: None,
            start_date: Some(DateFixtures::fy_start()),
            expiry_date: DateFixtures::fy_end(),
        }
    }

    pub fn billed(mut self, amount: Money) -> Self {
        self.bill_amount = Some(amount);
        self
    }

    pub fn unbilled(mut self) -> Self {
        self.bill_amount = None;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn expiring(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = expiry_date;
        self
    }

    pub fn build(self) -> Document {
        let details = DocumentDetails::from_profile(
            self.kind,
            self.reference,
            self.start_date,
            self.expiry_date,
        );
        Document::new(self.vehicle_id, self.bill_amount, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder_produces_requested_kind() {
        let vehicle_id = VehicleId::new();
        for kind in DocumentKind::ALL {
            let doc = DocumentBuilder::of_kind(vehicle_id, kind).build();
            assert_eq!(doc.kind(), kind);
            assert_eq!(doc.vehicle_id, vehicle_id);
        }
    }

    #[test]
    fn test_tax_builder_defaults() {
        let doc = DocumentBuilder::tax(VehicleId::new()).build();
        assert_eq!(doc.kind(), DocumentKind::Tax);
        assert_eq!(doc.bill_amount, Some(MoneyFixtures::tax_bill()));
        assert_eq!(doc.expiry_date(), DateFixtures::fy_end());
    }
}
