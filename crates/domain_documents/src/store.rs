//! In-memory document store
//!
//! Owns the full ownership chain (citizen -> vehicle -> documents) and is
//! the canonical implementation of the ledger's read ports. Deletions
//! cascade downward and take the ledger along so no payment row survives
//! its document.

use std::collections::HashMap;

use tracing::debug;

use core_kernel::{CitizenId, DocumentKind, DocumentRef, Money, UserId, VehicleId};
use domain_ledger::{
    CitizenSummary, DocumentMeta, DocumentResolver, DocumentSnapshot, PaymentLedger,
    StatementSource, VehicleSummary,
};

use crate::citizen::Citizen;
use crate::document::{Document, DocumentDetails};
use crate::error::DocumentError;
use crate::vehicle::Vehicle;

/// In-memory record store for citizens, vehicles, and documents.
///
/// Insertion order is preserved per collection so listings and statement
/// rows come out in creation order.
#[derive(Debug, Default)]
pub struct DocumentStore {
    citizens: HashMap<CitizenId, Citizen>,
    citizen_order: Vec<CitizenId>,
    vehicles: HashMap<VehicleId, Vehicle>,
    vehicle_order: Vec<VehicleId>,
    documents: HashMap<DocumentRef, Document>,
    document_order: Vec<DocumentRef>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- citizens -----------------------------------------------------------

    pub fn add_citizen(&mut self, citizen: Citizen) -> Result<CitizenId, DocumentError> {
        if citizen.name.trim().is_empty() {
            return Err(DocumentError::validation("Citizen name must not be empty"));
        }
        let id = citizen.id;
        self.citizen_order.push(id);
        self.citizens.insert(id, citizen);
        Ok(id)
    }

    pub fn get_citizen(&self, id: CitizenId) -> Result<&Citizen, DocumentError> {
        self.citizens
            .get(&id)
            .ok_or_else(|| DocumentError::not_found(format!("citizen {id}")))
    }

    pub fn update_citizen(&mut self, citizen: Citizen) -> Result<(), DocumentError> {
        if citizen.name.trim().is_empty() {
            return Err(DocumentError::validation("Citizen name must not be empty"));
        }
        let existing = self
            .citizens
            .get_mut(&citizen.id)
            .ok_or_else(|| DocumentError::not_found(format!("citizen {}", citizen.id)))?;
        // Ownership and creation time are fixed after creation.
        let (user_id, created_at) = (existing.user_id, existing.created_at);
        *existing = Citizen {
            user_id,
            created_at,
            ..citizen
        };
        Ok(())
    }

    /// Deletes a citizen, cascading through vehicles, documents, and payments.
    ///
    /// Returns how many payments were removed from the ledger.
    pub fn delete_citizen(
        &mut self,
        ledger: &mut PaymentLedger,
        id: CitizenId,
    ) -> Result<usize, DocumentError> {
        if !self.citizens.contains_key(&id) {
            return Err(DocumentError::not_found(format!("citizen {id}")));
        }
        let vehicle_ids: Vec<VehicleId> = self
            .vehicle_order
            .iter()
            .copied()
            .filter(|v| self.vehicles[v].citizen_id == id)
            .collect();

        let mut removed = 0;
        for vehicle_id in vehicle_ids {
            removed += self.delete_vehicle(ledger, vehicle_id)?;
        }
        self.citizens.remove(&id);
        self.citizen_order.retain(|c| *c != id);
        debug!(citizen = %id, payments_removed = removed, "deleted citizen");
        Ok(removed)
    }

    pub fn citizens(&self) -> impl Iterator<Item = &Citizen> {
        self.citizen_order.iter().filter_map(|id| self.citizens.get(id))
    }

    pub fn citizens_of_user(&self, user_id: UserId) -> Vec<&Citizen> {
        self.citizens().filter(|c| c.user_id == user_id).collect()
    }

    // -- vehicles -----------------------------------------------------------

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<VehicleId, DocumentError> {
        if vehicle.registration_no.trim().is_empty() {
            return Err(DocumentError::validation(
                "Vehicle registration number must not be empty",
            ));
        }
        if !self.citizens.contains_key(&vehicle.citizen_id) {
            return Err(DocumentError::not_found(format!(
                "citizen {}",
                vehicle.citizen_id
            )));
        }
        let id = vehicle.id;
        self.vehicle_order.push(id);
        self.vehicles.insert(id, vehicle);
        Ok(id)
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Result<&Vehicle, DocumentError> {
        self.vehicles
            .get(&id)
            .ok_or_else(|| DocumentError::not_found(format!("vehicle {id}")))
    }

    pub fn update_vehicle(&mut self, vehicle: Vehicle) -> Result<(), DocumentError> {
        if vehicle.registration_no.trim().is_empty() {
            return Err(DocumentError::validation(
                "Vehicle registration number must not be empty",
            ));
        }
        let existing = self
            .vehicles
            .get_mut(&vehicle.id)
            .ok_or_else(|| DocumentError::not_found(format!("vehicle {}", vehicle.id)))?;
        let (citizen_id, created_at) = (existing.citizen_id, existing.created_at);
        *existing = Vehicle {
            citizen_id,
            created_at,
            ..vehicle
        };
        Ok(())
    }

    /// Deletes a vehicle, cascading through its documents and their payments.
    ///
    /// Returns how many payments were removed from the ledger.
    pub fn delete_vehicle(
        &mut self,
        ledger: &mut PaymentLedger,
        id: VehicleId,
    ) -> Result<usize, DocumentError> {
        if !self.vehicles.contains_key(&id) {
            return Err(DocumentError::not_found(format!("vehicle {id}")));
        }
        let refs: Vec<DocumentRef> = self
            .document_order
            .iter()
            .copied()
            .filter(|r| self.documents[r].vehicle_id == id)
            .collect();

        let mut removed = 0;
        for document in refs {
            removed += self.delete_document(ledger, document)?;
        }
        self.vehicles.remove(&id);
        self.vehicle_order.retain(|v| *v != id);
        debug!(vehicle = %id, payments_removed = removed, "deleted vehicle");
        Ok(removed)
    }

    pub fn vehicles_of_citizen(&self, citizen_id: CitizenId) -> Vec<&Vehicle> {
        self.vehicle_order
            .iter()
            .filter_map(|id| self.vehicles.get(id))
            .filter(|v| v.citizen_id == citizen_id)
            .collect()
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicle_order.iter().filter_map(|id| self.vehicles.get(id))
    }

    // -- documents ----------------------------------------------------------

    pub fn add_document(&mut self, document: Document) -> Result<DocumentRef, DocumentError> {
        if !self.vehicles.contains_key(&document.vehicle_id) {
            return Err(DocumentError::not_found(format!(
                "vehicle {}",
                document.vehicle_id
            )));
        }
        validate_bill(document.bill_amount)?;
        let document_ref = document.document_ref();
        self.document_order.push(document_ref);
        self.documents.insert(document_ref, document);
        Ok(document_ref)
    }

    pub fn get_document(&self, document: DocumentRef) -> Result<&Document, DocumentError> {
        self.documents
            .get(&document)
            .ok_or_else(|| DocumentError::not_found(format!("document {document}")))
    }

    /// Replaces the bill and details of an existing document.
    ///
    /// The new details must stay within the document's kind; a record in
    /// one kind's collection cannot turn into another kind.
    pub fn update_document(
        &mut self,
        document: DocumentRef,
        bill_amount: Option<Money>,
        details: DocumentDetails,
    ) -> Result<(), DocumentError> {
        if details.kind() != document.kind {
            return Err(DocumentError::validation(format!(
                "Details of kind {} do not match document {}",
                details.kind().wire_name(),
                document
            )));
        }
        validate_bill(bill_amount)?;
        let existing = self
            .documents
            .get_mut(&document)
            .ok_or_else(|| DocumentError::not_found(format!("document {document}")))?;
        existing.bill_amount = bill_amount;
        existing.details = details;
        Ok(())
    }

    /// Deletes one document and cascades its payments out of the ledger.
    ///
    /// Returns how many payments were removed.
    pub fn delete_document(
        &mut self,
        ledger: &mut PaymentLedger,
        document: DocumentRef,
    ) -> Result<usize, DocumentError> {
        if self.documents.remove(&document).is_none() {
            return Err(DocumentError::not_found(format!("document {document}")));
        }
        self.document_order.retain(|r| *r != document);
        let removed = ledger.remove_document_payments(document);
        debug!(%document, payments_removed = removed, "deleted document");
        Ok(removed)
    }

    pub fn documents_of_vehicle(&self, vehicle_id: VehicleId) -> Vec<&Document> {
        self.document_order
            .iter()
            .filter_map(|r| self.documents.get(r))
            .filter(|d| d.vehicle_id == vehicle_id)
            .collect()
    }

    pub fn documents_of_kind(&self, kind: DocumentKind) -> Vec<&Document> {
        self.document_order
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| self.documents.get(r))
            .collect()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.document_order.iter().filter_map(|r| self.documents.get(r))
    }

    // -- ownership chain ----------------------------------------------------

    /// Walks document -> vehicle -> citizen to find the owning citizen.
    pub fn citizen_of_document(&self, document: DocumentRef) -> Option<&Citizen> {
        let doc = self.documents.get(&document)?;
        let vehicle = self.vehicles.get(&doc.vehicle_id)?;
        self.citizens.get(&vehicle.citizen_id)
    }

    /// The operator user at the top of the document's ownership chain.
    pub fn owner_of_document(&self, document: DocumentRef) -> Option<UserId> {
        self.citizen_of_document(document).map(|c| c.user_id)
    }
}

fn validate_bill(bill_amount: Option<Money>) -> Result<(), DocumentError> {
    match bill_amount {
        Some(bill) if bill.is_negative() => {
            Err(DocumentError::validation("Bill amount must not be negative"))
        }
        _ => Ok(()),
    }
}

impl DocumentResolver for DocumentStore {
    fn resolve(&self, document: DocumentRef) -> Option<DocumentMeta> {
        self.documents.get(&document).map(|d| DocumentMeta {
            document,
            vehicle_id: d.vehicle_id,
            bill_amount: d.bill_amount,
            created_at: d.created_at,
        })
    }
}

impl StatementSource for DocumentStore {
    fn citizen(&self, citizen_id: CitizenId) -> Option<CitizenSummary> {
        self.citizens.get(&citizen_id).map(|c| CitizenSummary {
            id: c.id,
            name: c.name.clone(),
            mobile_number: c.mobile_number.clone(),
        })
    }

    fn vehicles_of(&self, citizen_id: CitizenId) -> Vec<VehicleSummary> {
        self.vehicles_of_citizen(citizen_id)
            .into_iter()
            .map(|v| VehicleSummary {
                id: v.id,
                registration_no: v.registration_no.clone(),
            })
            .collect()
    }

    fn documents_of(&self, vehicle_id: VehicleId) -> Vec<DocumentSnapshot> {
        self.documents_of_vehicle(vehicle_id)
            .into_iter()
            .map(|d| DocumentSnapshot {
                document: d.document_ref(),
                bill_amount: d.bill_amount,
                created_at: d.created_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::document::{FitnessDetails, InsuranceDetails, TaxDetails};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> (DocumentStore, CitizenId, VehicleId) {
        let mut store = DocumentStore::new();
        let citizen = Citizen::new(UserId::new(), "Ravi Kumar").with_mobile("9876543210");
        let citizen_id = store.add_citizen(citizen).unwrap();
        let vehicle_id = store
            .add_vehicle(Vehicle::new(citizen_id, "KA01AB1234"))
            .unwrap();
        (store, citizen_id, vehicle_id)
    }

    fn tax_details() -> DocumentDetails {
        DocumentDetails::Tax(TaxDetails {
            tax_mode: Some("Yearly".into()),
            from_date: Some(date(2026, 4, 1)),
            upto_date: date(2027, 3, 31),
        })
    }

    #[test]
    fn test_add_requires_parent_in_chain() {
        let mut store = DocumentStore::new();
        let err = store
            .add_vehicle(Vehicle::new(CitizenId::new(), "KA01AB1234"))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = store
            .add_document(Document::new(VehicleId::new(), None, tax_details()))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_blank_names_rejected() {
        let mut store = DocumentStore::new();
        let err = store.add_citizen(Citizen::new(UserId::new(), "  ")).unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));

        let citizen_id = store
            .add_citizen(Citizen::new(UserId::new(), "Ravi Kumar"))
            .unwrap();
        let err = store
            .add_vehicle(Vehicle::new(citizen_id, ""))
            .unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));
    }

    #[test]
    fn test_update_document_kind_is_fixed() {
        let (mut store, _, vehicle_id) = seeded();
        let document = store
            .add_document(Document::new(
                vehicle_id,
                Some(Money::from_rupees(5000)),
                tax_details(),
            ))
            .unwrap();

        let err = store
            .update_document(
                document,
                None,
                DocumentDetails::Insurance(InsuranceDetails {
                    company: None,
                    insurance_type: None,
                    start_date: None,
                    end_date: date(2027, 1, 1),
                }),
            )
            .unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));

        // Same kind goes through and replaces bill + details.
        store
            .update_document(
                document,
                Some(Money::from_rupees(6000)),
                DocumentDetails::Tax(TaxDetails {
                    tax_mode: Some("Quarterly".into()),
                    from_date: None,
                    upto_date: date(2026, 6, 30),
                }),
            )
            .unwrap();
        let doc = store.get_document(document).unwrap();
        assert_eq!(doc.bill_amount, Some(Money::from_rupees(6000)));
        assert_eq!(doc.expiry_date(), date(2026, 6, 30));
    }

    #[test]
    fn test_update_document_revert_restores_previous_record() {
        let (mut store, _, vehicle_id) = seeded();
        let document = store
            .add_document(Document::new(
                vehicle_id,
                Some(Money::from_rupees(5000)),
                tax_details(),
            ))
            .unwrap();
        let previous = store.get_document(document).unwrap().clone();

        store
            .update_document(
                document,
                None,
                DocumentDetails::Tax(TaxDetails {
                    tax_mode: None,
                    from_date: None,
                    upto_date: date(2026, 12, 31),
                }),
            )
            .unwrap();
        store
            .update_document(document, previous.bill_amount, previous.details.clone())
            .unwrap();

        assert_eq!(store.get_document(document).unwrap(), &previous);
    }

    #[test]
    fn test_resolver_and_statement_source_views() {
        let (mut store, citizen_id, vehicle_id) = seeded();
        let document = store
            .add_document(Document::new(
                vehicle_id,
                Some(Money::from_rupees(1200)),
                tax_details(),
            ))
            .unwrap();

        let meta = store.resolve(document).unwrap();
        assert_eq!(meta.vehicle_id, vehicle_id);
        assert_eq!(meta.bill_amount, Some(Money::from_rupees(1200)));

        let summary = StatementSource::citizen(&store, citizen_id).unwrap();
        assert_eq!(summary.name, "Ravi Kumar");
        assert_eq!(store.vehicles_of(citizen_id).len(), 1);
        assert_eq!(store.documents_of(vehicle_id).len(), 1);

        // Unknown ids come back empty, not as errors.
        assert!(store.resolve(DocumentRef::new(DocumentKind::Vltd, core_kernel::DocumentId::new())).is_none());
        assert!(StatementSource::citizen(&store, CitizenId::new()).is_none());
    }

    #[test]
    fn test_delete_document_cascades_payments() {
        let (mut store, _, vehicle_id) = seeded();
        let document = store
            .add_document(Document::new(
                vehicle_id,
                Some(Money::from_rupees(5000)),
                tax_details(),
            ))
            .unwrap();

        let mut ledger = PaymentLedger::new();
        ledger
            .record_payment(&store, document, Money::from_rupees(2000), date(2026, 4, 2), None)
            .unwrap();
        ledger
            .record_payment(&store, document, Money::from_rupees(1500), date(2026, 4, 9), None)
            .unwrap();

        let removed = store.delete_document(&mut ledger, document).unwrap();
        assert_eq!(removed, 2);
        assert!(ledger.is_empty());
        assert!(store.get_document(document).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_citizen_cascades_whole_chain() {
        let (mut store, citizen_id, vehicle_id) = seeded();
        let second_vehicle = store
            .add_vehicle(Vehicle::new(citizen_id, "KA02XY9999"))
            .unwrap();

        let doc_a = store
            .add_document(Document::new(vehicle_id, Some(Money::from_rupees(500)), tax_details()))
            .unwrap();
        let doc_b = store
            .add_document(Document::new(
                second_vehicle,
                Some(Money::from_rupees(800)),
                DocumentDetails::Fitness(FitnessDetails {
                    certificate_no: Some("FC-77".into()),
                    issue_date: None,
                    expiry_date: date(2027, 5, 1),
                }),
            ))
            .unwrap();

        let mut ledger = PaymentLedger::new();
        for doc in [doc_a, doc_b] {
            ledger
                .record_payment(&store, doc, Money::from_rupees(100), date(2026, 5, 1), None)
                .unwrap();
        }

        let removed = store.delete_citizen(&mut ledger, citizen_id).unwrap();
        assert_eq!(removed, 2);
        assert!(ledger.is_empty());
        assert!(store.get_citizen(citizen_id).unwrap_err().is_not_found());
        assert!(store.get_vehicle(vehicle_id).unwrap_err().is_not_found());
        assert_eq!(store.documents().count(), 0);
    }

    #[test]
    fn test_ownership_chain_walk() {
        let (mut store, citizen_id, vehicle_id) = seeded();
        let document = store
            .add_document(Document::new(vehicle_id, None, tax_details()))
            .unwrap();

        let owner = store.citizen_of_document(document).unwrap();
        assert_eq!(owner.id, citizen_id);
        assert_eq!(store.owner_of_document(document), Some(owner.user_id));
    }

    #[test]
    fn test_update_preserves_ownership_and_created_at() {
        let (mut store, citizen_id, _) = seeded();
        let original = store.get_citizen(citizen_id).unwrap().clone();

        let mut edited = original.clone();
        edited.name = "Ravi K".into();
        edited.user_id = UserId::new();
        store.update_citizen(edited).unwrap();

        let after = store.get_citizen(citizen_id).unwrap();
        assert_eq!(after.name, "Ravi K");
        assert_eq!(after.user_id, original.user_id);
        assert_eq!(after.created_at, original.created_at);
    }
}
