//! Ports through which the ledger reads document and ownership data
//!
//! The engine and the aggregator are storage- and owner-agnostic: they see
//! documents only as snapshots handed to them through these traits, and they
//! trust the caller to have authorized the citizen id. The in-memory
//! document store and the database layer both implement these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CitizenId, DocumentRef, Money, VehicleId};

/// What the ledger needs to know about a document to value it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub document: DocumentRef,
    pub vehicle_id: VehicleId,
    /// The billable price; None means "not yet billed" and is valued as zero
    pub bill_amount: Option<Money>,
    pub created_at: DateTime<Utc>,
}

/// Resolves a polymorphic document reference to its metadata.
///
/// Returning `None` means the document does not exist in that kind's
/// collection; the engine turns that into a `NotFound` error.
pub trait DocumentResolver {
    fn resolve(&self, document: DocumentRef) -> Option<DocumentMeta>;
}

/// A citizen as it appears on a statement header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenSummary {
    pub id: CitizenId,
    pub name: String,
    pub mobile_number: Option<String>,
}

/// A vehicle as it appears on statement rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: VehicleId,
    pub registration_no: String,
}

/// Point-in-time view of one billable document for statement building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub document: DocumentRef,
    pub bill_amount: Option<Money>,
    pub created_at: DateTime<Utc>,
}

/// Fan-out read across the ownership chain for one citizen.
///
/// Implementations should return documents in creation order per vehicle;
/// the aggregator relies on that order to break created-date ties stably.
pub trait StatementSource {
    /// Resolves the citizen, or `None` if the id is unknown
    fn citizen(&self, citizen_id: CitizenId) -> Option<CitizenSummary>;

    /// All vehicles owned by the citizen (empty is fine, not an error)
    fn vehicles_of(&self, citizen_id: CitizenId) -> Vec<VehicleSummary>;

    /// All documents of all seven kinds attached to the vehicle
    fn documents_of(&self, vehicle_id: VehicleId) -> Vec<DocumentSnapshot>;
}
