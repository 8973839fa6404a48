//! Database Infrastructure Layer
//!
//! SQLx-backed persistence for the compliance tracker: the seven per-kind
//! document tables, the polymorphic payments table keyed by
//! `(payable_kind, payable_id)`, and the citizen/vehicle ownership chain.
//! Cascading deletes run in transactions so payments never outlive their
//! document.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::{
    CitizenRepository, CitizenRow, DocumentRepository, DocumentRow, ExpiryRow, NewDocumentRecord,
    PaymentRepository, PaymentRow, TableProfile, VehicleRow,
};
