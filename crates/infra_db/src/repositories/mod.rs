//! Repository implementations over the compliance schema

pub mod citizens;
pub mod documents;
pub mod payments;

pub use citizens::{CitizenRepository, CitizenRow, VehicleRow};
pub use documents::{
    table_profile, DocumentRepository, DocumentRow, ExpiryRow, NewDocumentRecord, TableProfile,
};
pub use payments::{PaymentRepository, PaymentRow};
