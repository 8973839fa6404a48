//! Document Store Domain
//!
//! Citizens, their vehicles, and the seven compliance document kinds a
//! vehicle carries (tax, insurance, fitness, permit, PUCC, speed governor,
//! VLTD). The store owns the ownership chain and implements the read
//! ports the payment ledger values documents through; deletions cascade
//! down the chain and through the ledger.

pub mod citizen;
pub mod document;
pub mod error;
pub mod expiry;
pub mod store;
pub mod vehicle;

pub use citizen::Citizen;
pub use document::{
    Document, DocumentDetails, FieldProfile, FitnessDetails, InsuranceDetails, PermitDetails,
    PuccDetails, SpeedGovDetails, TaxDetails, VltdDetails,
};
pub use error::DocumentError;
pub use expiry::{dispatch_reminders, expiring_between, reminder_message, AlertSender, ExpiryRecord};
pub use store::DocumentStore;
pub use vehicle::Vehicle;
