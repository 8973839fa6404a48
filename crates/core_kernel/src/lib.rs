//! Core Kernel - Foundational types for the compliance ledger
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money with precise decimal arithmetic (single bookkeeping currency)
//! - Strongly-typed identifiers for the ownership chain
//! - The closed document-kind enumeration and polymorphic document reference

pub mod identifiers;
pub mod kind;
pub mod money;

pub use identifiers::{CitizenId, DocumentId, PaymentId, UserId, VehicleId};
pub use kind::{DocumentKind, DocumentRef, UnknownKind};
pub use money::{Money, MoneyError};
