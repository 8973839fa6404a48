//! The closed set of document kinds and the polymorphic document reference
//!
//! A payment can attach to any of seven regulatory document types. Rather
//! than inheritance or reflection, the association is a tagged pair: a
//! `DocumentKind` discriminant plus the id within that kind. Resolution of
//! the concrete record is always a dispatch-by-kind lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::identifiers::DocumentId;

/// The seven regulatory document kinds tracked for a vehicle.
///
/// This enumeration is closed: payment rows, export tables, and the expiry
/// report all iterate it exhaustively via [`DocumentKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Tax,
    Insurance,
    Fitness,
    Permit,
    Pucc,
    SpeedGov,
    Vltd,
}

impl DocumentKind {
    /// Every kind, in the canonical reporting order.
    pub const ALL: [DocumentKind; 7] = [
        DocumentKind::Tax,
        DocumentKind::Insurance,
        DocumentKind::Fitness,
        DocumentKind::Permit,
        DocumentKind::Pucc,
        DocumentKind::SpeedGov,
        DocumentKind::Vltd,
    ];

    /// The wire name accepted by the payment endpoint (`payable_kind`).
    pub fn wire_name(&self) -> &'static str {
        match self {
            DocumentKind::Tax => "tax",
            DocumentKind::Insurance => "insurance",
            DocumentKind::Fitness => "fitness",
            DocumentKind::Permit => "permit",
            DocumentKind::Pucc => "pucc",
            DocumentKind::SpeedGov => "speed_gov",
            DocumentKind::Vltd => "vltd",
        }
    }

    /// Human-readable label used on statements and reports.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Tax => "Tax",
            DocumentKind::Insurance => "Insurance",
            DocumentKind::Fitness => "Fitness",
            DocumentKind::Permit => "Permit",
            DocumentKind::Pucc => "PUCC",
            DocumentKind::SpeedGov => "Speed Gov",
            DocumentKind::Vltd => "VLTd",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Error returned when a wire name does not match any document kind.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown document kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for DocumentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentKind::ALL
            .iter()
            .find(|k| k.wire_name() == s)
            .copied()
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Polymorphic reference to one document of one kind.
///
/// Stored alongside each payment; the `(kind, id)` pair is the payment's
/// parent identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub id: DocumentId,
}

impl DocumentRef {
    pub fn new(kind: DocumentKind, id: DocumentId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
