//! The seven compliance document kinds
//!
//! Each kind keeps its own record shape from the registration office's
//! paperwork, but all of them share the billable envelope: an optional
//! bill amount and a creation timestamp. The envelope is what the ledger
//! sees; the per-kind details are what the expiry scan and the API see.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentId, DocumentKind, DocumentRef, Money, VehicleId};

/// One compliance document attached to a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub vehicle_id: VehicleId,
    /// What the citizen owes for this document; None means not yet billed
    pub bill_amount: Option<Money>,
    pub details: DocumentDetails,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(vehicle_id: VehicleId, bill_amount: Option<Money>, details: DocumentDetails) -> Self {
        Self {
            id: DocumentId::new_v7(),
            vehicle_id,
            bill_amount,
            details,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.details.kind()
    }

    /// The polymorphic reference the ledger keys payments under.
    pub fn document_ref(&self) -> DocumentRef {
        DocumentRef::new(self.kind(), self.id)
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.details.profile().expiry_date
    }
}

/// Kind-specific record fields, one variant per document table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentDetails {
    Tax(TaxDetails),
    Insurance(InsuranceDetails),
    Fitness(FitnessDetails),
    Permit(PermitDetails),
    Pucc(PuccDetails),
    SpeedGov(SpeedGovDetails),
    Vltd(VltdDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxDetails {
    /// e.g. "Quarterly", "Yearly", "One Time"
    pub tax_mode: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub upto_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceDetails {
    pub company: Option<String>,
    /// e.g. "Comprehensive", "Third Party"
    pub insurance_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessDetails {
    pub certificate_no: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermitDetails {
    pub permit_no: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuccDetails {
    pub pucc_number: Option<String>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedGovDetails {
    pub vendor_name: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VltdDetails {
    pub vendor_name: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

/// The three roles every kind maps its own columns onto.
///
/// Tax calls its expiry `upto_date`, PUCC calls it `valid_until`, and the
/// rest call it `expiry_date`; this view normalizes them for the expiry
/// report and the scan without the callers matching on kinds themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldProfile<'a> {
    /// Kind-specific identifying text (certificate no, insurer, tax mode)
    pub reference: Option<&'a str>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

impl DocumentDetails {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentDetails::Tax(_) => DocumentKind::Tax,
            DocumentDetails::Insurance(_) => DocumentKind::Insurance,
            DocumentDetails::Fitness(_) => DocumentKind::Fitness,
            DocumentDetails::Permit(_) => DocumentKind::Permit,
            DocumentDetails::Pucc(_) => DocumentKind::Pucc,
            DocumentDetails::SpeedGov(_) => DocumentKind::SpeedGov,
            DocumentDetails::Vltd(_) => DocumentKind::Vltd,
        }
    }

    /// Builds details for a kind from the normalized field roles.
    ///
    /// Inverse of [`DocumentDetails::profile`]; used when loading rows out
    /// of the per-kind tables, which store exactly these three roles.
    pub fn from_profile(
        kind: DocumentKind,
        reference: Option<String>,
        start_date: Option<NaiveDate>,
        expiry_date: NaiveDate,
    ) -> Self {
        match kind {
            DocumentKind::Tax => DocumentDetails::Tax(TaxDetails {
                tax_mode: reference,
                from_date: start_date,
                upto_date: expiry_date,
            }),
            DocumentKind::Insurance => DocumentDetails::Insurance(InsuranceDetails {
                company: reference,
                insurance_type: None,
                start_date,
                end_date: expiry_date,
            }),
            DocumentKind::Fitness => DocumentDetails::Fitness(FitnessDetails {
                certificate_no: reference,
                issue_date: start_date,
                expiry_date,
            }),
            DocumentKind::Permit => DocumentDetails::Permit(PermitDetails {
                permit_no: reference,
                issue_date: start_date,
                expiry_date,
            }),
            DocumentKind::Pucc => DocumentDetails::Pucc(PuccDetails {
                pucc_number: reference,
                valid_from: start_date,
                valid_until: expiry_date,
            }),
            DocumentKind::SpeedGov => DocumentDetails::SpeedGov(SpeedGovDetails {
                vendor_name: reference,
                issue_date: start_date,
                expiry_date,
            }),
            DocumentKind::Vltd => DocumentDetails::Vltd(VltdDetails {
                vendor_name: reference,
                issue_date: start_date,
                expiry_date,
            }),
        }
    }

    /// Maps this kind's columns onto the shared reference/start/expiry roles.
    pub fn profile(&self) -> FieldProfile<'_> {
        match self {
            DocumentDetails::Tax(d) => FieldProfile {
                reference: d.tax_mode.as_deref(),
                start_date: d.from_date,
                expiry_date: d.upto_date,
            },
            DocumentDetails::Insurance(d) => FieldProfile {
                reference: d.company.as_deref(),
                start_date: d.start_date,
                expiry_date: d.end_date,
            },
            DocumentDetails::Fitness(d) => FieldProfile {
                reference: d.certificate_no.as_deref(),
                start_date: d.issue_date,
                expiry_date: d.expiry_date,
            },
            DocumentDetails::Permit(d) => FieldProfile {
                reference: d.permit_no.as_deref(),
                start_date: d.issue_date,
                expiry_date: d.expiry_date,
            },
            DocumentDetails::Pucc(d) => FieldProfile {
                reference: d.pucc_number.as_deref(),
                start_date: d.valid_from,
                expiry_date: d.valid_until,
            },
            DocumentDetails::SpeedGov(d) => FieldProfile {
                reference: d.vendor_name.as_deref(),
                start_date: d.issue_date,
                expiry_date: d.expiry_date,
            },
            DocumentDetails::Vltd(d) => FieldProfile {
                reference: d.vendor_name.as_deref(),
                start_date: d.issue_date,
                expiry_date: d.expiry_date,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_profile_normalizes_per_kind_columns() {
        let tax = DocumentDetails::Tax(TaxDetails {
            tax_mode: Some("Quarterly".into()),
            from_date: Some(date(2026, 1, 1)),
            upto_date: date(2026, 3, 31),
        });
        let profile = tax.profile();
        assert_eq!(profile.reference, Some("Quarterly"));
        assert_eq!(profile.expiry_date, date(2026, 3, 31));

        let pucc = DocumentDetails::Pucc(PuccDetails {
            pucc_number: Some("PUCC-9".into()),
            valid_from: None,
            valid_until: date(2026, 9, 1),
        });
        assert_eq!(pucc.profile().expiry_date, date(2026, 9, 1));
        assert_eq!(pucc.kind(), core_kernel::DocumentKind::Pucc);
    }

    #[test]
    fn test_details_serde_tagging_uses_wire_names() {
        let details = DocumentDetails::SpeedGov(SpeedGovDetails {
            vendor_name: Some("Speedo Ltd".into()),
            issue_date: None,
            expiry_date: date(2027, 2, 2),
        });
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "speed_gov");

        let back: DocumentDetails = serde_json::from_value(json).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn test_profile_round_trips_through_from_profile() {
        for kind in core_kernel::DocumentKind::ALL {
            let details = DocumentDetails::from_profile(
                kind,
                Some("REF-1".into()),
                Some(date(2026, 1, 1)),
                date(2027, 1, 1),
            );
            assert_eq!(details.kind(), kind);
            let profile = details.profile();
            assert_eq!(profile.reference, Some("REF-1"));
            assert_eq!(profile.start_date, Some(date(2026, 1, 1)));
            assert_eq!(profile.expiry_date, date(2027, 1, 1));
        }
    }

    #[test]
    fn test_document_ref_carries_kind_and_id() {
        let doc = Document::new(
            core_kernel::VehicleId::new(),
            Some(Money::from_rupees(1200)),
            DocumentDetails::Fitness(FitnessDetails {
                certificate_no: None,
                issue_date: None,
                expiry_date: date(2027, 1, 1),
            }),
        );
        let r = doc.document_ref();
        assert_eq!(r.kind, core_kernel::DocumentKind::Fitness);
        assert_eq!(r.id, doc.id);
        assert_eq!(doc.expiry_date(), date(2027, 1, 1));
    }
}
