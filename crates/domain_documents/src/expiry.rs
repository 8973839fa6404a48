//! Expiry scanning across all seven document kinds
//!
//! Two consumers share the same union scan: the expiry report (a date
//! window) and the renewal reminder job (a single target date, normally
//! some days ahead of today). Both walk every document's normalized
//! expiry date regardless of what the kind's own column is called.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use core_kernel::{DocumentKind, DocumentRef};

use crate::error::DocumentError;
use crate::store::DocumentStore;

/// One row of the expiry union: a document nearing (or past) its expiry,
/// joined up its ownership chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryRecord {
    pub document: DocumentRef,
    pub kind: DocumentKind,
    pub registration_no: String,
    pub citizen_name: String,
    pub mobile_number: Option<String>,
    pub expiry_date: NaiveDate,
}

/// All documents whose expiry date falls in `[from, to]`, across every
/// kind, sorted by expiry date ascending then creation order.
pub fn expiring_between(store: &DocumentStore, from: NaiveDate, to: NaiveDate) -> Vec<ExpiryRecord> {
    let mut records: Vec<ExpiryRecord> = store
        .documents()
        .filter(|d| {
            let expiry = d.expiry_date();
            from <= expiry && expiry <= to
        })
        .filter_map(|d| {
            let document = d.document_ref();
            let citizen = store.citizen_of_document(document)?;
            let vehicle = store.get_vehicle(d.vehicle_id).ok()?;
            Some(ExpiryRecord {
                document,
                kind: document.kind,
                registration_no: vehicle.registration_no.clone(),
                citizen_name: citizen.name.clone(),
                mobile_number: citizen.mobile_number.clone(),
                expiry_date: d.expiry_date(),
            })
        })
        .collect();
    records.sort_by_key(|r| r.expiry_date);
    records
}

/// Delivery port for renewal reminders. The production implementation
/// posts to a messaging gateway; tests capture the messages.
pub trait AlertSender {
    fn send(&self, mobile_number: &str, message: &str) -> Result<(), DocumentError>;
}

/// Renders the reminder text for one expiring document.
pub fn reminder_message(record: &ExpiryRecord) -> String {
    format!(
        "Dear {}, the {} for vehicle {} expires on {}. Please renew it in time.",
        record.citizen_name,
        record.kind.label(),
        record.registration_no,
        record.expiry_date.format("%d-%m-%Y"),
    )
}

/// Sends a reminder for every document expiring exactly on `target`.
///
/// Records without a mobile number are skipped; a failed send is logged
/// and does not stop the run. Returns how many reminders went out.
pub fn dispatch_reminders(
    store: &DocumentStore,
    target: NaiveDate,
    sender: &dyn AlertSender,
) -> usize {
    let due = expiring_between(store, target, target);
    let mut sent = 0;
    for record in &due {
        let Some(mobile) = record.mobile_number.as_deref() else {
            warn!(document = %record.document, "skipping reminder, citizen has no mobile number");
            continue;
        };
        match sender.send(mobile, &reminder_message(record)) {
            Ok(()) => sent += 1,
            Err(err) => {
                warn!(document = %record.document, error = %err, "reminder delivery failed");
            }
        }
    }
    info!(%target, due = due.len(), sent, "expiry reminder run complete");
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use core_kernel::UserId;

    use crate::citizen::Citizen;
    use crate::document::{Document, DocumentDetails, InsuranceDetails, PuccDetails, TaxDetails};
    use crate::vehicle::Vehicle;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct CapturingSender {
        sent: RefCell<Vec<(String, String)>>,
        fail_for: Option<String>,
    }

    impl CapturingSender {
        fn new() -> Self {
            Self { sent: RefCell::new(Vec::new()), fail_for: None }
        }
    }

    impl AlertSender for CapturingSender {
        fn send(&self, mobile_number: &str, message: &str) -> Result<(), DocumentError> {
            if self.fail_for.as_deref() == Some(mobile_number) {
                return Err(DocumentError::validation("gateway rejected"));
            }
            self.sent
                .borrow_mut()
                .push((mobile_number.to_string(), message.to_string()));
            Ok(())
        }
    }

    fn seeded() -> DocumentStore {
        let mut store = DocumentStore::new();
        let with_mobile = store
            .add_citizen(Citizen::new(UserId::new(), "Ravi Kumar").with_mobile("9876543210"))
            .unwrap();
        let without_mobile = store
            .add_citizen(Citizen::new(UserId::new(), "Sunil Shetty"))
            .unwrap();
        let v1 = store.add_vehicle(Vehicle::new(with_mobile, "KA01AB1234")).unwrap();
        let v2 = store.add_vehicle(Vehicle::new(without_mobile, "KA05ZZ0001")).unwrap();

        // Tax expires on the 10th, insurance on the 20th, PUCC on the 10th
        // but belongs to the citizen without a mobile number.
        store
            .add_document(Document::new(
                v1,
                None,
                DocumentDetails::Tax(TaxDetails {
                    tax_mode: None,
                    from_date: None,
                    upto_date: date(2026, 9, 10),
                }),
            ))
            .unwrap();
        store
            .add_document(Document::new(
                v1,
                None,
                DocumentDetails::Insurance(InsuranceDetails {
                    company: Some("United India".into()),
                    insurance_type: None,
                    start_date: None,
                    end_date: date(2026, 9, 20),
                }),
            ))
            .unwrap();
        store
            .add_document(Document::new(
                v2,
                None,
                DocumentDetails::Pucc(PuccDetails {
                    pucc_number: None,
                    valid_from: None,
                    valid_until: date(2026, 9, 10),
                }),
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_expiring_between_unions_all_kinds() {
        let store = seeded();
        let records = expiring_between(&store, date(2026, 9, 1), date(2026, 9, 30));
        assert_eq!(records.len(), 3);
        // Sorted by expiry date ascending.
        assert_eq!(records[0].expiry_date, date(2026, 9, 10));
        assert_eq!(records[2].expiry_date, date(2026, 9, 20));

        let narrow = expiring_between(&store, date(2026, 9, 15), date(2026, 9, 30));
        assert_eq!(narrow.len(), 1);
        assert_eq!(narrow[0].kind, DocumentKind::Insurance);
    }

    #[test]
    fn test_dispatch_skips_missing_mobile() {
        let store = seeded();
        let sender = CapturingSender::new();

        // Two documents expire on the 10th but only one citizen has a mobile.
        let sent = dispatch_reminders(&store, date(2026, 9, 10), &sender);
        assert_eq!(sent, 1);

        let messages = sender.sent.borrow();
        assert_eq!(messages[0].0, "9876543210");
        assert!(messages[0].1.contains("KA01AB1234"));
        assert!(messages[0].1.contains("Tax"));
        assert!(messages[0].1.contains("10-09-2026"));
    }

    #[test]
    fn test_dispatch_survives_gateway_failure() {
        let store = seeded();
        let sender = CapturingSender {
            sent: RefCell::new(Vec::new()),
            fail_for: Some("9876543210".into()),
        };
        let sent = dispatch_reminders(&store, date(2026, 9, 10), &sender);
        assert_eq!(sent, 0);
    }
}
