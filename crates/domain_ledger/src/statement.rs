//! Citizen account statements
//!
//! The aggregator flattens every document of every kind, across all of a
//! citizen's vehicles, into one kind-agnostic statement with running totals.
//! This backs the on-screen account-statement view and its print/export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CitizenId, DocumentKind, DocumentRef, Money};

use crate::engine::{BalanceSummary, PaymentLedger, SettlementStatus};
use crate::error::LedgerError;
use crate::payment::Payment;
use crate::ports::{CitizenSummary, StatementSource};

/// One row of the account statement: a document with its valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementEntry {
    pub document: DocumentRef,
    pub vehicle_reg_no: String,
    pub kind: DocumentKind,
    pub created_date: DateTime<Utc>,
    /// Bill amount with a missing bill shown as zero
    pub bill_amount: Money,
    pub total_paid: Money,
    pub balance: Money,
    pub status: SettlementStatus,
    pub payments: Vec<Payment>,
}

/// Statement footer totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatementTotals {
    pub billed: Money,
    pub paid: Money,
    pub balance: Money,
}

impl StatementTotals {
    fn zero() -> Self {
        Self {
            billed: Money::zero(),
            paid: Money::zero(),
            balance: Money::zero(),
        }
    }
}

/// The full statement for one citizen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStatement {
    pub citizen: CitizenSummary,
    pub entries: Vec<StatementEntry>,
    pub totals: StatementTotals,
}

/// Builds the unified statement for one citizen.
///
/// Every document is included, even with a null bill amount (valued as
/// zero), mirroring the include-zero-bill policy of the export and
/// notification paths. Entries are sorted by created date descending; ties
/// keep the order the source returned them in (stable sort).
///
/// # Errors
///
/// `NotFound` if the citizen id does not resolve. A citizen with zero
/// vehicles or zero documents yields an empty statement with zero totals.
pub fn build_statement(
    source: &dyn StatementSource,
    ledger: &PaymentLedger,
    citizen_id: CitizenId,
) -> Result<AccountStatement, LedgerError> {
    let citizen = source
        .citizen(citizen_id)
        .ok_or_else(|| LedgerError::not_found(format!("citizen {citizen_id}")))?;

    let mut entries = Vec::new();
    for vehicle in source.vehicles_of(citizen_id) {
        for snapshot in source.documents_of(vehicle.id) {
            let total_paid = ledger.total_paid(snapshot.document);
            let valuation = BalanceSummary::compute(snapshot.bill_amount, total_paid);

            entries.push(StatementEntry {
                document: snapshot.document,
                vehicle_reg_no: vehicle.registration_no.clone(),
                kind: snapshot.document.kind,
                created_date: snapshot.created_at,
                bill_amount: valuation.bill_amount,
                total_paid: valuation.total_paid,
                balance: valuation.balance,
                status: valuation.status,
                payments: ledger.payments_for(snapshot.document),
            });
        }
    }

    // Vec::sort_by is stable, which preserves source order on equal dates.
    entries.sort_by(|a, b| b.created_date.cmp(&a.created_date));

    let totals = entries.iter().fold(StatementTotals::zero(), |acc, entry| StatementTotals {
        billed: acc.billed + entry.bill_amount,
        paid: acc.paid + entry.total_paid,
        balance: acc.balance + entry.balance,
    });

    Ok(AccountStatement {
        citizen,
        entries,
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use core_kernel::{DocumentId, VehicleId};
    use rust_decimal_macros::dec;

    use crate::ports::{DocumentMeta, DocumentResolver, DocumentSnapshot, VehicleSummary};

    /// Small in-memory statement source for aggregator tests.
    #[derive(Default)]
    struct TestSource {
        citizens: Vec<CitizenSummary>,
        vehicles: Vec<(CitizenId, VehicleSummary)>,
        documents: Vec<(VehicleId, DocumentSnapshot)>,
    }

    impl TestSource {
        fn add_citizen(&mut self, name: &str) -> CitizenId {
            let id = CitizenId::new();
            self.citizens.push(CitizenSummary {
                id,
                name: name.to_string(),
                mobile_number: None,
            });
            id
        }

        fn add_vehicle(&mut self, citizen: CitizenId, reg_no: &str) -> VehicleId {
            let id = VehicleId::new();
            self.vehicles.push((
                citizen,
                VehicleSummary {
                    id,
                    registration_no: reg_no.to_string(),
                },
            ));
            id
        }

        fn add_document(
            &mut self,
            vehicle: VehicleId,
            kind: DocumentKind,
            bill: Option<Money>,
            created_at: DateTime<Utc>,
        ) -> DocumentRef {
            let document = DocumentRef::new(kind, DocumentId::new());
            self.documents.push((
                vehicle,
                DocumentSnapshot {
                    document,
                    bill_amount: bill,
                    created_at,
                },
            ));
            document
        }
    }

    impl StatementSource for TestSource {
        fn citizen(&self, citizen_id: CitizenId) -> Option<CitizenSummary> {
            self.citizens.iter().find(|c| c.id == citizen_id).cloned()
        }

        fn vehicles_of(&self, citizen_id: CitizenId) -> Vec<VehicleSummary> {
            self.vehicles
                .iter()
                .filter(|(c, _)| *c == citizen_id)
                .map(|(_, v)| v.clone())
                .collect()
        }

        fn documents_of(&self, vehicle_id: VehicleId) -> Vec<DocumentSnapshot> {
            self.documents
                .iter()
                .filter(|(v, _)| *v == vehicle_id)
                .map(|(_, d)| d.clone())
                .collect()
        }
    }

    impl DocumentResolver for TestSource {
        fn resolve(&self, document: DocumentRef) -> Option<DocumentMeta> {
            self.documents
                .iter()
                .find(|(_, d)| d.document == document)
                .map(|(vehicle, d)| DocumentMeta {
                    document: d.document,
                    vehicle_id: *vehicle,
                    bill_amount: d.bill_amount,
                    created_at: d.created_at,
                })
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_unknown_citizen_is_not_found() {
        let source = TestSource::default();
        let ledger = PaymentLedger::new();
        let err = build_statement(&source, &ledger, CitizenId::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_citizen_with_no_vehicles_yields_empty_statement() {
        let mut source = TestSource::default();
        let citizen = source.add_citizen("Ramesh Kumar");
        let ledger = PaymentLedger::new();

        let statement = build_statement(&source, &ledger, citizen).unwrap();
        assert!(statement.entries.is_empty());
        assert_eq!(statement.totals.billed, Money::zero());
        assert_eq!(statement.totals.paid, Money::zero());
        assert_eq!(statement.totals.balance, Money::zero());
    }

    #[test]
    fn test_entry_count_spans_vehicles_and_kinds() {
        let mut source = TestSource::default();
        let citizen = source.add_citizen("Sunita Devi");
        let v1 = source.add_vehicle(citizen, "MP04AB1234");
        let v2 = source.add_vehicle(citizen, "MP04XY9999");

        let now = Utc::now();
        source.add_document(v1, DocumentKind::Tax, Some(Money::from_rupees(5000)), now);
        source.add_document(v1, DocumentKind::Insurance, Some(Money::from_rupees(12000)), now);
        source.add_document(v2, DocumentKind::Pucc, None, now);
        source.add_document(v2, DocumentKind::Vltd, Some(Money::from_rupees(800)), now);

        let ledger = PaymentLedger::new();
        let statement = build_statement(&source, &ledger, citizen).unwrap();
        assert_eq!(statement.entries.len(), 4);
        assert_eq!(statement.totals.billed.amount(), dec!(17800));
    }

    #[test]
    fn test_totals_match_entry_sums() {
        let mut source = TestSource::default();
        let citizen = source.add_citizen("Arjun Singh");
        let vehicle = source.add_vehicle(citizen, "ABC123");
        let now = Utc::now();

        let tax = source.add_document(vehicle, DocumentKind::Tax, Some(Money::from_rupees(5000)), now);
        source.add_document(vehicle, DocumentKind::Permit, None, now);

        let mut ledger = PaymentLedger::new();
        ledger
            .record_payment(&source, tax, Money::from_rupees(2000), date(1), None)
            .unwrap();
        ledger
            .record_payment(&source, tax, Money::from_rupees(1500), date(8), None)
            .unwrap();

        let statement = build_statement(&source, &ledger, citizen).unwrap();

        let billed: Money = statement.entries.iter().map(|e| e.bill_amount).sum();
        let paid: Money = statement.entries.iter().map(|e| e.total_paid).sum();
        assert_eq!(statement.totals.billed, billed);
        assert_eq!(statement.totals.paid, paid);
        assert_eq!(statement.totals.balance, billed - paid);
        assert_eq!(statement.totals.paid.amount(), dec!(3500));
        assert_eq!(statement.totals.balance.amount(), dec!(1500));
    }

    #[test]
    fn test_entries_sorted_created_date_descending_stable() {
        let mut source = TestSource::default();
        let citizen = source.add_citizen("Kavita Sharma");
        let vehicle = source.add_vehicle(citizen, "MH12DE4455");

        let base = Utc::now();
        let older = base - Duration::days(30);
        // Two documents share the same created_at; their relative order must
        // match creation order.
        let tied_first = source.add_document(vehicle, DocumentKind::Tax, None, base);
        let tied_second = source.add_document(vehicle, DocumentKind::Fitness, None, base);
        let oldest = source.add_document(vehicle, DocumentKind::Permit, None, older);
        let newest =
            source.add_document(vehicle, DocumentKind::Insurance, None, base + Duration::days(3));

        let ledger = PaymentLedger::new();
        let statement = build_statement(&source, &ledger, citizen).unwrap();

        let order: Vec<DocumentRef> = statement.entries.iter().map(|e| e.document).collect();
        assert_eq!(order, vec![newest, tied_first, tied_second, oldest]);
    }

    #[test]
    fn test_null_bill_document_included_and_overpaid() {
        let mut source = TestSource::default();
        let citizen = source.add_citizen("Mohan Lal");
        let vehicle = source.add_vehicle(citizen, "UP16ZZ0001");
        let doc = source.add_document(vehicle, DocumentKind::SpeedGov, None, Utc::now());

        let mut ledger = PaymentLedger::new();
        ledger
            .record_payment(&source, doc, Money::from_rupees(500), date(3), None)
            .unwrap();

        let statement = build_statement(&source, &ledger, citizen).unwrap();
        assert_eq!(statement.entries.len(), 1);

        let entry = &statement.entries[0];
        assert_eq!(entry.bill_amount, Money::zero());
        assert_eq!(entry.balance.amount(), dec!(-500));
        assert_eq!(entry.status, SettlementStatus::Paid);
        assert_eq!(entry.payments.len(), 1);
    }
}
