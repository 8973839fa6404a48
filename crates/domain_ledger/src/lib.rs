//! Payment Ledger Domain
//!
//! This crate is the single source of truth for payments against regulatory
//! documents. Any of the seven document kinds can carry an unbounded number
//! of partial payments; the ledger records, edits, and deletes them, and
//! values every document freshly from its live payment set.
//!
//! # Core rules
//!
//! - `balance = bill_amount (null as 0) - sum(payments)`
//! - `status = Paid` when `balance <= 0`, else `Pending`; overpayment is
//!   tolerated and reported as `Paid`
//! - balances are derived, never stored, so edits and deletes cannot drift
//! - the engine trusts the caller to have authorized the citizen; it is
//!   owner-agnostic by design
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{PaymentLedger, build_statement};
//!
//! let mut ledger = PaymentLedger::new();
//! let payment = ledger.record_payment(&store, doc_ref, amount, date, None)?;
//! let statement = build_statement(&store, &ledger, citizen_id)?;
//! ```

pub mod engine;
pub mod error;
pub mod payment;
pub mod ports;
pub mod statement;

pub use engine::{BalanceSummary, PaymentLedger, SettlementStatus};
pub use error::LedgerError;
pub use payment::{Payment, REMARKS_MAX_LEN};
pub use ports::{
    CitizenSummary, DocumentMeta, DocumentResolver, DocumentSnapshot, StatementSource,
    VehicleSummary,
};
pub use statement::{build_statement, AccountStatement, StatementEntry, StatementTotals};
