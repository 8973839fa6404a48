//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the compliance tracker. Fixtures are
//! deterministic so assertion failures read the same on every run.

use chrono::NaiveDate;
use core_kernel::Money;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical yearly tax bill
    pub fn tax_bill() -> Money {
        Money::new(dec!(5000.00))
    }

    /// A typical insurance bill
    pub fn insurance_bill() -> Money {
        Money::new(dec!(12500.00))
    }

    /// A partial payment that does not settle the tax bill
    pub fn partial_payment() -> Money {
        Money::new(dec!(2000.00))
    }

    pub fn zero() -> Money {
        Money::zero()
    }
}

/// Fixture for date test data
pub struct DateFixtures;

impl DateFixtures {
    /// Start of the financial year used across tests (2026-04-01)
    pub fn fy_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    }

    /// End of the same financial year (2027-03-31)
    pub fn fy_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 3, 31).unwrap()
    }

    /// A payment date inside the financial year
    pub fn payment_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    pub fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }
}

/// Fixture for identifying strings
pub struct StringFixtures;

impl StringFixtures {
    pub fn registration_no() -> &'static str {
        "KA01AB1234"
    }

    pub fn mobile_number() -> &'static str {
        "9876543210"
    }

    pub fn citizen_name() -> &'static str {
        "Ravi Kumar"
    }
}
