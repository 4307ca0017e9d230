#![allow(dead_code)]

use chrono::NaiveDate;
use loanbook::domain::amortization::LoanRequest;
use loanbook::domain::frequency::PaymentFrequency;
use rand::Rng;
use std::io::{Error, Write};
use tempfile::NamedTempFile;

pub const APPLICATIONS_HEADER: &str =
    "loan, lender, borrower, principal, rate, term_months, frequency, start_date";
pub const PAYMENTS_HEADER: &str = "payment, loan, borrower, installment, amount, paid_on";

/// Writes `header` followed by `rows` into a temporary CSV file.
pub fn csv_file(header: &str, rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", header)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}

/// Draws loan terms in the range a lending desk would realistically see.
pub fn random_request<R: Rng>(rng: &mut R) -> LoanRequest {
    let frequency = PaymentFrequency::ALL[rng.gen_range(0..PaymentFrequency::ALL.len())];
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
        + chrono::Days::new(rng.gen_range(0..11_000));
    let rate = if rng.gen_bool(0.1) {
        0.0
    } else {
        rng.gen_range(0.01..35.0)
    };

    LoanRequest::new(
        rng.gen_range(50.0..2_000_000.0),
        rate,
        rng.gen_range(1..=360),
        frequency,
        start,
    )
}
