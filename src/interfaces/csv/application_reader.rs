use crate::domain::amortization::LoanRequest;
use crate::domain::frequency::PaymentFrequency;
use crate::domain::loan::LoanApplication;
use crate::error::{LoanError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ApplicationRecord {
    loan: u32,
    lender: u32,
    borrower: u32,
    principal: f64,
    rate: f64,
    term_months: u32,
    frequency: String,
    start_date: NaiveDate,
}

impl TryFrom<ApplicationRecord> for LoanApplication {
    type Error = LoanError;

    fn try_from(record: ApplicationRecord) -> Result<Self> {
        let frequency: PaymentFrequency = record.frequency.parse()?;
        Ok(Self {
            loan: record.loan,
            lender: record.lender,
            borrower: record.borrower,
            request: LoanRequest::new(
                record.principal,
                record.rate,
                record.term_months,
                frequency,
                record.start_date,
            ),
        })
    }
}

/// Reads loan applications from a CSV source.
///
/// Expects the header `loan, lender, borrower, principal, rate, term_months,
/// frequency, start_date`. Whitespace around fields is trimmed. Loan terms are
/// only parsed here; range checks are left to the amortization engine.
pub struct LoanApplicationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LoanApplicationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads applications, one result per row.
    pub fn applications(self) -> impl Iterator<Item = Result<LoanApplication>> {
        self.reader
            .into_deserialize::<ApplicationRecord>()
            .map(|result| result.map_err(LoanError::from).and_then(LoanApplication::try_from))
    }
}
