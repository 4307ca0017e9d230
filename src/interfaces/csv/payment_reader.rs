use crate::domain::loan::Payment;
use crate::error::{LoanError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct PaymentRecord {
    payment: u32,
    loan: u32,
    borrower: u32,
    installment: Option<u32>,
    amount: f64,
    paid_on: NaiveDate,
}

impl From<PaymentRecord> for Payment {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.payment,
            loan: record.loan,
            borrower: record.borrower,
            installment: record.installment,
            amount: record.amount,
            paid_on: record.paid_on,
            late_fee: None,
        }
    }
}

/// Reads borrower payments from a CSV source.
///
/// Expects the header `payment, loan, borrower, installment, amount, paid_on`.
/// An empty `installment` targets the earliest unpaid installment.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn payments(self) -> impl Iterator<Item = Result<Payment>> {
        self.reader
            .into_deserialize::<PaymentRecord>()
            .map(|result| result.map(Payment::from).map_err(LoanError::from))
    }
}
