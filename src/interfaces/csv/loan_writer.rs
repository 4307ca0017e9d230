use super::rounded;
use crate::domain::loan::Loan;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct LoanRow {
    loan: u32,
    lender: u32,
    borrower: u32,
    principal: Decimal,
    payment: Decimal,
    installments: u32,
    total_amount: Decimal,
    total_interest: Decimal,
    effective_rate: Decimal,
    amount_paid: Decimal,
    completion: Decimal,
    status: &'static str,
    next_payment_date: Option<NaiveDate>,
}

impl LoanRow {
    fn from_loan(loan: &Loan) -> Result<Self> {
        Ok(Self {
            loan: loan.id,
            lender: loan.lender,
            borrower: loan.borrower,
            principal: rounded(loan.principal, 2)?,
            payment: rounded(loan.payment_amount, 2)?,
            installments: loan.installments,
            total_amount: rounded(loan.total_amount, 2)?,
            total_interest: rounded(loan.total_interest, 2)?,
            effective_rate: rounded(loan.effective_annual_rate, 4)?,
            amount_paid: rounded(loan.amount_paid(), 2)?,
            completion: rounded(loan.completion_percent(), 2)?,
            status: loan.status.as_str(),
            next_payment_date: loan.next_payment_date(),
        })
    }
}

/// Writes one summary row per loan, with repayment progress.
///
/// `completion` is the share of the total amount repaid, in percent.
pub struct LoanWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LoanWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_loans<'a>(&mut self, loans: impl IntoIterator<Item = &'a Loan>) -> Result<()> {
        for loan in loans {
            self.writer.serialize(LoanRow::from_loan(loan)?)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
