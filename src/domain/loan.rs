use super::amortization::{InstallmentStatus, LoanQuote, LoanRequest, ScheduleEntry};
use super::frequency::PaymentFrequency;
use crate::error::{LoanError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shortfall below an installment's amount that still counts as paid in full.
pub const PAYMENT_TOLERANCE: f64 = 0.005;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Active,
    Paid,
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Paid => "paid",
            LoanStatus::Overdue => "overdue",
        }
    }
}

/// A lender's request to lend to a borrower on the given terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub loan: u32,
    pub lender: u32,
    pub borrower: u32,
    pub request: LoanRequest,
}

/// A payment made by a borrower against one installment of a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u32,
    pub loan: u32,
    pub borrower: u32,
    /// Zero-based schedule index. `None` targets the earliest unpaid installment.
    pub installment: Option<u32>,
    pub amount: f64,
    pub paid_on: NaiveDate,
    /// Carried for record keeping only; never computed.
    pub late_fee: Option<f64>,
}

/// A booked loan together with its repayment schedule.
///
/// The schedule is the one produced by the amortization engine at booking
/// time. Only the installment statuses change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: u32,
    pub lender: u32,
    pub borrower: u32,
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub frequency: PaymentFrequency,
    pub start_date: NaiveDate,
    pub created_on: NaiveDate,
    pub payment_amount: f64,
    pub installments: u32,
    pub total_amount: f64,
    pub total_interest: f64,
    pub effective_annual_rate: f64,
    pub schedule: Vec<ScheduleEntry>,
    pub status: LoanStatus,
}

impl Loan {
    pub fn from_quote(application: LoanApplication, quote: LoanQuote, created_on: NaiveDate) -> Self {
        let LoanApplication {
            loan,
            lender,
            borrower,
            request,
        } = application;

        Self {
            id: loan,
            lender,
            borrower,
            principal: request.principal,
            annual_rate_percent: request.annual_rate_percent,
            term_months: request.term_months,
            frequency: request.frequency,
            start_date: request.start_date,
            created_on,
            payment_amount: quote.payment_amount,
            installments: quote.total_periods,
            total_amount: quote.total_amount,
            total_interest: quote.total_interest,
            effective_annual_rate: quote.effective_annual_rate,
            schedule: quote.schedule,
            status: LoanStatus::Active,
        }
    }

    /// Index of the earliest installment not yet paid.
    pub fn next_unpaid(&self) -> Option<usize> {
        self.schedule
            .iter()
            .position(|entry| entry.status != InstallmentStatus::Paid)
    }

    pub fn next_payment_date(&self) -> Option<NaiveDate> {
        self.next_unpaid().map(|index| self.schedule[index].due_date)
    }

    pub fn amount_paid(&self) -> f64 {
        self.schedule
            .iter()
            .filter(|entry| entry.status == InstallmentStatus::Paid)
            .map(|entry| entry.amount)
            .sum()
    }

    /// What the borrower still owes on unpaid installments.
    pub fn outstanding(&self) -> f64 {
        (self.total_amount - self.amount_paid()).max(0.0)
    }

    /// Share of the total amount repaid so far, in percent.
    pub fn completion_percent(&self) -> f64 {
        if self.total_amount <= 0.0 {
            return 0.0;
        }
        (self.amount_paid() / self.total_amount * 100.0).min(100.0)
    }

    /// Settles one installment with `payment`.
    pub fn apply_payment(&mut self, payment: &Payment) -> Result<()> {
        if self.status == LoanStatus::Paid {
            return Err(LoanError::ValidationError(format!(
                "Loan {} is already paid off",
                self.id
            )));
        }
        if !payment.amount.is_finite() || payment.amount <= 0.0 {
            return Err(LoanError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }
        if payment.borrower != self.borrower {
            return Err(LoanError::ValidationError(format!(
                "Borrower {} does not hold loan {}",
                payment.borrower, self.id
            )));
        }

        let index = match payment.installment {
            Some(index) => index as usize,
            None => self.next_unpaid().ok_or_else(|| {
                LoanError::ValidationError(format!("Loan {} has no unpaid installment", self.id))
            })?,
        };
        let entry = self.schedule.get_mut(index).ok_or_else(|| {
            LoanError::ValidationError(format!(
                "Loan {} has no installment {}",
                self.id, index
            ))
        })?;

        if entry.status == InstallmentStatus::Paid {
            return Err(LoanError::ValidationError(format!(
                "Installment {} of loan {} is already paid",
                index, self.id
            )));
        }
        if payment.amount < entry.amount - PAYMENT_TOLERANCE {
            return Err(LoanError::ValidationError(format!(
                "Payment of {:.2} does not cover installment {} of {:.2}",
                payment.amount, index, entry.amount
            )));
        }

        entry.status = InstallmentStatus::Paid;
        if self.next_unpaid().is_none() {
            self.status = LoanStatus::Paid;
        }
        Ok(())
    }

    /// Marks pending installments due before `as_of` as overdue and derives
    /// the loan status from the installments.
    pub fn refresh_status(&mut self, as_of: NaiveDate) {
        for entry in &mut self.schedule {
            if entry.status == InstallmentStatus::Pending && entry.due_date < as_of {
                entry.status = InstallmentStatus::Overdue;
            }
        }

        self.status = if self.next_unpaid().is_none() {
            LoanStatus::Paid
        } else if self
            .schedule
            .iter()
            .any(|entry| entry.status == InstallmentStatus::Overdue)
        {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        };
    }
}
