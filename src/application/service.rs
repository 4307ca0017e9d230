use crate::domain::amortization::compute_schedule;
use crate::domain::loan::{Loan, LoanApplication, Payment};
use crate::domain::portfolio::PortfolioSummary;
use crate::domain::ports::{LoanStoreBox, PaymentStoreBox};
use crate::error::{LoanError, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Books loans and tracks their repayment.
///
/// `LoanService` owns the storage backends and awaits every storage operation
/// before moving on, so operations submitted in order are applied in order.
/// Amortization itself is delegated to the pure engine in
/// [`crate::domain::amortization`].
pub struct LoanService {
    loan_store: LoanStoreBox,
    payment_store: PaymentStoreBox,
}

impl LoanService {
    /// Creates a new `LoanService` instance.
    ///
    /// # Arguments
    ///
    /// * `loan_store` - The store for booked loans.
    /// * `payment_store` - The store for borrower payments.
    pub fn new(loan_store: LoanStoreBox, payment_store: PaymentStoreBox) -> Self {
        Self {
            loan_store,
            payment_store,
        }
    }

    /// Books a loan from an application.
    ///
    /// A loan id that is already booked is ignored and `None` is returned.
    pub async fn book_loan(
        &self,
        application: LoanApplication,
        created_on: NaiveDate,
    ) -> Result<Option<Loan>> {
        if self.loan_store.exists(application.loan).await? {
            warn!(loan = application.loan, "ignoring duplicate loan id");
            return Ok(None);
        }

        let quote = compute_schedule(&application.request)?;
        let loan = Loan::from_quote(application, quote, created_on);
        info!(
            loan = loan.id,
            lender = loan.lender,
            borrower = loan.borrower,
            installments = loan.installments,
            payment = loan.payment_amount,
            "loan booked"
        );

        self.loan_store.store(loan.clone()).await?;
        Ok(Some(loan))
    }

    /// Applies a borrower payment to its loan.
    ///
    /// A payment id that was already recorded is ignored and `None` is returned.
    pub async fn record_payment(&self, payment: Payment) -> Result<Option<Loan>> {
        if self.payment_store.exists(payment.id).await? {
            warn!(payment = payment.id, "ignoring duplicate payment id");
            return Ok(None);
        }

        let mut loan = self
            .loan_store
            .get(payment.loan)
            .await?
            .ok_or_else(|| LoanError::NotFound(format!("loan {}", payment.loan)))?;

        loan.apply_payment(&payment)?;
        debug!(
            loan = loan.id,
            payment = payment.id,
            status = loan.status.as_str(),
            "payment applied"
        );

        self.payment_store.store(payment).await?;
        self.loan_store.store(loan.clone()).await?;
        Ok(Some(loan))
    }

    /// Re-derives installment and loan statuses for every loan as of `as_of`.
    pub async fn refresh_statuses(&self, as_of: NaiveDate) -> Result<Vec<Loan>> {
        let mut loans = self.loan_store.get_all().await?;
        for loan in &mut loans {
            let before = loan.status;
            loan.refresh_status(as_of);
            if loan.status != before {
                info!(
                    loan = loan.id,
                    from = before.as_str(),
                    to = loan.status.as_str(),
                    "loan status changed"
                );
            }
            self.loan_store.store(loan.clone()).await?;
        }
        Ok(loans)
    }

    pub async fn payments_for(&self, loan_id: u32) -> Result<Vec<Payment>> {
        self.payment_store.for_loan(loan_id).await
    }

    /// Recorded payments ordered by payment id, optionally for one loan only.
    pub async fn payment_history(&self, loan_id: Option<u32>) -> Result<Vec<Payment>> {
        match loan_id {
            Some(loan_id) => self.payments_for(loan_id).await,
            None => self.payment_store.get_all().await,
        }
    }

    /// Counts and totals over the book, optionally for one lender only.
    pub async fn portfolio_summary(&self, lender: Option<u32>) -> Result<PortfolioSummary> {
        let loans = self.loan_store.get_all().await?;
        let summary = PortfolioSummary::from_loans(
            loans
                .iter()
                .filter(|loan| lender.is_none_or(|lender| loan.lender == lender)),
        );
        debug!(loans = summary.loans, "portfolio summarized");
        Ok(summary)
    }

    /// Consumes the service and returns every booked loan ordered by id.
    pub async fn into_results(self) -> Result<Vec<Loan>> {
        self.loan_store.get_all().await
    }
}
