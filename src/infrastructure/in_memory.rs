use crate::domain::loan::{Loan, Payment};
use crate::domain::ports::{LoanStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for booked loans.
///
/// Uses `Arc<RwLock<BTreeMap<u32, Loan>>>` so clones share state and
/// `get_all` comes back ordered by loan id.
#[derive(Default, Clone)]
pub struct InMemoryLoanStore {
    loans: Arc<RwLock<BTreeMap<u32, Loan>>>,
}

impl InMemoryLoanStore {
    /// Creates a new, empty in-memory loan store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn store(&self, loan: Loan) -> Result<()> {
        let mut loans = self.loans.write().await;
        loans.insert(loan.id, loan);
        Ok(())
    }

    async fn get(&self, loan_id: u32) -> Result<Option<Loan>> {
        let loans = self.loans.read().await;
        Ok(loans.get(&loan_id).cloned())
    }

    async fn exists(&self, loan_id: u32) -> Result<bool> {
        let loans = self.loans.read().await;
        Ok(loans.contains_key(&loan_id))
    }

    async fn get_all(&self) -> Result<Vec<Loan>> {
        let loans = self.loans.read().await;
        Ok(loans.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for borrower payments.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<BTreeMap<u32, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn exists(&self, payment_id: u32) -> Result<bool> {
        let payments = self.payments.read().await;
        Ok(payments.contains_key(&payment_id))
    }

    async fn for_loan(&self, loan_id: u32) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|payment| payment.loan == loan_id)
            .cloned()
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }
}
