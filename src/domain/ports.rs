use super::loan::{Loan, Payment};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn store(&self, loan: Loan) -> Result<()>;
    async fn get(&self, loan_id: u32) -> Result<Option<Loan>>;
    async fn exists(&self, loan_id: u32) -> Result<bool>;
    /// Every stored loan, ordered by id.
    async fn get_all(&self) -> Result<Vec<Loan>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn exists(&self, payment_id: u32) -> Result<bool>;
    /// Payments recorded against `loan_id`, ordered by payment id.
    async fn for_loan(&self, loan_id: u32) -> Result<Vec<Payment>>;
    /// Every recorded payment, ordered by payment id.
    async fn get_all(&self) -> Result<Vec<Payment>>;
}

pub type LoanStoreBox = Box<dyn LoanStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type LoanStoreFactory = Box<dyn Fn() -> LoanStoreBox + Send + Sync>;
