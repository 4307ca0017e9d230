use crate::domain::loan::{Loan, Payment};
use crate::domain::ports::{LoanStore, PaymentStore};
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for booked loans, keyed by big-endian loan id.
pub const CF_LOANS: &str = "loans";
/// Column Family for borrower payments, keyed by big-endian payment id.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Loans and payments live in separate Column Families and are stored as
/// JSON. Big-endian keys make iteration follow id order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// "loans" and "payments" column families if they are missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_loans = ColumnFamilyDescriptor::new(CF_LOANS, Options::default());
        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_loans, cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LoanError::InternalError(Box::new(std::io::Error::other(format!(
                "Column family '{}' not found",
                name
            ))))
        })
    }

    fn scan<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let cf = self.cf(name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

#[async_trait]
impl LoanStore for RocksDBStore {
    async fn store(&self, loan: Loan) -> Result<()> {
        let cf = self.cf(CF_LOANS)?;
        let value = serde_json::to_vec(&loan)?;
        self.db.put_cf(cf, loan.id.to_be_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, loan_id: u32) -> Result<Option<Loan>> {
        let cf = self.cf(CF_LOANS)?;
        match self.db.get_cf(cf, loan_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, loan_id: u32) -> Result<bool> {
        let cf = self.cf(CF_LOANS)?;
        Ok(self.db.get_pinned_cf(cf, loan_id.to_be_bytes())?.is_some())
    }

    async fn get_all(&self) -> Result<Vec<Loan>> {
        self.scan(CF_LOANS)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let cf = self.cf(CF_PAYMENTS)?;
        let value = serde_json::to_vec(&payment)?;
        self.db.put_cf(cf, payment.id.to_be_bytes(), value)?;
        Ok(())
    }

    async fn exists(&self, payment_id: u32) -> Result<bool> {
        let cf = self.cf(CF_PAYMENTS)?;
        Ok(self.db.get_pinned_cf(cf, payment_id.to_be_bytes())?.is_some())
    }

    async fn for_loan(&self, loan_id: u32) -> Result<Vec<Payment>> {
        let payments: Vec<Payment> = self.scan(CF_PAYMENTS)?;
        Ok(payments
            .into_iter()
            .filter(|payment| payment.loan == loan_id)
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        self.scan(CF_PAYMENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amortization::{LoanRequest, compute_schedule};
    use crate::domain::frequency::PaymentFrequency;
    use crate::domain::loan::LoanApplication;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn loan(id: u32) -> Loan {
        let start = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let request = LoanRequest::new(2400.0, 8.0, 12, PaymentFrequency::Quarterly, start);
        let quote = compute_schedule(&request).unwrap();
        let application = LoanApplication {
            loan: id,
            lender: 4,
            borrower: 5,
            request,
        };
        Loan::from_quote(application, quote, start)
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_LOANS).is_some());
        assert!(store.db.cf_handle(CF_PAYMENTS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_loan_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        LoanStore::store(&store, loan(300)).await.unwrap();
        LoanStore::store(&store, loan(2)).await.unwrap();

        let retrieved = LoanStore::get(&store, 2).await.unwrap().unwrap();
        assert_eq!(retrieved, loan(2));
        assert!(LoanStore::exists(&store, 300).await.unwrap());
        assert!(LoanStore::get(&store, 1).await.unwrap().is_none());

        let ids: Vec<u32> = LoanStore::get_all(&store)
            .await
            .unwrap()
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![2, 300]);
    }

    #[tokio::test]
    async fn test_rocksdb_payment_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let payment = Payment {
            id: 1,
            loan: 2,
            borrower: 5,
            installment: Some(0),
            amount: 615.0,
            paid_on: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            late_fee: None,
        };
        PaymentStore::store(&store, payment.clone()).await.unwrap();

        assert!(PaymentStore::exists(&store, 1).await.unwrap());
        assert_eq!(PaymentStore::for_loan(&store, 2).await.unwrap(), vec![payment]);
        assert!(PaymentStore::for_loan(&store, 3).await.unwrap().is_empty());
        assert_eq!(PaymentStore::get_all(&store).await.unwrap().len(), 1);
    }
}
