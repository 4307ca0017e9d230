use super::loan::{Loan, LoanStatus};
use serde::{Deserialize, Serialize};

/// Aggregate figures over a set of booked loans.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub loans: usize,
    pub active: usize,
    pub paid: usize,
    pub overdue: usize,
    /// Sum of principals.
    pub total_lent: f64,
    /// Plain mean of the nominal annual rates, `0.0` for an empty portfolio.
    pub average_rate: f64,
    pub total_paid: f64,
    pub outstanding: f64,
}

impl PortfolioSummary {
    pub fn from_loans<'a>(loans: impl IntoIterator<Item = &'a Loan>) -> Self {
        let mut summary = Self::default();
        let mut rate_sum = 0.0;
        for loan in loans {
            summary.loans += 1;
            match loan.status {
                LoanStatus::Active => summary.active += 1,
                LoanStatus::Paid => summary.paid += 1,
                LoanStatus::Overdue => summary.overdue += 1,
            }
            summary.total_lent += loan.principal;
            summary.total_paid += loan.amount_paid();
            summary.outstanding += loan.outstanding();
            rate_sum += loan.annual_rate_percent;
        }
        if summary.loans > 0 {
            summary.average_rate = rate_sum / summary.loans as f64;
        }
        summary
    }
}
