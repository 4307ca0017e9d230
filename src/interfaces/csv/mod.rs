//! CSV adapters: loan applications and payments in; schedules, loan
//! summaries, payment history and portfolio figures out.

pub mod application_reader;
pub mod loan_writer;
pub mod payment_reader;
pub mod payment_writer;
pub mod portfolio_writer;
pub mod schedule_writer;

use crate::error::{LoanError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Renders a float as a decimal rounded to `dp` places, half away from zero,
/// without trailing zeros.
pub fn rounded(value: f64, dp: u32) -> Result<Decimal> {
    let decimal = Decimal::from_f64_retain(value).ok_or_else(|| {
        LoanError::ValidationError(format!("{} cannot be written as a decimal", value))
    })?;
    Ok(decimal
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
        .normalize())
}
