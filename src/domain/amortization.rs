//! Fixed-payment loan amortization.
//!
//! [`compute_schedule`] turns a [`LoanRequest`] into a [`LoanQuote`]: the
//! constant periodic payment, every installment's principal/interest split and
//! running balance, the totals, and the effective annual rate.
//!
//! The computation is pure. It never reads the clock, never logs and never
//! rounds intermediate values; rounding to currency precision belongs to
//! whoever renders the quote.

use super::frequency::PaymentFrequency;
use crate::error::InvalidInputError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Terms of a loan to be amortized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Amount borrowed, in whatever currency unit the caller uses.
    pub principal: f64,
    /// Nominal annual interest rate, as a percentage (5.0 means 5%).
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub frequency: PaymentFrequency,
    /// Due date of the first installment.
    pub start_date: NaiveDate,
}

impl LoanRequest {
    pub fn new(
        principal: f64,
        annual_rate_percent: f64,
        term_months: u32,
        frequency: PaymentFrequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
            frequency,
            start_date,
        }
    }

    /// Checks the terms are inside the engine's domain.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(InvalidInputError::NonPositivePrincipal(self.principal));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0.0 {
            return Err(InvalidInputError::NegativeRate(self.annual_rate_percent));
        }
        if self.term_months == 0 {
            return Err(InvalidInputError::NonPositiveTerm(self.term_months));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "pending",
            InstallmentStatus::Paid => "paid",
            InstallmentStatus::Overdue => "overdue",
        }
    }
}

/// One installment of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub due_date: NaiveDate,
    /// Total due for this installment (`principal_portion + interest_portion`).
    pub amount: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    /// Outstanding principal once this installment is paid. Never negative.
    pub remaining_balance: f64,
    pub status: InstallmentStatus,
}

/// Result of amortizing a [`LoanRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub payment_amount: f64,
    pub total_periods: u32,
    pub total_amount: f64,
    pub total_interest: f64,
    /// Effective annual rate as a percentage.
    pub effective_annual_rate: f64,
    pub schedule: Vec<ScheduleEntry>,
}

/// Number of installments for a term: `ceil(term_months * periods_per_year / 12)`.
pub fn total_periods(term_months: u32, frequency: PaymentFrequency) -> u64 {
    (u64::from(term_months) * u64::from(frequency.periods_per_year())).div_ceil(12)
}

/// Fixed installment that repays `principal` over `periods` at `periodic_rate`.
///
/// Uses the annuity formula `P * r / (1 - (1 + r)^-n)`, evaluated through
/// `ln_1p`/`exp_m1` so neither tiny nor huge rates lose the result to
/// cancellation or overflow. When `r * n` is below machine epsilon the
/// interest is negligible and the principal is split evenly.
pub fn periodic_payment(principal: f64, periodic_rate: f64, periods: u32) -> f64 {
    let n = f64::from(periods);
    if periodic_rate * n < f64::EPSILON {
        return principal / n;
    }
    // 1 - (1 + r)^-n
    let discount = -(-n * periodic_rate.ln_1p()).exp_m1();
    principal * periodic_rate / discount
}

/// `((1 + r)^periods_per_year - 1) * 100`, without the cancellation of a
/// direct power for small rates.
pub fn effective_annual_rate(periodic_rate: f64, periods_per_year: u32) -> f64 {
    (f64::from(periods_per_year) * periodic_rate.ln_1p()).exp_m1() * 100.0
}

/// Amortizes a loan into a full payment schedule.
///
/// All inputs are validated before anything is computed, so on error no
/// schedule exists. The last installment settles whatever principal is left
/// after floating point drift, which makes its remaining balance exactly zero
/// and may shift its amount by a fraction of a cent relative to
/// `payment_amount`. `total_amount` is the sum of the installment amounts.
///
/// # Errors
///
/// [`InvalidInputError`] when the principal is not positive, the rate is
/// negative or so large the amounts overflow, the term is zero or has more
/// installments than a `u32` counts, or the last due date does not fit in
/// the calendar.
pub fn compute_schedule(request: &LoanRequest) -> Result<LoanQuote, InvalidInputError> {
    request.validate()?;

    let frequency = request.frequency;
    let start = request.start_date;
    let periods_per_year = frequency.periods_per_year();
    let periodic_rate = request.annual_rate_percent / 100.0 / f64::from(periods_per_year);

    let periods = u32::try_from(total_periods(request.term_months, frequency))
        .map_err(|_| InvalidInputError::TermTooLong(request.term_months))?;
    // Due dates grow monotonically, so the last one bounds them all.
    frequency
        .due_date(start, periods - 1)
        .ok_or(InvalidInputError::StartDateOutOfRange(start))?;

    let payment = periodic_payment(request.principal, periodic_rate, periods);
    let effective_rate = effective_annual_rate(periodic_rate, periods_per_year);
    // The first installment carries the largest interest, so it bounds the rest.
    let first_total = request.principal + request.principal * periodic_rate;
    if !(payment.is_finite()
        && (payment * f64::from(periods)).is_finite()
        && first_total.is_finite()
        && effective_rate.is_finite())
    {
        return Err(InvalidInputError::RateOutOfRange(request.annual_rate_percent));
    }

    let mut schedule = Vec::with_capacity(periods as usize);
    let mut balance = request.principal;
    for index in 0..periods {
        let due_date = frequency
            .due_date(start, index)
            .ok_or(InvalidInputError::StartDateOutOfRange(start))?;
        let interest = balance * periodic_rate;

        let (amount, principal_portion) = if index + 1 == periods {
            (balance + interest, balance)
        } else {
            let owed = payment - interest;
            if (0.0..=balance).contains(&owed) {
                (payment, owed)
            } else {
                // Rounding at extreme rates; keep the balance within [0, principal].
                let owed = owed.clamp(0.0, balance);
                (owed + interest, owed)
            }
        };
        balance = (balance - principal_portion).max(0.0);

        schedule.push(ScheduleEntry {
            due_date,
            amount,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance,
            status: InstallmentStatus::Pending,
        });
    }

    let total_amount: f64 = schedule.iter().map(|entry| entry.amount).sum();

    Ok(LoanQuote {
        payment_amount: payment,
        total_periods: periods,
        total_amount,
        total_interest: total_amount - request.principal,
        effective_annual_rate: effective_rate,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(principal: f64, rate: f64, term: u32, frequency: PaymentFrequency) -> LoanRequest {
        LoanRequest::new(principal, rate, term, frequency, date(2024, 1, 1))
    }

    #[test]
    fn test_standard_monthly_loan() {
        let quote = compute_schedule(&request(10_000.0, 5.0, 12, PaymentFrequency::Monthly)).unwrap();

        assert_eq!(quote.total_periods, 12);
        assert_eq!(quote.schedule.len(), 12);
        assert_relative_eq!(quote.payment_amount, 856.07, epsilon = 0.01);

        let first = &quote.schedule[0];
        assert_eq!(first.due_date, date(2024, 1, 1));
        assert_relative_eq!(first.interest_portion, 41.67, epsilon = 0.005);
        assert_relative_eq!(first.principal_portion, 814.40, epsilon = 0.01);

        let last = quote.schedule.last().unwrap();
        assert_eq!(last.due_date, date(2024, 12, 1));
        assert_eq!(last.remaining_balance, 0.0);
    }

    #[test]
    fn test_zero_rate_splits_principal_evenly() {
        let quote = compute_schedule(&request(1200.0, 0.0, 12, PaymentFrequency::Monthly)).unwrap();

        assert_eq!(quote.total_periods, 12);
        assert_relative_eq!(quote.payment_amount, 100.0);
        assert_relative_eq!(quote.total_interest, 0.0, epsilon = 1e-9);
        assert_relative_eq!(quote.effective_annual_rate, 0.0);
        for entry in &quote.schedule {
            assert_eq!(entry.interest_portion, 0.0);
            assert_relative_eq!(entry.amount, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_effective_annual_rate() {
        let quote = compute_schedule(&request(5000.0, 12.0, 24, PaymentFrequency::Monthly)).unwrap();
        assert_relative_eq!(quote.effective_annual_rate, 12.6825, epsilon = 1e-4);
    }

    #[test]
    fn test_total_periods_rounds_up() {
        assert_eq!(total_periods(12, PaymentFrequency::Weekly), 52);
        assert_eq!(total_periods(1, PaymentFrequency::Weekly), 5);
        assert_eq!(total_periods(7, PaymentFrequency::Biweekly), 16);
        assert_eq!(total_periods(1, PaymentFrequency::Quarterly), 1);
        assert_eq!(total_periods(13, PaymentFrequency::Quarterly), 5);
    }

    #[test]
    fn test_schedule_invariants_hold_for_every_frequency() {
        for frequency in PaymentFrequency::ALL {
            let req = request(25_000.0, 7.25, 37, frequency);
            let quote = compute_schedule(&req).unwrap();

            assert_eq!(
                u64::from(quote.total_periods),
                total_periods(req.term_months, frequency)
            );
            assert_eq!(quote.schedule.len(), quote.total_periods as usize);

            let mut previous_balance = req.principal;
            for entry in &quote.schedule {
                assert_relative_eq!(
                    entry.principal_portion + entry.interest_portion,
                    entry.amount,
                    epsilon = 1e-9
                );
                assert!(entry.remaining_balance >= 0.0);
                assert!(entry.remaining_balance <= previous_balance);
                assert_eq!(entry.status, InstallmentStatus::Pending);
                previous_balance = entry.remaining_balance;
            }

            let repaid: f64 = quote.schedule.iter().map(|e| e.principal_portion).sum();
            assert_relative_eq!(repaid, req.principal, max_relative = 1e-9);
            assert_relative_eq!(
                quote.total_amount,
                quote.payment_amount * f64::from(quote.total_periods),
                max_relative = 1e-9
            );
            assert_relative_eq!(quote.total_interest, quote.total_amount - req.principal);
        }
    }

    #[test]
    fn test_due_dates_strictly_increase() {
        for frequency in PaymentFrequency::ALL {
            let quote = compute_schedule(&request(1000.0, 3.0, 24, frequency)).unwrap();
            for pair in quote.schedule.windows(2) {
                assert!(pair[0].due_date < pair[1].due_date);
            }
        }
    }

    #[test]
    fn test_weekly_spacing_is_seven_days() {
        let quote = compute_schedule(&request(1000.0, 3.0, 3, PaymentFrequency::Weekly)).unwrap();
        for pair in quote.schedule.windows(2) {
            assert_eq!((pair[1].due_date - pair[0].due_date).num_days(), 7);
        }
    }

    #[test]
    fn test_month_end_start_date_clamps() {
        let req = LoanRequest::new(
            3000.0,
            4.0,
            4,
            PaymentFrequency::Monthly,
            date(2024, 1, 31),
        );
        let quote = compute_schedule(&req).unwrap();
        let dates: Vec<NaiveDate> = quote.schedule.iter().map(|e| e.due_date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 31),
                date(2024, 2, 29),
                date(2024, 3, 31),
                date(2024, 4, 30)
            ]
        );
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert_eq!(
            compute_schedule(&request(0.0, 5.0, 12, PaymentFrequency::Monthly)),
            Err(InvalidInputError::NonPositivePrincipal(0.0))
        );
        assert_eq!(
            compute_schedule(&request(1000.0, -1.0, 12, PaymentFrequency::Monthly)),
            Err(InvalidInputError::NegativeRate(-1.0))
        );
        assert_eq!(
            compute_schedule(&request(1000.0, 5.0, 0, PaymentFrequency::Monthly)),
            Err(InvalidInputError::NonPositiveTerm(0))
        );
        assert!(matches!(
            compute_schedule(&request(f64::NAN, 5.0, 12, PaymentFrequency::Monthly)),
            Err(InvalidInputError::NonPositivePrincipal(_))
        ));
        assert!(matches!(
            compute_schedule(&request(1000.0, f64::INFINITY, 12, PaymentFrequency::Monthly)),
            Err(InvalidInputError::NegativeRate(_))
        ));
    }

    #[test]
    fn test_schedule_past_calendar_end_is_rejected() {
        let req = LoanRequest::new(1000.0, 5.0, 24, PaymentFrequency::Monthly, NaiveDate::MAX);
        assert_eq!(
            compute_schedule(&req),
            Err(InvalidInputError::StartDateOutOfRange(NaiveDate::MAX))
        );
    }

    #[test]
    fn test_vanishing_rate_falls_back_to_even_split() {
        let quote = compute_schedule(&request(1200.0, 1e-14, 12, PaymentFrequency::Monthly)).unwrap();

        assert!(quote.payment_amount.is_finite());
        assert_relative_eq!(quote.payment_amount, 100.0, epsilon = 1e-9);
        assert!(quote.effective_annual_rate.is_finite());
        assert_relative_eq!(quote.total_amount, 1200.0, epsilon = 1e-9);
        for entry in &quote.schedule {
            assert!(entry.amount.is_finite());
            assert!(entry.principal_portion.is_finite());
        }
        let principal: f64 = quote.schedule.iter().map(|e| e.principal_portion).sum();
        assert_relative_eq!(principal, 1200.0, epsilon = 1e-9);
        assert_eq!(quote.schedule.last().unwrap().remaining_balance, 0.0);
    }

    #[test]
    fn test_tiny_rate_matches_even_split_closely() {
        let payment = periodic_payment(1200.0, 1e-9, 12);
        assert!(payment.is_finite());
        assert_relative_eq!(payment, 100.0, epsilon = 1e-5);
        assert!(payment > 100.0);
    }

    #[test]
    fn test_huge_rate_stays_finite() {
        let quote = compute_schedule(&request(1000.0, 5000.0, 360, PaymentFrequency::Weekly)).unwrap();

        assert_eq!(quote.total_periods, 1560);
        assert!(quote.payment_amount.is_finite());
        assert!(quote.total_amount.is_finite());
        assert!(quote.effective_annual_rate.is_finite());
        // Interest dominates: the payment is close to one period's interest.
        assert_relative_eq!(quote.payment_amount, 1000.0 * 50.0 / 52.0, max_relative = 1e-9);

        let mut previous = 1000.0;
        for entry in &quote.schedule {
            assert!(entry.amount.is_finite());
            assert!(entry.principal_portion >= 0.0);
            assert!(entry.remaining_balance <= previous);
            previous = entry.remaining_balance;
        }
        let principal: f64 = quote.schedule.iter().map(|e| e.principal_portion).sum();
        assert_relative_eq!(principal, 1000.0, epsilon = 1e-6);
        assert_eq!(quote.schedule.last().unwrap().remaining_balance, 0.0);
    }

    #[test]
    fn test_overflowing_rate_is_rejected() {
        let req = request(1e6, 1e306, 12, PaymentFrequency::Monthly);
        assert_eq!(
            compute_schedule(&req),
            Err(InvalidInputError::RateOutOfRange(1e306))
        );
    }

    #[test]
    fn test_term_with_too_many_installments_is_rejected() {
        let req = request(1000.0, 5.0, u32::MAX, PaymentFrequency::Weekly);
        assert_eq!(
            compute_schedule(&req),
            Err(InvalidInputError::TermTooLong(u32::MAX))
        );

        // The same term fits as a monthly count but not in the calendar.
        let req = request(1000.0, 5.0, u32::MAX, PaymentFrequency::Monthly);
        assert_eq!(
            compute_schedule(&req),
            Err(InvalidInputError::StartDateOutOfRange(date(2024, 1, 1)))
        );
    }

    #[test]
    fn test_identical_requests_give_identical_quotes() {
        let req = request(18_500.0, 9.9, 60, PaymentFrequency::Biweekly);
        let first = compute_schedule(&req).unwrap();
        let second = compute_schedule(&req).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.payment_amount.to_bits(),
            second.payment_amount.to_bits()
        );
    }
}
