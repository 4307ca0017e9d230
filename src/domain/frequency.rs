use crate::error::InvalidInputError;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a borrower pays an installment.
///
/// The periods-per-year table is fixed: weekly=52, biweekly=26, monthly=12,
/// quarterly=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
}

/// Calendar increment between two consecutive due dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarStep {
    Days(u64),
    Months(u32),
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 4] = [
        PaymentFrequency::Weekly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Monthly,
        PaymentFrequency::Quarterly,
    ];

    #[inline]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
        }
    }

    #[inline]
    pub fn step(&self) -> CalendarStep {
        match self {
            PaymentFrequency::Weekly => CalendarStep::Days(7),
            PaymentFrequency::Biweekly => CalendarStep::Days(14),
            PaymentFrequency::Monthly => CalendarStep::Months(1),
            PaymentFrequency::Quarterly => CalendarStep::Months(3),
        }
    }

    /// Due date of the installment `index` periods after `start`.
    ///
    /// Month-based frequencies are measured from `start` rather than from the
    /// previous due date, and clamp to the last day of short months. A loan
    /// starting on Jan 31 is therefore due on Feb 29 (leap year), Mar 31, Apr 30.
    ///
    /// Returns `None` when the result falls outside chrono's calendar.
    pub fn due_date(&self, start: NaiveDate, index: u32) -> Option<NaiveDate> {
        match self.step() {
            CalendarStep::Days(days) => {
                start.checked_add_days(Days::new(days.checked_mul(u64::from(index))?))
            }
            CalendarStep::Months(months) => {
                start.checked_add_months(Months::new(months.checked_mul(index)?))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFrequency {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PaymentFrequency::Weekly),
            "biweekly" => Ok(PaymentFrequency::Biweekly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            "quarterly" => Ok(PaymentFrequency::Quarterly),
            _ => Err(InvalidInputError::UnknownFrequency(s.to_string())),
        }
    }
}
