use super::rounded;
use crate::domain::amortization::ScheduleEntry;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ScheduleRow {
    loan: u32,
    period: u32,
    due_date: NaiveDate,
    amount: Decimal,
    principal: Decimal,
    interest: Decimal,
    remaining_balance: Decimal,
    status: &'static str,
}

/// Writes amortization schedules as CSV, one row per installment.
///
/// Periods are numbered from 1 and money is rounded to cents.
pub struct ScheduleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ScheduleWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_schedule(&mut self, loan: u32, schedule: &[ScheduleEntry]) -> Result<()> {
        for (period, entry) in (1u32..).zip(schedule) {
            self.writer.serialize(ScheduleRow {
                loan,
                period,
                due_date: entry.due_date,
                amount: rounded(entry.amount, 2)?,
                principal: rounded(entry.principal_portion, 2)?,
                interest: rounded(entry.interest_portion, 2)?,
                remaining_balance: rounded(entry.remaining_balance, 2)?,
                status: entry.status.as_str(),
            })?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
