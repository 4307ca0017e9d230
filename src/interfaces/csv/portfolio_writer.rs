use super::rounded;
use crate::domain::portfolio::PortfolioSummary;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PortfolioRow {
    loans: usize,
    active: usize,
    paid: usize,
    overdue: usize,
    total_lent: Decimal,
    average_rate: Decimal,
    total_paid: Decimal,
    outstanding: Decimal,
}

/// Writes a portfolio summary as a single CSV row.
pub struct PortfolioWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PortfolioWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_summary(&mut self, summary: &PortfolioSummary) -> Result<()> {
        self.writer.serialize(PortfolioRow {
            loans: summary.loans,
            active: summary.active,
            paid: summary.paid,
            overdue: summary.overdue,
            total_lent: rounded(summary.total_lent, 2)?,
            average_rate: rounded(summary.average_rate, 4)?,
            total_paid: rounded(summary.total_paid, 2)?,
            outstanding: rounded(summary.outstanding, 2)?,
        })?;
        self.writer.flush()?;
        Ok(())
    }
}
