use super::rounded;
use crate::domain::loan::Payment;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PaymentRow {
    payment: u32,
    loan: u32,
    borrower: u32,
    installment: Option<u32>,
    amount: Decimal,
    paid_on: NaiveDate,
    late_fee: Option<Decimal>,
}

/// Writes a payment history, one row per recorded payment.
///
/// The installment column echoes what the payment targeted and is empty when
/// it went to the earliest unpaid installment.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments<'a>(
        &mut self,
        payments: impl IntoIterator<Item = &'a Payment>,
    ) -> Result<()> {
        for payment in payments {
            self.writer.serialize(PaymentRow {
                payment: payment.id,
                loan: payment.loan,
                borrower: payment.borrower,
                installment: payment.installment,
                amount: rounded(payment.amount, 2)?,
                paid_on: payment.paid_on,
                late_fee: payment.late_fee.map(|fee| rounded(fee, 2)).transpose()?,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
