//! Domain layer: loan terms, the amortization engine, booked loans,
//! portfolio figures and the storage ports the application layer depends on.

pub mod amortization;
pub mod frequency;
pub mod loan;
pub mod portfolio;
pub mod ports;
