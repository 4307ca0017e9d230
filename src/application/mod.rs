//! Application layer orchestrating loan booking and repayment.
//!
//! This module defines the `LoanService`, which validates loan terms through
//! the amortization engine and persists loans and payments through the
//! storage ports.

pub mod service;
