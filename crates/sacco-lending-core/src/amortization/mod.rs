//! Level-payment loan amortization.
//!
//! - [`schedule`]: monthly payment and full repayment schedule.
//! - [`affordability`]: largest principal a borrower's debt headroom can service.

pub mod affordability;
pub mod schedule;
