//! # loan-engine
//!
//! Consumer loan simulation, amortization, and balance-tracking engine.
//!
//! Given the terms of a fixed-rate consumer loan (vehicle price, down
//! payment, monthly rate, term), this engine computes the constant
//! annuity payment, materializes the theoretical amortization schedule,
//! and reconciles a live outstanding balance from the history of real
//! payments, a balance that diverges from the original schedule as
//! soon as extra-to-capital amounts appear.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: loan terms, recorded payments, errors
//! - **schedule** — Annuity payment formula and amortization table generation
//! - **tracking** — Balance reconciliation against recorded payment history
//! - **portfolio** — Saved simulations and active-credit bookkeeping
//! - **scenario** — Synthetic payment-history generation for testing

pub mod core;
pub mod portfolio;
pub mod scenario;
pub mod schedule;
pub mod tracking;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::payment::{ActualPayment, PaymentHistory};
    pub use crate::core::terms::{LoanError, LoanTerms};
    pub use crate::portfolio::simulation::{Simulation, SimulationRequest};
    pub use crate::portfolio::store::{CreditPortfolio, PortfolioError};
    pub use crate::schedule::amortization::{AmortizationRow, AmortizationSchedule};
    pub use crate::tracking::reconciler::BalanceReport;
}
