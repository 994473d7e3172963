use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from loan parameter validation.
///
/// Every variant is a precondition violation: the engine rejects bad
/// inputs up front and never attempts partial recovery.
#[derive(Debug, Error)]
pub enum LoanError {
    #[error("loan term must be at least one period")]
    ZeroTerm,
    #[error("principal must be non-negative, got {0}")]
    NegativePrincipal(Decimal),
    #[error("periodic rate must be non-negative, got {0}")]
    NegativeRate(Decimal),
    #[error("periodic payment must be non-negative, got {0}")]
    NegativePayment(Decimal),
    #[error("nothing to finance: down payment {down_payment} covers the price {price}")]
    NothingToFinance {
        price: Decimal,
        down_payment: Decimal,
    },
}

/// Fixed parameters of a fixed-rate consumer loan.
///
/// `periodic_payment` is the constant annuity payment computed once (see
/// [`crate::schedule::annuity::periodic_payment`]) and treated as an
/// immutable input by both the schedule generator and the balance
/// reconciler. Terms are validated at construction and never change.
///
/// # Examples
///
/// ```
/// use loan_engine::core::terms::LoanTerms;
/// use rust_decimal_macros::dec;
///
/// let terms = LoanTerms::new(dec!(12000), dec!(0), 12, dec!(1000)).unwrap();
/// assert_eq!(terms.principal(), dec!(12000));
/// assert_eq!(terms.term_periods(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Financed amount, after the down payment.
    principal: Decimal,
    /// Monthly rate as a decimal (e.g. 0.018 for 1.8% per month).
    periodic_rate: Decimal,
    /// Number of payment periods. At least 1.
    term_periods: u32,
    /// The fixed annuity payment per period.
    periodic_payment: Decimal,
}

impl LoanTerms {
    /// Create validated loan terms.
    ///
    /// Rejects a zero term and negative principal, rate or payment. A
    /// zero payment with a positive principal is accepted: the schedule
    /// generator caps its output at `term_periods` rows, so an
    /// insufficient payment produces a stagnant balance rather than a
    /// runaway loop.
    pub fn new(
        principal: Decimal,
        periodic_rate: Decimal,
        term_periods: u32,
        periodic_payment: Decimal,
    ) -> Result<Self, LoanError> {
        if term_periods == 0 {
            return Err(LoanError::ZeroTerm);
        }
        if principal < Decimal::ZERO {
            return Err(LoanError::NegativePrincipal(principal));
        }
        if periodic_rate < Decimal::ZERO {
            return Err(LoanError::NegativeRate(periodic_rate));
        }
        if periodic_payment < Decimal::ZERO {
            return Err(LoanError::NegativePayment(periodic_payment));
        }
        Ok(Self {
            principal,
            periodic_rate,
            term_periods,
            periodic_payment,
        })
    }

    // --- Accessors ---

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn periodic_rate(&self) -> Decimal {
        self.periodic_rate
    }

    pub fn term_periods(&self) -> u32 {
        self.term_periods
    }

    pub fn periodic_payment(&self) -> Decimal {
        self.periodic_payment
    }
}
