use crate::core::terms::LoanTerms;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Residual balance at or below this collapses to zero.
const BALANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// One period of the theoretical payment breakdown.
///
/// Invariants: `principal_component + interest_component ==
/// payment_amount` (modulo rounding), and the balance of row *n* equals
/// the balance of row *n-1* minus the principal component of row *n*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-indexed, unique, sequential.
    pub period_number: u32,
    /// The effective payment for this period. Equal to the fixed
    /// annuity payment except on the final row, which absorbs rounding
    /// drift accumulated over the schedule.
    pub payment_amount: Decimal,
    pub principal_component: Decimal,
    pub interest_component: Decimal,
    /// Never negative; clamped to zero once at or below 0.01.
    pub remaining_balance: Decimal,
}

/// The fully materialized schedule for one loan.
///
/// A pure derived artifact: it has no persistence identity of its own
/// and is owned by whichever caller requested it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    rows: Vec<AmortizationRow>,
}

impl AmortizationSchedule {
    pub fn rows(&self) -> &[AmortizationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total interest paid over the schedule.
    pub fn total_interest(&self) -> Decimal {
        self.rows.iter().map(|r| r.interest_component).sum()
    }

    /// Total principal retired over the schedule.
    pub fn total_principal(&self) -> Decimal {
        self.rows.iter().map(|r| r.principal_component).sum()
    }

    /// Total of all effective payments.
    pub fn total_paid(&self) -> Decimal {
        self.rows.iter().map(|r| r.payment_amount).sum()
    }

    /// Balance after the last row. Zero for any schedule that ran to payoff.
    pub fn final_balance(&self) -> Decimal {
        self.rows
            .last()
            .map(|r| r.remaining_balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Interest as a percentage of everything paid.
    pub fn interest_share_percent(&self) -> f64 {
        let total = self.total_paid();
        if total == Decimal::ZERO {
            return 0.0;
        }
        let pct = self.total_interest() * Decimal::from(100) / total;
        pct.to_string().parse::<f64>().unwrap_or(0.0)
    }
}

impl std::fmt::Display for AmortizationSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:>6} {:>16} {:>16} {:>16} {:>16}",
            "Period", "Payment", "Principal", "Interest", "Balance"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>6} {:>16} {:>16} {:>16} {:>16}",
                row.period_number,
                row.payment_amount.round_dp(2),
                row.principal_component.round_dp(2),
                row.interest_component.round_dp(2),
                row.remaining_balance.round_dp(2),
            )?;
        }
        writeln!(f, "Total interest: {}", self.total_interest().round_dp(2))?;
        writeln!(f, "Total paid:     {}", self.total_paid().round_dp(2))?;
        Ok(())
    }
}

/// Generate the theoretical payment-by-payment schedule for `terms`.
///
/// Pure and deterministic: identical terms always produce an identical
/// schedule. Rows are strictly ascending by period number, contiguous
/// from 1, and materialized fully before return.
///
/// # Algorithm
///
/// Starting from `balance = principal`, for each period:
///
/// 1. `interest = balance * periodic_rate`.
/// 2. On the final period the principal component is forced to the full
///    remaining balance and the effective payment becomes
///    `balance + interest`, absorbing rounding drift. On all other
///    periods `principal = payment - interest`.
/// 3. The row's remaining balance collapses to zero once at or below
///    0.01.
/// 4. Emission stops early if the balance hits zero before the final
///    period (oversized payment).
///
/// A zero rate degrades to straight-line amortization: the principal
/// component is `principal / term_periods` every period, interest zero.
///
/// The row count is capped at `term_periods`, so a payment that fails
/// to cover the first period's interest yields a stagnant or growing
/// balance, never an unbounded schedule. Payment sufficiency is the
/// caller's responsibility.
///
/// # Examples
///
/// ```
/// use loan_engine::core::terms::LoanTerms;
/// use loan_engine::schedule::{amortization, annuity};
/// use rust_decimal_macros::dec;
///
/// let payment = annuity::periodic_payment(dec!(12000), dec!(0), 12).unwrap();
/// let terms = LoanTerms::new(dec!(12000), dec!(0), 12, payment).unwrap();
/// let schedule = amortization::generate(&terms);
///
/// assert_eq!(schedule.len(), 12);
/// assert_eq!(schedule.final_balance(), dec!(0));
/// ```
pub fn generate(terms: &LoanTerms) -> AmortizationSchedule {
    let term = terms.term_periods();
    let rate = terms.periodic_rate();
    let payment = terms.periodic_payment();

    let straight_slice = if rate == Decimal::ZERO {
        Some(terms.principal() / Decimal::from(term))
    } else {
        None
    };

    let mut rows = Vec::with_capacity(term as usize);
    let mut current_balance = terms.principal();

    for period in 1..=term {
        let interest = current_balance * rate;

        let principal_component = if period == term {
            // Final period: force full payoff.
            current_balance
        } else if let Some(slice) = straight_slice {
            slice
        } else {
            payment - interest
        };

        let payment_amount = if period == term {
            current_balance + interest
        } else if straight_slice.is_some() {
            principal_component
        } else {
            payment
        };

        let final_balance = current_balance - principal_component;

        rows.push(AmortizationRow {
            period_number: period,
            payment_amount,
            principal_component,
            interest_component: interest,
            remaining_balance: if final_balance <= BALANCE_EPSILON {
                Decimal::ZERO
            } else {
                final_balance
            },
        });

        current_balance = final_balance;
        if current_balance <= Decimal::ZERO {
            if period < term {
                debug!("loan paid off early at period {} of {}", period, term);
            }
            break;
        }
    }

    AmortizationSchedule { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::annuity;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn terms(principal: Decimal, rate: Decimal, term: u32) -> LoanTerms {
        let payment = annuity::periodic_payment(principal, rate, term).unwrap();
        LoanTerms::new(principal, rate, term, payment).unwrap()
    }

    #[test]
    fn test_first_row_interest_is_principal_times_rate() {
        let schedule = generate(&terms(dec!(50_000_000), dec!(0.018), 72));
        assert_eq!(schedule.rows()[0].interest_component, dec!(900_000));
    }

    #[test]
    fn test_row_count_and_ordering() {
        let schedule = generate(&terms(dec!(50_000_000), dec!(0.018), 72));
        assert_eq!(schedule.len(), 72);
        for (i, row) in schedule.rows().iter().enumerate() {
            assert_eq!(row.period_number, (i + 1) as u32);
        }
    }

    #[test]
    fn test_principal_sums_to_loan_amount() {
        let schedule = generate(&terms(dec!(50_000_000), dec!(0.018), 72));
        let diff = (schedule.total_principal() - dec!(50_000_000)).abs();
        assert!(diff <= dec!(0.01), "principal drift {}", diff);
    }

    #[test]
    fn test_final_row_balance_is_zero() {
        let schedule = generate(&terms(dec!(100_000), dec!(0.005), 360));
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_balance_chain() {
        let schedule = generate(&terms(dec!(10_000), dec!(0.01), 12));
        let mut previous = dec!(10_000);
        for row in schedule.rows().iter().take(schedule.len() - 1) {
            assert_eq!(row.remaining_balance, previous - row.principal_component);
            previous = row.remaining_balance;
        }
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let schedule = generate(&terms(dec!(12000), Decimal::ZERO, 12));
        assert_eq!(schedule.len(), 12);
        for row in schedule.rows() {
            assert_eq!(row.interest_component, Decimal::ZERO);
            assert_eq!(row.principal_component, dec!(1000));
        }
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_oversized_payment_terminates_early() {
        // Payment large enough to retire the loan in two periods.
        let terms = LoanTerms::new(dec!(1000), dec!(0.01), 12, dec!(600)).unwrap();
        let schedule = generate(&terms);
        assert!(schedule.len() < 12);
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_insufficient_payment_still_bounded() {
        // Payment below first-period interest: balance grows, but the
        // schedule is still capped at the term.
        let terms = LoanTerms::new(dec!(10_000), dec!(0.02), 24, dec!(100)).unwrap();
        let schedule = generate(&terms);
        assert_eq!(schedule.len(), 24);
    }

    #[test]
    fn test_deterministic() {
        let t = terms(dec!(37_500_000), dec!(0.0125), 48);
        assert_eq!(generate(&t), generate(&t));
    }

    #[test]
    fn test_interest_share_percent() {
        let schedule = generate(&terms(dec!(12000), Decimal::ZERO, 12));
        assert_relative_eq!(schedule.interest_share_percent(), 0.0);

        let schedule = generate(&terms(dec!(100_000), dec!(0.005), 360));
        // 360 * 599.55 ≈ 215,838 paid, of which ~115,838 is interest.
        assert_relative_eq!(schedule.interest_share_percent(), 53.67, epsilon = 0.1);
    }
}
