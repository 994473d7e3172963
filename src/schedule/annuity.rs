use crate::core::terms::LoanError;
use rust_decimal::{Decimal, MathematicalOps};

/// Amount left to finance after the down payment: `max(0, price - down)`.
pub fn amount_to_finance(price: Decimal, down_payment: Decimal) -> Decimal {
    (price - down_payment).max(Decimal::ZERO)
}

/// Constant periodic payment that fully retires `amount` over
/// `term_periods` at `periodic_rate` per period.
///
/// Standard annuity formula: `PMT = P * r(1+r)^n / ((1+r)^n - 1)`.
/// A zero rate degrades to straight division `P / n`.
///
/// `(1+r)^n` uses [`Decimal::powu`], an exact integer power, so
/// repeated calls with identical inputs are bit-reproducible.
///
/// # Examples
///
/// ```
/// use loan_engine::schedule::annuity::periodic_payment;
/// use rust_decimal_macros::dec;
///
/// let payment = periodic_payment(dec!(12000), dec!(0), 12).unwrap();
/// assert_eq!(payment, dec!(1000));
/// ```
pub fn periodic_payment(
    amount: Decimal,
    periodic_rate: Decimal,
    term_periods: u32,
) -> Result<Decimal, LoanError> {
    if term_periods == 0 {
        return Err(LoanError::ZeroTerm);
    }
    if amount < Decimal::ZERO {
        return Err(LoanError::NegativePrincipal(amount));
    }
    if periodic_rate < Decimal::ZERO {
        return Err(LoanError::NegativeRate(periodic_rate));
    }

    if periodic_rate == Decimal::ZERO {
        return Ok(amount / Decimal::from(term_periods));
    }

    let growth = (Decimal::ONE + periodic_rate).powu(u64::from(term_periods));
    Ok(amount * (periodic_rate * growth) / (growth - Decimal::ONE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_rate_is_straight_division() {
        let payment = periodic_payment(dec!(12000), Decimal::ZERO, 12).unwrap();
        assert_eq!(payment, dec!(1000));
    }

    #[test]
    fn test_classic_mortgage_payment() {
        // 100,000 at 0.5% monthly over 360 months -> 599.55
        let payment = periodic_payment(dec!(100_000), dec!(0.005), 360).unwrap();
        assert_eq!(payment.round_dp(2), dec!(599.55));
    }

    #[test]
    fn test_vehicle_credit_payment() {
        // 50M at 1.8% monthly over 72 months. The payment must at least
        // cover the first period's interest of 900,000.
        let payment = periodic_payment(dec!(50_000_000), dec!(0.018), 72).unwrap();
        assert!(payment > dec!(900_000));
        assert!(payment < dec!(50_000_000));
    }

    #[test]
    fn test_single_period_pays_principal_plus_interest() {
        let payment = periodic_payment(dec!(1000), dec!(0.02), 1).unwrap();
        assert_eq!(payment, dec!(1020));
    }

    #[test]
    fn test_deterministic() {
        let a = periodic_payment(dec!(37_500_000), dec!(0.0125), 48).unwrap();
        let b = periodic_payment(dec!(37_500_000), dec!(0.0125), 48).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_term_rejected() {
        assert!(periodic_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_negative_inputs_rejected() {
        assert!(periodic_payment(dec!(-1000), dec!(0.01), 12).is_err());
        assert!(periodic_payment(dec!(1000), dec!(-0.01), 12).is_err());
    }

    #[test]
    fn test_amount_to_finance() {
        assert_eq!(amount_to_finance(dec!(62_000_000), dec!(12_000_000)), dec!(50_000_000));
        assert_eq!(amount_to_finance(dec!(10_000), dec!(15_000)), Decimal::ZERO);
        assert_eq!(amount_to_finance(dec!(10_000), dec!(10_000)), Decimal::ZERO);
    }
}
