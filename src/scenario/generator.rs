//! Synthetic payment-history generation.
//!
//! Produces plausible payment histories for a given set of loan terms:
//! regular installments, the occasional extra-to-capital amount, an
//! optional flat insurance charge. Used by the CLI `generate` command
//! and the benchmarks.

use crate::core::payment::{ActualPayment, PaymentHistory};
use crate::core::terms::LoanTerms;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a synthetic payment history.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Number of payments to generate.
    pub payment_count: usize,
    /// Date of the first payment; subsequent payments land 30 days apart.
    pub start_date: DateTime<Utc>,
    /// Probability that a payment carries an extra-to-capital amount.
    pub extra_payment_probability: f64,
    /// Upper bound for a generated extra-to-capital amount.
    pub max_extra_to_capital: Decimal,
    /// Flat insurance charge added to every payment.
    pub insurance_per_payment: Decimal,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            payment_count: 12,
            start_date: Utc::now(),
            extra_payment_probability: 0.25,
            max_extra_to_capital: Decimal::from(1_000),
            insurance_per_payment: Decimal::ZERO,
        }
    }
}

/// Generate a random payment history against `terms`.
///
/// Every payment covers the scheduled installment; extras are layered
/// on top with the configured probability. Dates ascend strictly, so
/// the result already satisfies the reconciler's ordering contract.
pub fn generate_random_history(terms: &LoanTerms, config: &HistoryConfig) -> PaymentHistory {
    let mut rng = rand::thread_rng();
    let mut history = PaymentHistory::new();

    for i in 0..config.payment_count {
        let date = config.start_date + Duration::days(30 * i as i64);

        let extra = if config.max_extra_to_capital > Decimal::ZERO
            && rng.gen_bool(config.extra_payment_probability)
        {
            let max_f64: f64 = config
                .max_extra_to_capital
                .to_string()
                .parse()
                .unwrap_or(1_000.0);
            let extra_f64 = rng.gen_range(0.0..max_f64);
            Decimal::from_f64_retain(extra_f64)
                .unwrap_or(Decimal::ZERO)
                .round_dp(2)
        } else {
            Decimal::ZERO
        };

        let total = terms.periodic_payment() + extra + config.insurance_per_payment;
        let mut payment = ActualPayment::new(date, total);
        if extra > Decimal::ZERO {
            payment = payment.with_extra_to_capital(extra);
        }
        if config.insurance_per_payment > Decimal::ZERO {
            payment = payment.with_insurance_and_others(config.insurance_per_payment);
        }
        history.add(payment);
    }

    history
}
