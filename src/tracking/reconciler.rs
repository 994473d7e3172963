use crate::core::payment::{ActualPayment, PaymentHistory};
use crate::core::terms::LoanTerms;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current outstanding balance after replaying `payments` against the
/// fixed-rate model.
///
/// Starting from `balance = principal`, each payment is one discrete
/// compounding-plus-payment event:
///
/// 1. `interest = balance * periodic_rate`
/// 2. `scheduled_principal = periodic_payment - interest`, always from
///    the *original* fixed payment, never the amount actually paid.
/// 3. `balance -= scheduled_principal + extra_to_capital`
///
/// `insurance_and_others` and any shortfall or excess between the
/// amount actually paid and the scheduled payment never touch
/// principal. The model assumes every recorded payment at least covers
/// the scheduled payment; underpayment is not detected or penalized.
///
/// This is not equivalent to re-running the amortization engine with
/// fewer periods: extra-to-capital amounts are irregular and period
/// boundaries are not re-derived. Two payments inside the same calendar
/// month are still two separate events.
///
/// Contract: `payments` must already be in ascending `payment_date`
/// order (see [`PaymentHistory::sorted_by_date`]); unsorted input
/// yields an incorrect, unspecified balance. The result is clamped at
/// zero and recomputed from scratch on every call; no incremental
/// state is carried between invocations.
pub fn current_balance(terms: &LoanTerms, payments: &[ActualPayment]) -> Decimal {
    let mut balance = terms.principal();
    for payment in payments {
        let interest_for_period = balance * terms.periodic_rate();
        let principal_from_scheduled = terms.periodic_payment() - interest_for_period;
        balance -= principal_from_scheduled + payment.extra_to_capital();
    }
    balance.max(Decimal::ZERO)
}

/// Snapshot of a credit derived from its terms and payment history.
///
/// Derived, never stored: rebuilt on demand whenever the history or the
/// owning simulation changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub current_balance: Decimal,
    pub payments_applied: usize,
    pub total_paid: Decimal,
    pub total_extra_to_capital: Decimal,
    /// The financed amount the credit started from.
    pub original_principal: Decimal,
}

impl BalanceReport {
    /// Reconcile a payment history against loan terms.
    ///
    /// Sorts the history by date before replaying, so callers holding
    /// an unordered [`PaymentHistory`] cannot violate the reconciler's
    /// ordering contract.
    pub fn from_history(terms: &LoanTerms, history: &PaymentHistory) -> Self {
        let ordered = history.sorted_by_date();
        Self {
            current_balance: current_balance(terms, &ordered),
            payments_applied: ordered.len(),
            total_paid: history.total_paid(),
            total_extra_to_capital: history.total_extra_to_capital(),
            original_principal: terms.principal(),
        }
    }

    pub fn paid_off(&self) -> bool {
        self.current_balance == Decimal::ZERO
    }

    /// Share of the original principal already retired.
    pub fn progress_percent(&self) -> f64 {
        if self.original_principal == Decimal::ZERO {
            return 0.0;
        }
        let retired = self.original_principal - self.current_balance;
        let pct = retired * Decimal::from(100) / self.original_principal;
        pct.to_string().parse::<f64>().unwrap_or(0.0)
    }
}

impl std::fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Credit Balance ===")?;
        writeln!(f, "Original principal: {}", self.original_principal.round_dp(2))?;
        writeln!(f, "Current balance:    {}", self.current_balance.round_dp(2))?;
        writeln!(f, "Payments applied:   {}", self.payments_applied)?;
        writeln!(f, "Total paid:         {}", self.total_paid.round_dp(2))?;
        writeln!(f, "Extra to capital:   {}", self.total_extra_to_capital.round_dp(2))?;
        writeln!(f, "Progress:           {:.1}%", self.progress_percent())?;
        Ok(())
    }
}
