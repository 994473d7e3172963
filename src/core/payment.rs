use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A real payment recorded against an active credit.
///
/// Payments belong to exactly one simulation and are immutable once
/// recorded: there is no edit or delete. `extra_to_capital` is the
/// portion applied directly to principal beyond the scheduled
/// principal/interest split; `insurance_and_others` is a non-amortizing
/// charge that never reduces the balance.
///
/// # Examples
///
/// ```
/// use loan_engine::core::payment::ActualPayment;
/// use chrono::Utc;
/// use rust_decimal_macros::dec;
///
/// let payment = ActualPayment::new(Utc::now(), dec!(2_150_000))
///     .with_extra_to_capital(dec!(500_000))
///     .with_note("tax refund");
///
/// assert_eq!(payment.extra_to_capital(), dec!(500_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualPayment {
    /// When the payment was made.
    payment_date: DateTime<Utc>,
    /// The full amount handed over (installment + extras + charges).
    total_amount_paid: Decimal,
    /// Amount applied directly to principal. Non-negative.
    extra_to_capital: Decimal,
    /// Insurance and other non-amortizing charges. Non-negative.
    insurance_and_others: Decimal,
    /// Optional free-text note.
    note: Option<String>,
}

impl ActualPayment {
    /// Record a new payment.
    ///
    /// # Panics
    ///
    /// Panics if `total_amount_paid` is negative.
    pub fn new(payment_date: DateTime<Utc>, total_amount_paid: Decimal) -> Self {
        assert!(
            total_amount_paid >= Decimal::ZERO,
            "payment amount must be non-negative, got {}",
            total_amount_paid
        );
        Self {
            payment_date,
            total_amount_paid,
            extra_to_capital: Decimal::ZERO,
            insurance_and_others: Decimal::ZERO,
            note: None,
        }
    }

    /// Set the extra-to-capital portion.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative.
    pub fn with_extra_to_capital(mut self, amount: Decimal) -> Self {
        assert!(
            amount >= Decimal::ZERO,
            "extra-to-capital must be non-negative, got {}",
            amount
        );
        self.extra_to_capital = amount;
        self
    }

    /// Set the insurance-and-others charge.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative.
    pub fn with_insurance_and_others(mut self, amount: Decimal) -> Self {
        assert!(
            amount >= Decimal::ZERO,
            "insurance charge must be non-negative, got {}",
            amount
        );
        self.insurance_and_others = amount;
        self
    }

    /// Attach a free-text note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    // --- Accessors ---

    pub fn payment_date(&self) -> DateTime<Utc> {
        self.payment_date
    }

    pub fn total_amount_paid(&self) -> Decimal {
        self.total_amount_paid
    }

    pub fn extra_to_capital(&self) -> Decimal {
        self.extra_to_capital
    }

    pub fn insurance_and_others(&self) -> Decimal {
        self.insurance_and_others
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// The chronological record of payments made against one credit.
///
/// Append-only: payments are never edited or removed. The reconciler
/// consumes payments in ascending date order; [`Self::sorted_by_date`]
/// produces that ordering regardless of insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentHistory {
    payments: Vec<ActualPayment>,
}

impl PaymentHistory {
    pub fn new() -> Self {
        Self {
            payments: Vec::new(),
        }
    }

    pub fn add(&mut self, payment: ActualPayment) {
        self.payments.push(payment);
    }

    pub fn payments(&self) -> &[ActualPayment] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Sum of every amount actually handed over.
    pub fn total_paid(&self) -> Decimal {
        self.payments.iter().map(|p| p.total_amount_paid()).sum()
    }

    /// Sum of the extra-to-capital portions across all payments.
    pub fn total_extra_to_capital(&self) -> Decimal {
        self.payments.iter().map(|p| p.extra_to_capital()).sum()
    }

    /// Payments in ascending `payment_date` order.
    pub fn sorted_by_date(&self) -> Vec<ActualPayment> {
        let mut sorted = self.payments.clone();
        sorted.sort_by_key(|p| p.payment_date());
        sorted
    }
}

impl FromIterator<ActualPayment> for PaymentHistory {
    fn from_iter<T: IntoIterator<Item = ActualPayment>>(iter: T) -> Self {
        Self {
            payments: iter.into_iter().collect(),
        }
    }
}
