use chrono::{Duration, TimeZone, Utc};
use loan_engine::core::payment::ActualPayment;
use loan_engine::core::terms::LoanTerms;
use loan_engine::schedule::{amortization, annuity};
use loan_engine::tracking::reconciler;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Generate a principal between 1,000 and 100,000,000.
fn arb_principal() -> impl Strategy<Value = Decimal> {
    (1_000u64..100_000_000u64).prop_map(Decimal::from)
}

/// Generate a monthly rate between 0.01% and 3% as a decimal.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=300i64).prop_map(|basis| Decimal::new(basis, 4))
}

/// Generate a term between 1 and 120 months.
fn arb_term() -> impl Strategy<Value = u32> {
    1u32..=120u32
}

/// Valid terms with the payment always derived from the annuity formula.
fn arb_terms() -> impl Strategy<Value = LoanTerms> {
    (arb_principal(), arb_rate(), arb_term()).prop_map(|(principal, rate, term)| {
        let payment = annuity::periodic_payment(principal, rate, term)
            .expect("strategy only produces valid annuity inputs");
        LoanTerms::new(principal, rate, term, payment)
            .expect("strategy only produces valid terms")
    })
}

/// A payment history of `0..30` on-schedule payments with occasional
/// extra-to-capital amounts, dated one month apart.
fn arb_extras() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..50_000u64, 0..30)
}

fn payments_from_extras(terms: &LoanTerms, extras: &[u64]) -> Vec<ActualPayment> {
    let start = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    extras
        .iter()
        .enumerate()
        .map(|(i, &extra)| {
            let extra = Decimal::from(extra);
            ActualPayment::new(
                start + Duration::days(30 * i as i64),
                terms.periodic_payment() + extra,
            )
            .with_extra_to_capital(extra)
        })
        .collect()
}

proptest! {
    // ===================================================================
    // INVARIANT 1: A schedule built from the annuity payment has exactly
    // `term_periods` rows, ascending, contiguous from 1.
    // ===================================================================
    #[test]
    fn schedule_has_exactly_term_rows(terms in arb_terms()) {
        let schedule = amortization::generate(&terms);
        prop_assert_eq!(schedule.len() as u32, terms.term_periods());
        for (i, row) in schedule.rows().iter().enumerate() {
            prop_assert_eq!(row.period_number, (i + 1) as u32);
        }
    }

    // ===================================================================
    // INVARIANT 2: Principal components sum to the principal.
    //
    // The last-row adjustment forces full payoff, so the sum of all
    // principal components reconstructs the financed amount.
    // ===================================================================
    #[test]
    fn principal_components_sum_to_principal(terms in arb_terms()) {
        let schedule = amortization::generate(&terms);
        let drift = (schedule.total_principal() - terms.principal()).abs();
        prop_assert!(
            drift <= dec!(0.01),
            "principal drift {} on {:?}",
            drift,
            terms
        );
    }

    // ===================================================================
    // INVARIANT 3: The final row always lands on a zero balance.
    // ===================================================================
    #[test]
    fn final_row_balance_is_zero(terms in arb_terms()) {
        let schedule = amortization::generate(&terms);
        prop_assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    // ===================================================================
    // INVARIANT 4: Every row splits its payment into principal plus
    // interest.
    // ===================================================================
    #[test]
    fn rows_split_payment_exactly(terms in arb_terms()) {
        let schedule = amortization::generate(&terms);
        for row in schedule.rows() {
            let split = row.principal_component + row.interest_component;
            let diff = (split - row.payment_amount).abs();
            prop_assert!(
                diff <= dec!(0.0001),
                "row {} split {} vs payment {}",
                row.period_number,
                split,
                row.payment_amount
            );
        }
    }

    // ===================================================================
    // INVARIANT 5: Schedule generation is deterministic.
    //
    // Same terms, same schedule. No randomness, no hidden state.
    // ===================================================================
    #[test]
    fn schedule_is_deterministic(terms in arb_terms()) {
        let first = amortization::generate(&terms);
        let second = amortization::generate(&terms);
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // INVARIANT 6: Row balances never go negative.
    // ===================================================================
    #[test]
    fn balances_never_negative(terms in arb_terms()) {
        let schedule = amortization::generate(&terms);
        for row in schedule.rows() {
            prop_assert!(row.remaining_balance >= Decimal::ZERO);
        }
    }

    // ===================================================================
    // INVARIANT 7: Reconciling an empty history returns the principal.
    // ===================================================================
    #[test]
    fn empty_history_reconciles_to_principal(terms in arb_terms()) {
        prop_assert_eq!(
            reconciler::current_balance(&terms, &[]),
            terms.principal()
        );
    }

    // ===================================================================
    // INVARIANT 8: The reconciled balance is monotonically
    // non-increasing as payments are appended in date order.
    // ===================================================================
    #[test]
    fn reconciled_balance_monotone(terms in arb_terms(), extras in arb_extras()) {
        let payments = payments_from_extras(&terms, &extras);
        let mut previous = terms.principal();
        for k in 1..=payments.len() {
            let balance = reconciler::current_balance(&terms, &payments[..k]);
            prop_assert!(
                balance <= previous,
                "balance {} rose above {} after {} payments",
                balance,
                previous,
                k
            );
            previous = balance;
        }
    }

    // ===================================================================
    // INVARIANT 9: The reconciler never returns a negative balance, no
    // matter how oversized the extra-to-capital amounts are.
    // ===================================================================
    #[test]
    fn reconciled_balance_never_negative(
        terms in arb_terms(),
        oversized in 1u64..1_000_000_000u64,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let huge = ActualPayment::new(start, Decimal::from(oversized))
            .with_extra_to_capital(Decimal::from(oversized));
        let balance = reconciler::current_balance(&terms, &[huge]);
        prop_assert!(balance >= Decimal::ZERO);
    }

    // ===================================================================
    // INVARIANT 10: A zero rate produces an interest-free schedule.
    // ===================================================================
    #[test]
    fn zero_rate_schedule_is_interest_free(
        principal in arb_principal(),
        term in arb_term(),
    ) {
        let payment = annuity::periodic_payment(principal, Decimal::ZERO, term)
            .expect("valid zero-rate inputs");
        let terms = LoanTerms::new(principal, Decimal::ZERO, term, payment)
            .expect("valid terms");
        let schedule = amortization::generate(&terms);
        for row in schedule.rows() {
            prop_assert_eq!(row.interest_component, Decimal::ZERO);
        }
        prop_assert_eq!(schedule.total_paid(), schedule.total_principal());
    }
}
