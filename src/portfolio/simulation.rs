use crate::core::terms::{LoanError, LoanTerms};
use crate::schedule::amortization::{self, AmortizationSchedule};
use crate::schedule::annuity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-facing inputs for a loan simulation, as entered on the
/// calculator: vehicle price, down payment, monthly rate in percent,
/// and term in months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub name: String,
    pub vehicle_price: Decimal,
    pub down_payment: Decimal,
    /// Monthly rate as the user types it, in percent (1.8 means 1.8%).
    pub monthly_rate_percent: Decimal,
    pub term_months: u32,
}

/// A saved loan simulation: the request that produced it plus the
/// derived terms and cost totals.
///
/// Inputs are frozen at save time; editing means building a new
/// simulation from a new request.
///
/// # Examples
///
/// ```
/// use loan_engine::portfolio::simulation::{Simulation, SimulationRequest};
/// use rust_decimal_macros::dec;
///
/// let simulation = Simulation::from_request(SimulationRequest {
///     name: "family car".into(),
///     vehicle_price: dec!(62_000_000),
///     down_payment: dec!(12_000_000),
///     monthly_rate_percent: dec!(1.8),
///     term_months: 72,
/// }).unwrap();
///
/// assert_eq!(simulation.terms().principal(), dec!(50_000_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    id: Uuid,
    name: String,
    vehicle_price: Decimal,
    down_payment: Decimal,
    monthly_rate_percent: Decimal,
    terms: LoanTerms,
    total_interest_paid: Decimal,
    total_loan_cost: Decimal,
    created_at: DateTime<Utc>,
}

impl Simulation {
    /// Build a simulation from user inputs.
    ///
    /// Converts the percent rate to a decimal, computes the financed
    /// amount (`max(0, price - down_payment)`) and the annuity payment,
    /// and derives the cost totals. A degenerate loan (nothing left to
    /// finance) is rejected with [`LoanError::NothingToFinance`]
    /// before the engine is ever invoked.
    pub fn from_request(request: SimulationRequest) -> Result<Self, LoanError> {
        Self::build(Uuid::new_v4(), request)
    }

    /// Build a simulation with a specific id (useful for testing / determinism).
    pub fn with_id(id: Uuid, request: SimulationRequest) -> Result<Self, LoanError> {
        Self::build(id, request)
    }

    fn build(id: Uuid, request: SimulationRequest) -> Result<Self, LoanError> {
        let amount = annuity::amount_to_finance(request.vehicle_price, request.down_payment);
        if amount <= Decimal::ZERO {
            return Err(LoanError::NothingToFinance {
                price: request.vehicle_price,
                down_payment: request.down_payment,
            });
        }

        let periodic_rate = request.monthly_rate_percent / Decimal::from(100);
        let payment = annuity::periodic_payment(amount, periodic_rate, request.term_months)?;
        let terms = LoanTerms::new(amount, periodic_rate, request.term_months, payment)?;

        let total_loan_cost = payment * Decimal::from(request.term_months);
        let total_interest_paid = total_loan_cost - amount;

        Ok(Self {
            id,
            name: request.name,
            vehicle_price: request.vehicle_price,
            down_payment: request.down_payment,
            monthly_rate_percent: request.monthly_rate_percent,
            terms,
            total_interest_paid,
            total_loan_cost,
            created_at: Utc::now(),
        })
    }

    /// The theoretical amortization table for this simulation.
    pub fn schedule(&self) -> AmortizationSchedule {
        amortization::generate(&self.terms)
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vehicle_price(&self) -> Decimal {
        self.vehicle_price
    }

    pub fn down_payment(&self) -> Decimal {
        self.down_payment
    }

    pub fn monthly_rate_percent(&self) -> Decimal {
        self.monthly_rate_percent
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// Interest over the whole nominal schedule: total cost minus the
    /// financed amount.
    pub fn total_interest_paid(&self) -> Decimal {
        self.total_interest_paid
    }

    /// Nominal payment times the term.
    pub fn total_loan_cost(&self) -> Decimal {
        self.total_loan_cost
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> SimulationRequest {
        SimulationRequest {
            name: "family car".into(),
            vehicle_price: dec!(62_000_000),
            down_payment: dec!(12_000_000),
            monthly_rate_percent: dec!(1.8),
            term_months: 72,
        }
    }

    #[test]
    fn test_from_request_derives_terms() {
        let simulation = Simulation::from_request(request()).unwrap();
        assert_eq!(simulation.terms().principal(), dec!(50_000_000));
        assert_eq!(simulation.terms().periodic_rate(), dec!(0.018));
        assert_eq!(simulation.terms().term_periods(), 72);
        assert!(simulation.terms().periodic_payment() > dec!(900_000));
    }

    #[test]
    fn test_totals() {
        let simulation = Simulation::from_request(request()).unwrap();
        let payment = simulation.terms().periodic_payment();
        assert_eq!(simulation.total_loan_cost(), payment * dec!(72));
        assert_eq!(
            simulation.total_interest_paid(),
            simulation.total_loan_cost() - dec!(50_000_000)
        );
    }

    #[test]
    fn test_down_payment_covering_price_rejected() {
        let mut req = request();
        req.down_payment = dec!(70_000_000);
        let result = Simulation::from_request(req);
        assert!(matches!(result, Err(LoanError::NothingToFinance { .. })));
    }

    #[test]
    fn test_exact_down_payment_rejected() {
        let mut req = request();
        req.down_payment = req.vehicle_price;
        assert!(Simulation::from_request(req).is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut req = request();
        req.monthly_rate_percent = dec!(-1);
        assert!(matches!(
            Simulation::from_request(req),
            Err(LoanError::NegativeRate(_))
        ));
    }

    #[test]
    fn test_zero_rate_allowed() {
        let mut req = request();
        req.monthly_rate_percent = Decimal::ZERO;
        let simulation = Simulation::from_request(req).unwrap();
        assert_eq!(simulation.total_interest_paid(), Decimal::ZERO);
    }

    #[test]
    fn test_schedule_matches_terms() {
        let simulation = Simulation::from_request(request()).unwrap();
        let schedule = simulation.schedule();
        assert_eq!(schedule.len(), 72);
        assert_eq!(schedule.rows()[0].interest_component, dec!(900_000));
    }

    #[test]
    fn test_with_id_is_stable() {
        let id = Uuid::nil();
        let simulation = Simulation::with_id(id, request()).unwrap();
        assert_eq!(simulation.id(), id);
    }
}
