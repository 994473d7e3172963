use crate::core::payment::{ActualPayment, PaymentHistory};
use crate::portfolio::simulation::Simulation;
use crate::tracking::reconciler::{self, BalanceReport};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors arising from portfolio operations.
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("unknown simulation {0}")]
    UnknownSimulation(Uuid),
    #[error("no active credit is set")]
    NoActiveCredit,
}

/// In-memory registry of saved simulations and their payment histories.
///
/// Each simulation exclusively owns its payments: removing the
/// simulation removes them too. At most one simulation is flagged as
/// the active credit at any time. The flag is a single field, so
/// switching the active credit is one atomic update with no observable
/// zero-active intermediate state.
///
/// Balances are never cached: [`Self::current_balance`] replays the
/// full payment history on every call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditPortfolio {
    simulations: HashMap<Uuid, Simulation>,
    payments: HashMap<Uuid, PaymentHistory>,
    active_credit: Option<Uuid>,
}

impl CreditPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a simulation. Saving an existing id replaces it.
    pub fn save(&mut self, simulation: Simulation) -> Uuid {
        let id = simulation.id();
        debug!("saving simulation {} ({})", id, simulation.name());
        self.simulations.insert(id, simulation);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Simulation> {
        self.simulations.get(&id)
    }

    /// All saved simulations, most recently created first.
    pub fn all(&self) -> Vec<&Simulation> {
        let mut all: Vec<&Simulation> = self.simulations.values().collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        all
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }

    /// Remove a simulation and, in cascade, every payment recorded
    /// against it. Clears the active flag if it pointed here.
    pub fn remove(&mut self, id: Uuid) -> Result<(), PortfolioError> {
        if self.simulations.remove(&id).is_none() {
            return Err(PortfolioError::UnknownSimulation(id));
        }
        self.payments.remove(&id);
        if self.active_credit == Some(id) {
            self.active_credit = None;
        }
        debug!("removed simulation {} and its payment history", id);
        Ok(())
    }

    /// Flag `id` as the active credit. One atomic update: the previous
    /// active credit is implicitly demoted.
    pub fn set_active_credit(&mut self, id: Uuid) -> Result<(), PortfolioError> {
        if !self.simulations.contains_key(&id) {
            return Err(PortfolioError::UnknownSimulation(id));
        }
        self.active_credit = Some(id);
        Ok(())
    }

    pub fn clear_active_credit(&mut self) {
        self.active_credit = None;
    }

    pub fn active_credit(&self) -> Option<&Simulation> {
        self.active_credit.and_then(|id| self.simulations.get(&id))
    }

    /// Record a payment against a saved simulation. Append-only:
    /// recorded payments are never edited or deleted.
    pub fn record_payment(
        &mut self,
        id: Uuid,
        payment: ActualPayment,
    ) -> Result<(), PortfolioError> {
        if !self.simulations.contains_key(&id) {
            return Err(PortfolioError::UnknownSimulation(id));
        }
        self.payments.entry(id).or_default().add(payment);
        Ok(())
    }

    /// Payments for a simulation, ascending by payment date.
    pub fn payments_for(&self, id: Uuid) -> Result<Vec<ActualPayment>, PortfolioError> {
        if !self.simulations.contains_key(&id) {
            return Err(PortfolioError::UnknownSimulation(id));
        }
        Ok(self
            .payments
            .get(&id)
            .map(|h| h.sorted_by_date())
            .unwrap_or_default())
    }

    /// Current outstanding balance, recomputed from scratch from the
    /// simulation's terms and its full payment history.
    pub fn current_balance(&self, id: Uuid) -> Result<Decimal, PortfolioError> {
        let simulation = self
            .simulations
            .get(&id)
            .ok_or(PortfolioError::UnknownSimulation(id))?;
        let ordered = self.payments_for(id)?;
        Ok(reconciler::current_balance(simulation.terms(), &ordered))
    }

    /// Full balance report for the active credit.
    pub fn active_balance_report(&self) -> Result<BalanceReport, PortfolioError> {
        let simulation = self.active_credit().ok_or(PortfolioError::NoActiveCredit)?;
        let history = self
            .payments
            .get(&simulation.id())
            .cloned()
            .unwrap_or_default();
        Ok(BalanceReport::from_history(simulation.terms(), &history))
    }
}
