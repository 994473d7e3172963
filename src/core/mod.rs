//! Foundational types: loan terms, recorded payments, error taxonomy.

pub mod payment;
pub mod terms;
