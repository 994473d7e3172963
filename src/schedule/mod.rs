//! Schedule generation: the annuity payment formula and the
//! period-by-period amortization table.

pub mod amortization;
pub mod annuity;
