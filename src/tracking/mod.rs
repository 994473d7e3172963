//! Balance reconciliation: replaying recorded payments against the
//! fixed-rate model to derive the live outstanding balance.

pub mod reconciler;
