//! GRUHA Fraud Heuristic - Pre-commit spend screening
//!
//! Scores every spend attempt against the MSME's recent transaction
//! history before the ledger is touched. Rules are additive; the total
//! score maps onto an ALLOW / FLAG / BLOCK ladder. This is a heuristic,
//! not a hard security boundary: false positives are expected and go to
//! the human review path.

pub mod config;
pub mod decision;
pub mod engine;

pub use config::FraudConfig;
pub use decision::{FraudAction, FraudCheck, FraudFlag};
pub use engine::{FraudEngine, SpendProfile};
