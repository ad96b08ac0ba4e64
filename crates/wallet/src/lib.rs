//! GRUHA Wallet Service - spend orchestration
//!
//! Ties the pieces together: category policy gate, fraud screening,
//! and the ledger store. Allocation authorities credit wallets through
//! the gateway here; MSMEs spend through the gated pipeline; flagged
//! transactions are resolved by authority review.

pub mod error;
pub mod service;
pub mod view;

pub use error::WalletError;
pub use service::WalletService;
pub use view::{
    AllocateRequest, AllocationReceipt, AllocationView, BalanceView, DisasterSummary,
    SpendReceipt, SpendRequest, TransactionView,
};
