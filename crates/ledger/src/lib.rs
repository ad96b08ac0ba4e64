//! GRUHA Ledger - The source of truth for token balances
//!
//! Tracks one `WalletBalance` per MSME, the allocation lifecycle
//! (creation, expiry-by-predicate), and the transaction log. All
//! mutation happens through the `WalletStore` trait so the per-MSME
//! atomicity of check-and-debit is owned by the backend: a single
//! critical section for the in-memory store, a database transaction
//! for the SQLite store.

pub mod allocation;
pub mod balance;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod transaction;

pub use allocation::TokenAllocation;
pub use balance::WalletBalance;
pub use error::LedgerError;
pub use memory::MemoryWalletStore;
pub use sqlite::SqliteWalletStore;
pub use store::WalletStore;
pub use transaction::{TransactionStatus, WalletTransaction};
