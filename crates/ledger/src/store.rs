//! WalletStore - the injected storage seam
//!
//! The orchestrator never touches a map or a connection directly; it
//! goes through this trait. Composite operations (`create_allocation`,
//! `commit_spend`, `resolve_flagged`) are atomic per backend: the
//! balance check and the debit happen in one critical section, and
//! sufficiency is re-validated there regardless of any earlier
//! advisory check by the caller.

use crate::allocation::TokenAllocation;
use crate::balance::WalletBalance;
use crate::error::LedgerError;
use crate::transaction::WalletTransaction;
use chrono::{DateTime, Utc};
use gruha_core::{TokenAmount, TokenType};

/// Storage backend for wallets, allocations, and transactions.
///
/// Implementations must guarantee that no interleaving of the
/// mutating operations drives a sub-balance negative or debits a
/// transaction twice.
pub trait WalletStore: Send + Sync {
    /// Fetch the wallet for an MSME, creating an empty one if absent.
    fn get_or_create_balance(&self, msme_id: &str) -> Result<WalletBalance, LedgerError>;

    /// Fetch the wallet for an MSME, if it exists.
    fn get_balance(&self, msme_id: &str) -> Result<Option<WalletBalance>, LedgerError>;

    /// Bind an external chain address to an MSME's wallet.
    fn set_wallet_address(&self, msme_id: &str, address: &str)
        -> Result<WalletBalance, LedgerError>;

    /// Add tokens to the relevant sub-balance.
    fn credit_tokens(
        &self,
        msme_id: &str,
        token_type: TokenType,
        amount: TokenAmount,
    ) -> Result<WalletBalance, LedgerError>;

    /// Insert an allocation and credit the owning wallet by its amount,
    /// as one logical unit.
    fn create_allocation(
        &self,
        allocation: TokenAllocation,
    ) -> Result<TokenAllocation, LedgerError>;

    /// Allocations for an MSME that still have tokens and have not
    /// expired as of `now`. Expiry is evaluated here, lazily.
    fn find_active_allocations(
        &self,
        msme_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<TokenAllocation>, LedgerError>;

    /// All allocations tagged with a disaster, any state.
    fn find_allocations_by_disaster(
        &self,
        disaster_id: &str,
    ) -> Result<Vec<TokenAllocation>, LedgerError>;

    /// Insert a flagged transaction. No balance change.
    fn record_flagged(&self, txn: WalletTransaction) -> Result<WalletTransaction, LedgerError>;

    /// Debit the wallet and insert the transaction as completed, in one
    /// critical section. Sufficiency is re-validated here; on
    /// `InsufficientBalance` nothing is persisted.
    fn commit_spend(&self, txn: WalletTransaction) -> Result<WalletTransaction, LedgerError>;

    /// Resolve a flagged transaction. Requires current status
    /// `Flagged`, else `NotFlagged` (or `TransactionNotFound`).
    /// Approval debits the wallet and completes the transaction;
    /// rejection marks it failed with no debit. If an approval's debit
    /// would overdraw the wallet, the error is returned and the
    /// transaction stays flagged.
    fn resolve_flagged(
        &self,
        txn_id: &str,
        approve: bool,
    ) -> Result<WalletTransaction, LedgerError>;

    /// Fetch a transaction by id.
    fn find_transaction(&self, txn_id: &str) -> Result<Option<WalletTransaction>, LedgerError>;

    /// The MSME's most recent transactions (any status), most recent
    /// first, at most `limit`.
    fn recent_transactions(
        &self,
        msme_id: &str,
        limit: usize,
    ) -> Result<Vec<WalletTransaction>, LedgerError>;

    /// All transactions currently awaiting authority review.
    fn find_flagged(&self) -> Result<Vec<WalletTransaction>, LedgerError>;

    /// Attach the on-chain mirror hash to a transaction.
    fn attach_chain_hash(
        &self,
        txn_id: &str,
        hash: &str,
    ) -> Result<WalletTransaction, LedgerError>;
}
