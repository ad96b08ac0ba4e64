//! In-memory wallet store
//!
//! The default backend for tests and single-process deployments. One
//! `RwLock` guards all maps, so every composite operation is a single
//! critical section: two spends racing on the same wallet serialize at
//! the lock, and the sufficiency check and the debit can never be
//! interleaved.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::info;

use gruha_core::{TokenAmount, TokenType};

use crate::allocation::TokenAllocation;
use crate::balance::WalletBalance;
use crate::error::LedgerError;
use crate::store::WalletStore;
use crate::transaction::{TransactionStatus, WalletTransaction};

#[derive(Debug, Default)]
struct Inner {
    wallets: HashMap<String, WalletBalance>,
    allocations: HashMap<String, TokenAllocation>,
    allocations_by_msme: HashMap<String, Vec<String>>,
    transactions: HashMap<String, WalletTransaction>,
    transactions_by_msme: HashMap<String, Vec<String>>,
}

impl Inner {
    fn insert_transaction(&mut self, txn: WalletTransaction) {
        self.transactions_by_msme
            .entry(txn.msme_id.clone())
            .or_default()
            .push(txn.id.clone());
        self.transactions.insert(txn.id.clone(), txn);
    }
}

/// In-memory wallet store backed by a single RwLock
#[derive(Debug, Default)]
pub struct MemoryWalletStore {
    inner: RwLock<Inner>,
}

impl MemoryWalletStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryWalletStore {
    fn get_or_create_balance(&self, msme_id: &str) -> Result<WalletBalance, LedgerError> {
        let mut inner = self.inner.write().unwrap();
        let wallet = inner
            .wallets
            .entry(msme_id.to_string())
            .or_insert_with(|| WalletBalance::new(msme_id));
        Ok(wallet.clone())
    }

    fn get_balance(&self, msme_id: &str) -> Result<Option<WalletBalance>, LedgerError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.wallets.get(msme_id).cloned())
    }

    fn set_wallet_address(
        &self,
        msme_id: &str,
        address: &str,
    ) -> Result<WalletBalance, LedgerError> {
        let mut inner = self.inner.write().unwrap();
        let wallet = inner
            .wallets
            .entry(msme_id.to_string())
            .or_insert_with(|| WalletBalance::new(msme_id));
        wallet.wallet_address = Some(address.to_string());
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    fn credit_tokens(
        &self,
        msme_id: &str,
        token_type: TokenType,
        amount: TokenAmount,
    ) -> Result<WalletBalance, LedgerError> {
        let mut inner = self.inner.write().unwrap();
        let wallet = inner
            .wallets
            .entry(msme_id.to_string())
            .or_insert_with(|| WalletBalance::new(msme_id));
        wallet.credit(token_type, amount)?;
        info!(msme_id, %token_type, %amount, "credited tokens");
        Ok(wallet.clone())
    }

    fn create_allocation(
        &self,
        allocation: TokenAllocation,
    ) -> Result<TokenAllocation, LedgerError> {
        let mut inner = self.inner.write().unwrap();

        let wallet = inner
            .wallets
            .entry(allocation.msme_id.clone())
            .or_insert_with(|| WalletBalance::new(&allocation.msme_id));
        wallet.credit(allocation.token_type, allocation.amount)?;

        inner
            .allocations_by_msme
            .entry(allocation.msme_id.clone())
            .or_default()
            .push(allocation.id.clone());
        inner
            .allocations
            .insert(allocation.id.clone(), allocation.clone());

        info!(
            allocation_id = %allocation.id,
            msme_id = %allocation.msme_id,
            "allocation created"
        );
        Ok(allocation)
    }

    fn find_active_allocations(
        &self,
        msme_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<TokenAllocation>, LedgerError> {
        let inner = self.inner.read().unwrap();
        let ids = inner
            .allocations_by_msme
            .get(msme_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| inner.allocations.get(id))
            .filter(|a| a.is_active(now))
            .cloned()
            .collect())
    }

    fn find_allocations_by_disaster(
        &self,
        disaster_id: &str,
    ) -> Result<Vec<TokenAllocation>, LedgerError> {
        let inner = self.inner.read().unwrap();
        let mut found: Vec<TokenAllocation> = inner
            .allocations
            .values()
            .filter(|a| a.disaster_id == disaster_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.allocated_at.cmp(&b.allocated_at));
        Ok(found)
    }

    fn record_flagged(&self, txn: WalletTransaction) -> Result<WalletTransaction, LedgerError> {
        let mut inner = self.inner.write().unwrap();
        let mut txn = txn;
        txn.status = TransactionStatus::Flagged;
        inner.insert_transaction(txn.clone());
        info!(txn_id = %txn.id, msme_id = %txn.msme_id, "transaction flagged for review");
        Ok(txn)
    }

    fn commit_spend(&self, txn: WalletTransaction) -> Result<WalletTransaction, LedgerError> {
        let mut inner = self.inner.write().unwrap();

        // Re-validate under the lock; the caller's earlier check may be stale.
        let wallet = inner
            .wallets
            .get_mut(&txn.msme_id)
            .ok_or_else(|| LedgerError::WalletNotFound(txn.msme_id.clone()))?;
        wallet.debit(txn.token_type, txn.amount)?;

        let mut txn = txn;
        txn.status = TransactionStatus::Completed;
        txn.completed_at = Some(Utc::now());
        inner.insert_transaction(txn.clone());

        info!(txn_id = %txn.id, msme_id = %txn.msme_id, amount = %txn.amount, "spend committed");
        Ok(txn)
    }

    fn resolve_flagged(
        &self,
        txn_id: &str,
        approve: bool,
    ) -> Result<WalletTransaction, LedgerError> {
        let mut inner = self.inner.write().unwrap();

        let current = inner
            .transactions
            .get(txn_id)
            .ok_or_else(|| LedgerError::TransactionNotFound(txn_id.to_string()))?
            .clone();

        if current.status != TransactionStatus::Flagged {
            return Err(LedgerError::NotFlagged {
                id: txn_id.to_string(),
                status: current.status,
            });
        }

        if approve {
            let wallet = inner
                .wallets
                .get_mut(&current.msme_id)
                .ok_or_else(|| LedgerError::WalletNotFound(current.msme_id.clone()))?;
            // On insufficient balance the transaction stays flagged.
            wallet.debit(current.token_type, current.amount)?;
        }

        let txn = inner.transactions.get_mut(txn_id).unwrap();
        txn.status = if approve {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        };
        txn.completed_at = Some(Utc::now());

        info!(txn_id, approve, "flagged transaction resolved");
        Ok(txn.clone())
    }

    fn find_transaction(&self, txn_id: &str) -> Result<Option<WalletTransaction>, LedgerError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.transactions.get(txn_id).cloned())
    }

    fn recent_transactions(
        &self,
        msme_id: &str,
        limit: usize,
    ) -> Result<Vec<WalletTransaction>, LedgerError> {
        let inner = self.inner.read().unwrap();
        let ids = inner
            .transactions_by_msme
            .get(msme_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        // Insertion order is chronological; take the tail and reverse
        // for most-recent-first.
        Ok(ids
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| inner.transactions.get(id))
            .cloned()
            .collect())
    }

    fn find_flagged(&self) -> Result<Vec<WalletTransaction>, LedgerError> {
        let inner = self.inner.read().unwrap();
        let mut flagged: Vec<WalletTransaction> = inner
            .transactions
            .values()
            .filter(|t| t.status == TransactionStatus::Flagged)
            .cloned()
            .collect();
        flagged.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(flagged)
    }

    fn attach_chain_hash(
        &self,
        txn_id: &str,
        hash: &str,
    ) -> Result<WalletTransaction, LedgerError> {
        let mut inner = self.inner.write().unwrap();
        let txn = inner
            .transactions
            .get_mut(txn_id)
            .ok_or_else(|| LedgerError::TransactionNotFound(txn_id.to_string()))?;
        txn.chain_tx_hash = Some(hash.to_string());
        Ok(txn.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gruha_core::SpendingCategory;

    fn allocation(msme: &str, amount: u64, days: i64) -> TokenAllocation {
        TokenAllocation::new(
            msme,
            "disaster_1",
            TokenType::ResilienceCredit,
            TokenAmount::from(amount),
            Utc::now() + Duration::days(days),
            vec![SpendingCategory::Storage],
            "authority_1",
        )
    }

    fn pending_txn(msme: &str, vendor: &str, amount: u64) -> WalletTransaction {
        WalletTransaction::new(
            msme,
            vendor,
            TokenType::ResilienceCredit,
            SpendingCategory::Storage,
            TokenAmount::from(amount),
            None,
            0,
            vec![],
            TransactionStatus::Pending,
        )
    }

    #[test]
    fn test_get_or_create_is_lazy_and_idempotent() {
        let store = MemoryWalletStore::new();
        assert!(store.get_balance("msme_1").unwrap().is_none());

        let wallet = store.get_or_create_balance("msme_1").unwrap();
        assert!(wallet.total_balance.is_zero());

        let again = store.get_or_create_balance("msme_1").unwrap();
        assert_eq!(wallet.msme_id, again.msme_id);
    }

    #[test]
    fn test_create_allocation_credits_wallet() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 10_000, 30)).unwrap();

        let wallet = store.get_balance("msme_1").unwrap().unwrap();
        assert_eq!(wallet.resilience_credits, TokenAmount::from(10_000));
        assert_eq!(wallet.total_balance, TokenAmount::from(10_000));
    }

    #[test]
    fn test_active_allocations_exclude_expired() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 1_000, 30)).unwrap();
        store.create_allocation(allocation("msme_1", 2_000, -1)).unwrap();

        let active = store.find_active_allocations("msme_1", Utc::now()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].amount, TokenAmount::from(1_000));
    }

    #[test]
    fn test_commit_spend_debits_and_completes() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 10_000, 30)).unwrap();

        let txn = store.commit_spend(pending_txn("msme_1", "v1", 2_500)).unwrap();
        assert_eq!(txn.status, TransactionStatus::Completed);
        assert!(txn.completed_at.is_some());

        let wallet = store.get_balance("msme_1").unwrap().unwrap();
        assert_eq!(wallet.resilience_credits, TokenAmount::from(7_500));
    }

    #[test]
    fn test_commit_spend_insufficient_persists_nothing() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 1_000, 30)).unwrap();

        let txn = pending_txn("msme_1", "v1", 5_000);
        let id = txn.id.clone();
        let result = store.commit_spend(txn);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert!(store.find_transaction(&id).unwrap().is_none());

        let wallet = store.get_balance("msme_1").unwrap().unwrap();
        assert_eq!(wallet.resilience_credits, TokenAmount::from(1_000));
    }

    #[test]
    fn test_commit_spend_unknown_wallet() {
        let store = MemoryWalletStore::new();
        let result = store.commit_spend(pending_txn("ghost", "v1", 100));
        assert!(matches!(result, Err(LedgerError::WalletNotFound(_))));
    }

    #[test]
    fn test_resolve_flagged_approve_debits_once() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 10_000, 30)).unwrap();

        let flagged = store.record_flagged(pending_txn("msme_1", "v1", 4_000)).unwrap();
        assert_eq!(flagged.status, TransactionStatus::Flagged);

        // Flagging does not debit.
        let wallet = store.get_balance("msme_1").unwrap().unwrap();
        assert_eq!(wallet.resilience_credits, TokenAmount::from(10_000));

        let resolved = store.resolve_flagged(&flagged.id, true).unwrap();
        assert_eq!(resolved.status, TransactionStatus::Completed);

        let wallet = store.get_balance("msme_1").unwrap().unwrap();
        assert_eq!(wallet.resilience_credits, TokenAmount::from(6_000));

        // Second approval must fail and not debit again.
        let again = store.resolve_flagged(&flagged.id, true);
        assert!(matches!(again, Err(LedgerError::NotFlagged { .. })));
        let wallet = store.get_balance("msme_1").unwrap().unwrap();
        assert_eq!(wallet.resilience_credits, TokenAmount::from(6_000));
    }

    #[test]
    fn test_resolve_flagged_reject_no_debit() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 10_000, 30)).unwrap();

        let flagged = store.record_flagged(pending_txn("msme_1", "v1", 4_000)).unwrap();
        let resolved = store.resolve_flagged(&flagged.id, false).unwrap();
        assert_eq!(resolved.status, TransactionStatus::Failed);

        let wallet = store.get_balance("msme_1").unwrap().unwrap();
        assert_eq!(wallet.resilience_credits, TokenAmount::from(10_000));
    }

    #[test]
    fn test_resolve_flagged_approve_insufficient_stays_flagged() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 5_000, 30)).unwrap();

        let flagged = store.record_flagged(pending_txn("msme_1", "v1", 4_000)).unwrap();
        // Drain the wallet before the authority approves.
        store.commit_spend(pending_txn("msme_1", "v2", 3_000)).unwrap();

        let result = store.resolve_flagged(&flagged.id, true);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));

        let txn = store.find_transaction(&flagged.id).unwrap().unwrap();
        assert_eq!(txn.status, TransactionStatus::Flagged);
    }

    #[test]
    fn test_recent_transactions_most_recent_first() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 10_000, 30)).unwrap();

        let first = store.commit_spend(pending_txn("msme_1", "v1", 100)).unwrap();
        let second = store.commit_spend(pending_txn("msme_1", "v2", 200)).unwrap();
        let third = store.commit_spend(pending_txn("msme_1", "v3", 300)).unwrap();

        let recent = store.recent_transactions("msme_1", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, third.id);
        assert_eq!(recent[1].id, second.id);

        let all = store.recent_transactions("msme_1", 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].id, first.id);
    }

    #[test]
    fn test_attach_chain_hash() {
        let store = MemoryWalletStore::new();
        store.create_allocation(allocation("msme_1", 1_000, 30)).unwrap();
        let txn = store.commit_spend(pending_txn("msme_1", "v1", 100)).unwrap();

        let updated = store.attach_chain_hash(&txn.id, "0xabc123").unwrap();
        assert_eq!(updated.chain_tx_hash.as_deref(), Some("0xabc123"));
    }

    #[test]
    fn test_concurrent_spends_never_overdraw() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryWalletStore::new());
        store.create_allocation(allocation("msme_1", 5_000, 30)).unwrap();

        // 10 threads each try to spend 1,000 from a 5,000 balance.
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.commit_spend(pending_txn("msme_1", &format!("v{i}"), 1_000))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let completed = results.iter().filter(|r| r.is_ok()).count();
        let insufficient = results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::InsufficientBalance { .. })))
            .count();

        assert_eq!(completed, 5);
        assert_eq!(insufficient, 5);

        let wallet = store.get_balance("msme_1").unwrap().unwrap();
        assert!(wallet.resilience_credits.is_zero());
        assert!(wallet.total_balance.is_zero());
    }
}
