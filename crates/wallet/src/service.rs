//! WalletService - the spend orchestrator and allocation gateway
//!
//! Spend pipeline gates, in order: amount validation, category policy,
//! wallet existence, advisory sufficiency, fraud screening. Only then
//! does the ledger commit (which re-validates sufficiency inside its
//! own critical section). Blocked attempts leave no transaction behind;
//! flagged ones wait, undebited, for an authority decision.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use gruha_core::{policy, TokenAmount};
use gruha_fraud::{FraudAction, FraudEngine, SpendProfile};
use gruha_ledger::{TokenAllocation, TransactionStatus, WalletStore, WalletTransaction};

use crate::error::WalletError;
use crate::view::{
    AllocateRequest, AllocationReceipt, AllocationView, BalanceView, DisasterSummary,
    SpendReceipt, SpendRequest, TransactionView,
};

/// Default page size for transaction history queries
const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Longest validity an authority may grant, in days
const MAX_VALIDITY_DAYS: i64 = 365;

pub struct WalletService {
    store: Arc<dyn WalletStore>,
    fraud: FraudEngine,
}

impl WalletService {
    pub fn new(store: Arc<dyn WalletStore>, fraud: FraudEngine) -> Self {
        Self { store, fraud }
    }

    // === Allocation gateway ===

    /// Grant tokens to an MSME on behalf of an allocation authority.
    ///
    /// The credit is unconditional once the request validates;
    /// authorities are trusted to have done their own vetting.
    pub fn allocate(&self, req: AllocateRequest) -> Result<AllocationReceipt, WalletError> {
        if req.amount.is_zero() {
            return Err(WalletError::Validation(
                "allocation amount must be positive".to_string(),
            ));
        }
        if req.validity_days < 1 || req.validity_days > MAX_VALIDITY_DAYS {
            return Err(WalletError::Validation(format!(
                "validity must be between 1 and {MAX_VALIDITY_DAYS} days, got {}",
                req.validity_days
            )));
        }
        if req.categories.is_empty() {
            return Err(WalletError::Validation(
                "at least one spending category is required".to_string(),
            ));
        }
        let invalid = policy::invalid_categories(req.token_type, &req.categories);
        if !invalid.is_empty() {
            return Err(WalletError::InvalidCategories {
                token_type: req.token_type,
                invalid,
                allowed: policy::allowed_categories(req.token_type).to_vec(),
            });
        }

        let valid_until = Utc::now() + Duration::days(req.validity_days);
        let allocation = TokenAllocation::new(
            &req.msme_id,
            &req.disaster_id,
            req.token_type,
            req.amount,
            valid_until,
            req.categories,
            &req.allocated_by,
        );

        let allocation = self.store.create_allocation(allocation)?;
        info!(
            allocation_id = %allocation.id,
            msme_id = %allocation.msme_id,
            disaster_id = %allocation.disaster_id,
            token_type = %allocation.token_type,
            amount = %allocation.amount,
            "tokens allocated"
        );

        let balance = self.store.get_or_create_balance(&allocation.msme_id)?;
        Ok(AllocationReceipt {
            allocation: AllocationView::from(&allocation),
            balance: BalanceView::new(&balance, &[]),
        })
    }

    // === Spend pipeline ===

    /// Pay a vendor from an MSME wallet, subject to the gates.
    pub fn spend(&self, req: SpendRequest) -> Result<SpendReceipt, WalletError> {
        if req.amount.is_zero() {
            return Err(WalletError::Validation(
                "spend amount must be positive".to_string(),
            ));
        }

        if !policy::is_category_allowed(req.token_type, req.category) {
            return Err(WalletError::CategoryNotAllowed {
                token_type: req.token_type,
                category: req.category,
                allowed: policy::allowed_categories(req.token_type).to_vec(),
            });
        }

        let balance = self
            .store
            .get_balance(&req.msme_id)?
            .ok_or_else(|| WalletError::WalletNotFound(req.msme_id.clone()))?;

        // Advisory: the commit re-checks under its own lock.
        let available = balance.balance_for(req.token_type);
        if available < req.amount {
            return Err(WalletError::InsufficientBalance {
                token_type: req.token_type,
                required: req.amount,
                available,
            });
        }

        let history = self
            .store
            .recent_transactions(&req.msme_id, self.fraud.config().history_depth)?;
        let profile = SpendProfile {
            msme_id: req.msme_id.clone(),
            vendor_id: req.vendor_id.clone(),
            amount: req.amount,
            category: req.category,
            token_type: req.token_type,
        };
        let check = self.fraud.evaluate(&profile, &history, Utc::now());

        if check.action == FraudAction::Block {
            warn!(
                msme_id = %req.msme_id,
                vendor_id = %req.vendor_id,
                amount = %req.amount,
                score = check.score,
                flags = ?check.flag_names(),
                "spend blocked by fraud screening"
            );
            return Err(WalletError::TransactionBlocked {
                score: check.score,
                flags: check.flag_names(),
            });
        }

        let txn = WalletTransaction::new(
            &req.msme_id,
            &req.vendor_id,
            req.token_type,
            req.category,
            req.amount,
            req.booking_id,
            check.score,
            check.flag_names(),
            TransactionStatus::Pending,
        );

        let txn = if check.action == FraudAction::Flag {
            self.store.record_flagged(txn)?
        } else {
            self.store.commit_spend(txn)?
        };

        self.receipt(txn)
    }

    // === Flagged review ===

    /// Authority approval: debit the wallet and complete the
    /// transaction. Fails with `NOT_FLAGGED` if already resolved, and
    /// with `INSUFFICIENT_BALANCE` (staying flagged) if the wallet has
    /// since been drained.
    pub fn approve_flagged(&self, txn_id: &str) -> Result<SpendReceipt, WalletError> {
        let txn = self.store.resolve_flagged(txn_id, true)?;
        info!(txn_id, "flagged transaction approved");
        self.receipt(txn)
    }

    /// Authority rejection: mark the transaction failed, no debit.
    pub fn reject_flagged(&self, txn_id: &str) -> Result<SpendReceipt, WalletError> {
        let txn = self.store.resolve_flagged(txn_id, false)?;
        info!(txn_id, "flagged transaction rejected");
        self.receipt(txn)
    }

    // === Queries ===

    /// Wallet balance plus currently active allocations. Creates the
    /// wallet lazily if the MSME has none yet.
    pub fn balance(&self, msme_id: &str) -> Result<BalanceView, WalletError> {
        let balance = self.store.get_or_create_balance(msme_id)?;
        let allocations = self.store.find_active_allocations(msme_id, Utc::now())?;
        Ok(BalanceView::new(&balance, &allocations))
    }

    /// The MSME's transaction history, most recent first.
    pub fn transactions(
        &self,
        msme_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionView>, WalletError> {
        let txns = self
            .store
            .recent_transactions(msme_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))?;
        Ok(txns.iter().map(TransactionView::from).collect())
    }

    /// All transactions awaiting authority review.
    pub fn flagged(&self) -> Result<Vec<TransactionView>, WalletError> {
        let txns = self.store.find_flagged()?;
        Ok(txns.iter().map(TransactionView::from).collect())
    }

    /// Aggregate allocation figures for one disaster.
    pub fn disaster_summary(&self, disaster_id: &str) -> Result<DisasterSummary, WalletError> {
        let allocations = self.store.find_allocations_by_disaster(disaster_id)?;

        let mut total_allocated = TokenAmount::ZERO;
        let mut total_remaining = TokenAmount::ZERO;
        for a in &allocations {
            total_allocated = total_allocated
                .checked_add(&a.amount)
                .ok_or_else(|| WalletError::Storage("allocation total overflow".to_string()))?;
            total_remaining = total_remaining
                .checked_add(&a.remaining_amount)
                .ok_or_else(|| WalletError::Storage("allocation total overflow".to_string()))?;
        }
        let total_spent = total_allocated
            .checked_sub(&total_remaining)
            .unwrap_or(TokenAmount::ZERO);

        Ok(DisasterSummary {
            disaster_id: disaster_id.to_string(),
            total_allocations: allocations.len(),
            total_allocated,
            total_remaining,
            total_spent,
            allocations: allocations.iter().map(AllocationView::from).collect(),
        })
    }

    /// Bind an external chain address to the MSME's wallet.
    pub fn register_wallet_address(
        &self,
        msme_id: &str,
        address: &str,
    ) -> Result<BalanceView, WalletError> {
        let balance = self.store.set_wallet_address(msme_id, address)?;
        info!(msme_id, address, "wallet address bound");
        let allocations = self.store.find_active_allocations(msme_id, Utc::now())?;
        Ok(BalanceView::new(&balance, &allocations))
    }

    fn receipt(&self, txn: WalletTransaction) -> Result<SpendReceipt, WalletError> {
        let balance = self.store.get_or_create_balance(&txn.msme_id)?;
        Ok(SpendReceipt {
            fraud_score: txn.fraud_score,
            fraud_flags: txn.fraud_flags.clone(),
            transaction: TransactionView::from(&txn),
            balance: BalanceView::new(&balance, &[]),
        })
    }
}
