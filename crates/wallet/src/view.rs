//! Request and response DTOs
//!
//! The external interface. Amounts cross the boundary as strings
//! (`TokenAmount` serde), token types and categories as their
//! SCREAMING_SNAKE wire labels, field names in camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gruha_core::{SpendingCategory, TokenAmount, TokenType};
use gruha_ledger::{TokenAllocation, TransactionStatus, WalletBalance, WalletTransaction};

/// Authority request to grant tokens to an MSME
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    pub msme_id: String,
    pub disaster_id: String,
    pub token_type: TokenType,
    pub amount: TokenAmount,
    /// Days until the allocation expires (1..=365)
    pub validity_days: i64,
    pub categories: Vec<SpendingCategory>,
    pub allocated_by: String,
}

/// MSME request to pay a vendor from the wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRequest {
    pub msme_id: String,
    pub vendor_id: String,
    pub token_type: TokenType,
    pub category: SpendingCategory,
    pub amount: TokenAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
}

/// One allocation, as reported to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationView {
    pub id: String,
    pub msme_id: String,
    pub disaster_id: String,
    pub token_type: TokenType,
    pub amount: TokenAmount,
    pub remaining_amount: TokenAmount,
    pub valid_until: DateTime<Utc>,
    pub categories: Vec<SpendingCategory>,
    pub allocated_by: String,
    pub allocated_at: DateTime<Utc>,
}

impl From<&TokenAllocation> for AllocationView {
    fn from(a: &TokenAllocation) -> Self {
        Self {
            id: a.id.clone(),
            msme_id: a.msme_id.clone(),
            disaster_id: a.disaster_id.clone(),
            token_type: a.token_type,
            amount: a.amount,
            remaining_amount: a.remaining_amount,
            valid_until: a.valid_until,
            categories: a.categories.clone(),
            allocated_by: a.allocated_by.clone(),
            allocated_at: a.allocated_at,
        }
    }
}

/// Wallet balance plus the allocations still spendable from it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub msme_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub resilience_credits: TokenAmount,
    pub relief_tokens: TokenAmount,
    pub total_balance: TokenAmount,
    pub updated_at: DateTime<Utc>,
    pub active_allocations: Vec<AllocationView>,
}

impl BalanceView {
    pub fn new(balance: &WalletBalance, allocations: &[TokenAllocation]) -> Self {
        Self {
            msme_id: balance.msme_id.clone(),
            wallet_address: balance.wallet_address.clone(),
            resilience_credits: balance.resilience_credits,
            relief_tokens: balance.relief_tokens,
            total_balance: balance.total_balance,
            updated_at: balance.updated_at,
            active_allocations: allocations.iter().map(AllocationView::from).collect(),
        }
    }
}

/// One transaction, as reported to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: String,
    pub msme_id: String,
    pub vendor_id: String,
    pub token_type: TokenType,
    pub category: SpendingCategory,
    pub amount: TokenAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_tx_hash: Option<String>,
    pub fraud_score: u32,
    pub fraud_flags: Vec<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&WalletTransaction> for TransactionView {
    fn from(t: &WalletTransaction) -> Self {
        Self {
            id: t.id.clone(),
            msme_id: t.msme_id.clone(),
            vendor_id: t.vendor_id.clone(),
            token_type: t.token_type,
            category: t.category,
            amount: t.amount,
            booking_id: t.booking_id.clone(),
            chain_tx_hash: t.chain_tx_hash.clone(),
            fraud_score: t.fraud_score,
            fraud_flags: t.fraud_flags.clone(),
            status: t.status,
            created_at: t.created_at,
            completed_at: t.completed_at,
        }
    }
}

/// Result of a successful allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationReceipt {
    pub allocation: AllocationView,
    pub balance: BalanceView,
}

/// Result of a spend that was not blocked
///
/// `status` is `completed` when the debit went through, `flagged` when
/// the transaction awaits authority review (no debit yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendReceipt {
    pub transaction: TransactionView,
    pub fraud_score: u32,
    pub fraud_flags: Vec<String>,
    pub balance: BalanceView,
}

/// Authority aggregate view over one disaster's allocations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterSummary {
    pub disaster_id: String,
    pub total_allocations: usize,
    pub total_allocated: TokenAmount,
    pub total_remaining: TokenAmount,
    pub total_spent: TokenAmount,
    pub allocations: Vec<AllocationView>,
}
