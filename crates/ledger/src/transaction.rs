//! Spend transaction records
//!
//! One record per spend attempt that passed fraud screening. The
//! status machine: pending -> completed (auto, on ALLOW), flagged ->
//! completed (authority approval, debits), flagged -> failed
//! (authority rejection, no debit). A wallet is debited iff the
//! transaction reaches `Completed`, exactly once.

use chrono::{DateTime, Utc};
use gruha_core::{SpendingCategory, TokenAmount, TokenType};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Status of a wallet transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    /// Created, debit not yet applied
    Pending,
    /// Debit applied; terminal
    Completed,
    /// Explicitly not debited; terminal
    Failed,
    /// Awaiting an authority decision; not yet debited
    Flagged,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Flagged => "flagged",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            "flagged" => Some(TransactionStatus::Flagged),
            _ => None,
        }
    }

    /// Completed and Failed admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Failed
        )
    }
}

/// One spend attempt by an MSME against a vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    /// Unique identifier (TXN-XXXXXXXX)
    pub id: String,

    /// Spending MSME
    pub msme_id: String,

    /// Receiving vendor
    pub vendor_id: String,

    /// Token type spent
    pub token_type: TokenType,

    /// Spending category of this payment
    pub category: SpendingCategory,

    /// Amount of the spend
    pub amount: TokenAmount,

    /// Correlation to an external booking, if any
    pub booking_id: Option<String>,

    /// On-chain transaction hash once mirrored, if any
    pub chain_tx_hash: Option<String>,

    /// Fraud heuristic score at spend time
    pub fraud_score: u32,

    /// Names of the heuristic rules that triggered
    pub fraud_flags: Vec<String>,

    /// Current status
    pub status: TransactionStatus,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Set when the transaction reaches a terminal status
    pub completed_at: Option<DateTime<Utc>>,
}

impl WalletTransaction {
    /// Create a new transaction record with a fresh id.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        msme_id: impl Into<String>,
        vendor_id: impl Into<String>,
        token_type: TokenType,
        category: SpendingCategory,
        amount: TokenAmount,
        booking_id: Option<String>,
        fraud_score: u32,
        fraud_flags: Vec<String>,
        status: TransactionStatus,
    ) -> Self {
        let id = format!(
            "TXN-{}",
            uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
        );

        Self {
            id,
            msme_id: msme_id.into(),
            vendor_id: vendor_id.into(),
            token_type,
            category,
            amount,
            booking_id,
            chain_tx_hash: None,
            fraud_score,
            fraud_flags,
            status,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}
