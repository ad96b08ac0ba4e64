//! Ledger errors

use crate::transaction::TransactionStatus;
use gruha_core::{TokenAmount, TokenType};
use thiserror::Error;

/// Errors that can occur in ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Wallet not found for MSME {0}")]
    WalletNotFound(String),

    #[error("Insufficient {token_type} balance for {msme_id}: required {required}, available {available}")]
    InsufficientBalance {
        msme_id: String,
        token_type: TokenType,
        required: TokenAmount,
        available: TokenAmount,
    },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Transaction {id} is not flagged (status: {status})")]
    NotFlagged {
        id: String,
        status: TransactionStatus,
    },

    #[error("Balance overflow for MSME {0}")]
    BalanceOverflow(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}
