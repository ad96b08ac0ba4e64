//! Wallet service error taxonomy
//!
//! Every rejection carries a stable machine-readable code plus the
//! self-correction payload clients need (the allowed categories, the
//! required vs available amounts), so callers can fix the request
//! without guessing.

use gruha_core::{SpendingCategory, TokenAmount, TokenType};
use gruha_ledger::{LedgerError, TransactionStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid categories for {token_type}: {invalid:?} (allowed: {allowed:?})")]
    InvalidCategories {
        token_type: TokenType,
        invalid: Vec<SpendingCategory>,
        allowed: Vec<SpendingCategory>,
    },

    #[error("{token_type} cannot be spent on {category} (allowed: {allowed:?})")]
    CategoryNotAllowed {
        token_type: TokenType,
        category: SpendingCategory,
        allowed: Vec<SpendingCategory>,
    },

    #[error("wallet not found for MSME {0}")]
    WalletNotFound(String),

    #[error("insufficient {token_type} balance: required {required}, available {available}")]
    InsufficientBalance {
        token_type: TokenType,
        required: TokenAmount,
        available: TokenAmount,
    },

    #[error("transaction blocked by fraud screening (score {score}): {flags:?}")]
    TransactionBlocked { score: u32, flags: Vec<String> },

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("transaction {id} is not flagged (status: {status})")]
    NotFlagged {
        id: String,
        status: TransactionStatus,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

impl WalletError {
    /// Stable error code for the external interface.
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::Validation(_) => "VALIDATION_ERROR",
            WalletError::InvalidCategories { .. } => "INVALID_CATEGORIES",
            WalletError::CategoryNotAllowed { .. } => "CATEGORY_NOT_ALLOWED",
            WalletError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            WalletError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            WalletError::TransactionBlocked { .. } => "TRANSACTION_BLOCKED",
            WalletError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            WalletError::NotFlagged { .. } => "NOT_FLAGGED",
            WalletError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<LedgerError> for WalletError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::WalletNotFound(msme_id) => WalletError::WalletNotFound(msme_id),
            LedgerError::InsufficientBalance {
                token_type,
                required,
                available,
                ..
            } => WalletError::InsufficientBalance {
                token_type,
                required,
                available,
            },
            LedgerError::TransactionNotFound(id) => WalletError::TransactionNotFound(id),
            LedgerError::NotFlagged { id, status } => WalletError::NotFlagged { id, status },
            LedgerError::BalanceOverflow(msme_id) => {
                WalletError::Storage(format!("balance overflow for MSME {msme_id}"))
            }
            LedgerError::Storage(msg) => WalletError::Storage(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            WalletError::Validation("amount must be positive".into()).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            WalletError::CategoryNotAllowed {
                token_type: TokenType::ResilienceCredit,
                category: SpendingCategory::Repairs,
                allowed: vec![SpendingCategory::Storage, SpendingCategory::Transport],
            }
            .code(),
            "CATEGORY_NOT_ALLOWED"
        );
        assert_eq!(
            WalletError::TransactionBlocked {
                score: 60,
                flags: vec![]
            }
            .code(),
            "TRANSACTION_BLOCKED"
        );
        assert_eq!(
            WalletError::NotFlagged {
                id: "TXN-1".into(),
                status: TransactionStatus::Completed,
            }
            .code(),
            "NOT_FLAGGED"
        );
    }

    #[test]
    fn test_ledger_error_mapping() {
        let err: WalletError = LedgerError::InsufficientBalance {
            msme_id: "msme_1".into(),
            token_type: TokenType::ReliefToken,
            required: TokenAmount::from(500),
            available: TokenAmount::from(100),
        }
        .into();
        assert_eq!(err.code(), "INSUFFICIENT_BALANCE");

        let err: WalletError = LedgerError::WalletNotFound("msme_1".into()).into();
        assert_eq!(err.code(), "WALLET_NOT_FOUND");
    }
}
