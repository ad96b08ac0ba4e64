//! Wallet balance per MSME
//!
//! One record per MSME, created lazily on first access and never
//! deleted. The total is derived: `total_balance` always equals
//! `resilience_credits + relief_tokens`, and both components stay
//! non-negative via `TokenAmount`.

use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use gruha_core::{TokenAmount, TokenType};
use serde::{Deserialize, Serialize};

/// Local mirror of an MSME's on-chain token balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Owning MSME
    pub msme_id: String,

    /// External chain identity, if the MSME has bound one
    pub wallet_address: Option<String>,

    /// Pre-disaster token balance
    pub resilience_credits: TokenAmount,

    /// Post-disaster token balance
    pub relief_tokens: TokenAmount,

    /// Derived: resilience_credits + relief_tokens
    pub total_balance: TokenAmount,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl WalletBalance {
    /// Create an empty wallet for an MSME
    pub fn new(msme_id: impl Into<String>) -> Self {
        Self {
            msme_id: msme_id.into(),
            wallet_address: None,
            resilience_credits: TokenAmount::ZERO,
            relief_tokens: TokenAmount::ZERO,
            total_balance: TokenAmount::ZERO,
            updated_at: Utc::now(),
        }
    }

    /// The sub-balance for a token type
    pub fn balance_for(&self, token_type: TokenType) -> TokenAmount {
        match token_type {
            TokenType::ResilienceCredit => self.resilience_credits,
            TokenType::ReliefToken => self.relief_tokens,
        }
    }

    /// Add tokens to the relevant sub-balance and recompute the total.
    pub fn credit(&mut self, token_type: TokenType, amount: TokenAmount) -> Result<(), LedgerError> {
        let target = match token_type {
            TokenType::ResilienceCredit => &mut self.resilience_credits,
            TokenType::ReliefToken => &mut self.relief_tokens,
        };
        *target = target
            .checked_add(&amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(self.msme_id.clone()))?;
        self.recompute_total()
    }

    /// Subtract tokens from the relevant sub-balance.
    ///
    /// Fails with `InsufficientBalance` if the sub-balance is smaller
    /// than `amount`; the wallet is left untouched in that case.
    pub fn debit(&mut self, token_type: TokenType, amount: TokenAmount) -> Result<(), LedgerError> {
        let available = self.balance_for(token_type);
        let remaining =
            available
                .checked_sub(&amount)
                .ok_or_else(|| LedgerError::InsufficientBalance {
                    msme_id: self.msme_id.clone(),
                    token_type,
                    required: amount,
                    available,
                })?;
        match token_type {
            TokenType::ResilienceCredit => self.resilience_credits = remaining,
            TokenType::ReliefToken => self.relief_tokens = remaining,
        }
        self.recompute_total()
    }

    fn recompute_total(&mut self) -> Result<(), LedgerError> {
        self.total_balance = self
            .resilience_credits
            .checked_add(&self.relief_tokens)
            .ok_or_else(|| LedgerError::BalanceOverflow(self.msme_id.clone()))?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
