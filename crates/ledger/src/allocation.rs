//! Authority-issued token allocations
//!
//! An allocation is an authority grant of tokens to one MSME, tagged
//! with a disaster context, an expiry, and the category subset the
//! grant authorizes. Records are never deleted; expiry is a derived
//! predicate evaluated lazily at read time.

use chrono::{DateTime, Utc};
use gruha_core::{SpendingCategory, TokenAmount, TokenType};
use serde::{Deserialize, Serialize};

/// One authority grant of tokens to one MSME
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAllocation {
    /// Unique identifier (ALLOC-XXXXXXXX)
    pub id: String,

    /// Receiving MSME
    pub msme_id: String,

    /// Disaster context tag; empty for non-disaster grants
    pub disaster_id: String,

    /// Token type granted
    pub token_type: TokenType,

    /// Total granted, immutable after creation
    pub amount: TokenAmount,

    /// Unconsumed portion; 0 <= remaining <= amount, only decreases
    pub remaining_amount: TokenAmount,

    /// Expiry timestamp
    pub valid_until: DateTime<Utc>,

    /// Category subset this grant authorizes (validated against policy)
    pub categories: Vec<SpendingCategory>,

    /// Authority identity that issued the grant
    pub allocated_by: String,

    /// Creation time
    pub allocated_at: DateTime<Utc>,
}

impl TokenAllocation {
    /// Create a new allocation with a fresh id; `remaining_amount`
    /// starts equal to `amount`.
    pub fn new(
        msme_id: impl Into<String>,
        disaster_id: impl Into<String>,
        token_type: TokenType,
        amount: TokenAmount,
        valid_until: DateTime<Utc>,
        categories: Vec<SpendingCategory>,
        allocated_by: impl Into<String>,
    ) -> Self {
        let id = format!(
            "ALLOC-{}",
            uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
        );

        Self {
            id,
            msme_id: msme_id.into(),
            disaster_id: disaster_id.into(),
            token_type,
            amount,
            remaining_amount: amount,
            valid_until,
            categories,
            allocated_by: allocated_by.into(),
            allocated_at: Utc::now(),
        }
    }

    /// An allocation is active iff it has tokens left and has not expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.remaining_amount.is_zero() && now < self.valid_until
    }

    /// Consumed portion (amount - remaining)
    pub fn spent(&self) -> TokenAmount {
        self.amount
            .checked_sub(&self.remaining_amount)
            .unwrap_or(TokenAmount::ZERO)
    }
}
