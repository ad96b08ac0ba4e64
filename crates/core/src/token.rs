//! Token types and spending categories
//!
//! The dual-token model: pre-disaster resilience credits and
//! post-disaster relief tokens, spent across seven fixed categories.
//! Numeric wire codes match the on-chain contract (tokenType 0/1,
//! category 0..6).

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Token type for the dual-token model
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// Pre-disaster tokens, restricted to storage/transport spending
    ResilienceCredit,

    /// Post-disaster tokens, usable across all recovery categories
    ReliefToken,
}

impl TokenType {
    /// Numeric wire code (matches the smart contract enum)
    pub fn code(&self) -> u8 {
        match self {
            TokenType::ResilienceCredit => 0,
            TokenType::ReliefToken => 1,
        }
    }

    /// Parse a numeric wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TokenType::ResilienceCredit),
            1 => Some(TokenType::ReliefToken),
            _ => None,
        }
    }
}

/// Spending category for vendor payments
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpendingCategory {
    Storage,
    Transport,
    Repairs,
    RawMaterials,
    Equipment,
    /// Wage spending is capped at 30% of relief-token spend by the fraud heuristic
    Wages,
    Utilities,
}

impl SpendingCategory {
    /// Numeric wire code (matches the smart contract enum)
    pub fn code(&self) -> u8 {
        match self {
            SpendingCategory::Storage => 0,
            SpendingCategory::Transport => 1,
            SpendingCategory::Repairs => 2,
            SpendingCategory::RawMaterials => 3,
            SpendingCategory::Equipment => 4,
            SpendingCategory::Wages => 5,
            SpendingCategory::Utilities => 6,
        }
    }

    /// Parse a numeric wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SpendingCategory::Storage),
            1 => Some(SpendingCategory::Transport),
            2 => Some(SpendingCategory::Repairs),
            3 => Some(SpendingCategory::RawMaterials),
            4 => Some(SpendingCategory::Equipment),
            5 => Some(SpendingCategory::Wages),
            6 => Some(SpendingCategory::Utilities),
            _ => None,
        }
    }

    /// Human-readable label for display surfaces
    pub fn label(&self) -> &'static str {
        match self {
            SpendingCategory::Storage => "Storage",
            SpendingCategory::Transport => "Transport",
            SpendingCategory::Repairs => "Repairs",
            SpendingCategory::RawMaterials => "Raw Materials",
            SpendingCategory::Equipment => "Equipment",
            SpendingCategory::Wages => "Wages",
            SpendingCategory::Utilities => "Utilities",
        }
    }
}
