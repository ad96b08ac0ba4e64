//! Category policy - the static token-type x category restriction matrix
//!
//! Resilience credits (pre-disaster) may only be spent on storage and
//! transport. Relief tokens (post-disaster) may be spent on all seven
//! categories. The same matrix is enforced by the on-chain contract;
//! this is the off-chain mirror.

use crate::token::{SpendingCategory, TokenType};

/// Categories a resilience credit may be spent on
const RESILIENCE_CATEGORIES: &[SpendingCategory] =
    &[SpendingCategory::Storage, SpendingCategory::Transport];

/// Categories a relief token may be spent on (all of them)
const RELIEF_CATEGORIES: &[SpendingCategory] = &[
    SpendingCategory::Storage,
    SpendingCategory::Transport,
    SpendingCategory::Repairs,
    SpendingCategory::RawMaterials,
    SpendingCategory::Equipment,
    SpendingCategory::Wages,
    SpendingCategory::Utilities,
];

/// Check whether a spending category is allowed for a token type.
///
/// Pure and total: no state, no error cases.
pub fn is_category_allowed(token_type: TokenType, category: SpendingCategory) -> bool {
    match token_type {
        TokenType::ResilienceCredit => matches!(
            category,
            SpendingCategory::Storage | SpendingCategory::Transport
        ),
        TokenType::ReliefToken => true,
    }
}

/// The full set of categories permitted for a token type, in code order.
pub fn allowed_categories(token_type: TokenType) -> &'static [SpendingCategory] {
    match token_type {
        TokenType::ResilienceCredit => RESILIENCE_CATEGORIES,
        TokenType::ReliefToken => RELIEF_CATEGORIES,
    }
}

/// Filter a requested category set down to the entries the policy rejects.
///
/// Used when an authority creates an allocation: the requested set must
/// be a subset of the allowed set, and the violating entries are
/// reported back to the caller.
pub fn invalid_categories(
    token_type: TokenType,
    categories: &[SpendingCategory],
) -> Vec<SpendingCategory> {
    categories
        .iter()
        .copied()
        .filter(|c| !is_category_allowed(token_type, *c))
        .collect()
}
