//! GRUHA Core - Domain types
//!
//! This crate contains the fundamental types used across the GRUHA wallet core:
//! - `TokenAmount`: Non-negative whole-unit token quantity
//! - `TokenType` / `SpendingCategory`: The dual-token model and its spending categories
//! - `policy`: The static category-restriction matrix

pub mod amount;
pub mod policy;
pub mod token;

pub use amount::{AmountError, TokenAmount};
pub use token::{SpendingCategory, TokenType};
