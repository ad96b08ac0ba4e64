//! CLI commands

use gruha_core::{SpendingCategory, TokenAmount, TokenType};
use gruha_wallet::{AllocateRequest, SpendRequest, WalletError};
use rust_decimal::Decimal;

use crate::context::AppContext;

fn describe(err: WalletError) -> anyhow::Error {
    anyhow::anyhow!("{}: {err}", err.code())
}

fn token_type(code: u8) -> anyhow::Result<TokenType> {
    TokenType::from_code(code)
        .ok_or_else(|| anyhow::anyhow!("unknown token type code {code} (0 or 1)"))
}

fn category(code: u8) -> anyhow::Result<SpendingCategory> {
    SpendingCategory::from_code(code)
        .ok_or_else(|| anyhow::anyhow!("unknown category code {code} (0..=6)"))
}

/// Allocate tokens to an MSME on behalf of an authority
#[allow(clippy::too_many_arguments)]
pub fn allocate(
    ctx: &AppContext,
    msme_id: &str,
    disaster_id: &str,
    token_code: u8,
    amount: Decimal,
    validity_days: i64,
    category_codes: &[u8],
    allocated_by: &str,
) -> anyhow::Result<()> {
    let categories = category_codes
        .iter()
        .map(|&c| category(c))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let receipt = ctx
        .service()
        .allocate(AllocateRequest {
            msme_id: msme_id.to_string(),
            disaster_id: disaster_id.to_string(),
            token_type: token_type(token_code)?,
            amount: TokenAmount::new(amount)?,
            validity_days,
            categories,
            allocated_by: allocated_by.to_string(),
        })
        .map_err(describe)?;

    println!(
        "✅ Allocated {} {} to {} (id: {}, valid until {})",
        receipt.allocation.amount,
        receipt.allocation.token_type,
        msme_id,
        receipt.allocation.id,
        receipt.allocation.valid_until.format("%Y-%m-%d"),
    );
    Ok(())
}

/// Spend tokens from an MSME wallet
pub fn spend(
    ctx: &AppContext,
    msme_id: &str,
    vendor_id: &str,
    token_code: u8,
    category_code: u8,
    amount: Decimal,
    booking_id: Option<String>,
) -> anyhow::Result<()> {
    let receipt = ctx
        .service()
        .spend(SpendRequest {
            msme_id: msme_id.to_string(),
            vendor_id: vendor_id.to_string(),
            token_type: token_type(token_code)?,
            category: category(category_code)?,
            amount: TokenAmount::new(amount)?,
            booking_id,
        })
        .map_err(describe)?;

    let remaining = match receipt.transaction.token_type {
        TokenType::ResilienceCredit => receipt.balance.resilience_credits,
        TokenType::ReliefToken => receipt.balance.relief_tokens,
    };
    println!(
        "✅ Spend {} (id: {}, fraud score {}, remaining {})",
        receipt.transaction.status, receipt.transaction.id, receipt.fraud_score, remaining,
    );
    Ok(())
}

/// Show an MSME's balance and active allocations
pub fn balance(ctx: &AppContext, msme_id: &str) -> anyhow::Result<()> {
    let view = ctx.service().balance(msme_id).map_err(describe)?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

/// List an MSME's recent transactions
pub fn transactions(ctx: &AppContext, msme_id: &str, limit: Option<usize>) -> anyhow::Result<()> {
    let txns = ctx.service().transactions(msme_id, limit).map_err(describe)?;
    println!("{}", serde_json::to_string_pretty(&txns)?);
    Ok(())
}

/// List all transactions awaiting review
pub fn flagged(ctx: &AppContext) -> anyhow::Result<()> {
    let txns = ctx.service().flagged().map_err(describe)?;
    println!("{}", serde_json::to_string_pretty(&txns)?);
    Ok(())
}

/// Approve a flagged transaction
pub fn approve(ctx: &AppContext, txn_id: &str) -> anyhow::Result<()> {
    let receipt = ctx.service().approve_flagged(txn_id).map_err(describe)?;
    println!(
        "✅ Approved {} ({} {} to {})",
        receipt.transaction.id,
        receipt.transaction.amount,
        receipt.transaction.token_type,
        receipt.transaction.vendor_id,
    );
    Ok(())
}

/// Reject a flagged transaction
pub fn reject(ctx: &AppContext, txn_id: &str) -> anyhow::Result<()> {
    let receipt = ctx.service().reject_flagged(txn_id).map_err(describe)?;
    println!("✅ Rejected {} (no debit applied)", receipt.transaction.id);
    Ok(())
}

/// Summarize allocations for a disaster
pub fn disaster(ctx: &AppContext, disaster_id: &str) -> anyhow::Result<()> {
    let summary = ctx.service().disaster_summary(disaster_id).map_err(describe)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Bind an external chain address to an MSME wallet
pub fn bind_address(ctx: &AppContext, msme_id: &str, address: &str) -> anyhow::Result<()> {
    let view = ctx
        .service()
        .register_wallet_address(msme_id, address)
        .map_err(describe)?;
    println!(
        "✅ Bound {} to {}",
        view.wallet_address.as_deref().unwrap_or(address),
        msme_id
    );
    Ok(())
}
