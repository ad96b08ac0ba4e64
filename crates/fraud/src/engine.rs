//! Fraud engine - rule evaluation
//!
//! Pure function of (config, spend profile, history, now). The caller
//! supplies the clock so a given history always scores the same; the
//! engine never reads wall time or touches storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use gruha_core::{SpendingCategory, TokenAmount, TokenType};
use gruha_ledger::WalletTransaction;

use crate::config::FraudConfig;
use crate::decision::{FraudAction, FraudCheck, FraudFlag};

/// The spend attempt under screening
#[derive(Debug, Clone)]
pub struct SpendProfile {
    pub msme_id: String,
    pub vendor_id: String,
    pub amount: TokenAmount,
    pub category: SpendingCategory,
    pub token_type: TokenType,
}

/// Rule-based spend scorer
#[derive(Debug, Clone, Default)]
pub struct FraudEngine {
    config: FraudConfig,
}

impl FraudEngine {
    pub fn new(config: FraudConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FraudConfig {
        &self.config
    }

    /// Score a spend against the MSME's recent history.
    ///
    /// `history` is most recent first; only the configured depth is
    /// inspected.
    pub fn evaluate(
        &self,
        profile: &SpendProfile,
        history: &[WalletTransaction],
        now: DateTime<Utc>,
    ) -> FraudCheck {
        let history = &history[..history.len().min(self.config.history_depth)];
        let amount = profile.amount.value();

        let mut score = 0u32;
        let mut flags = Vec::new();

        // Rule: round amount
        if amount >= self.config.round_amount_threshold
            && (amount % self.config.round_amount_step).is_zero()
        {
            score += self.config.round_amount_points;
            flags.push(FraudFlag::RoundAmount);
            debug!(msme_id = %profile.msme_id, %amount, "rule triggered: round amount");
        }

        // Rule: rapid fire
        let velocity_cutoff = now - self.config.rapid_fire_window();
        let recent_count = history
            .iter()
            .filter(|t| t.created_at > velocity_cutoff)
            .count();
        if recent_count >= self.config.rapid_fire_tx_count {
            score += self.config.rapid_fire_points;
            flags.push(FraudFlag::RapidFire);
            debug!(msme_id = %profile.msme_id, recent_count, "rule triggered: rapid fire");
        }

        // Rule: vendor collusion risk
        let collusion_cutoff = now - self.config.collusion_window();
        let same_vendor_count = history
            .iter()
            .filter(|t| t.vendor_id == profile.vendor_id && t.created_at > collusion_cutoff)
            .count();
        if same_vendor_count >= self.config.collusion_tx_count {
            score += self.config.collusion_points;
            flags.push(FraudFlag::VendorCollusionRisk);
            debug!(
                msme_id = %profile.msme_id,
                vendor_id = %profile.vendor_id,
                same_vendor_count,
                "rule triggered: vendor collusion risk"
            );
        }

        // Rule: unusual amount
        let total_spent: Decimal = history.iter().map(|t| t.amount.value()).sum();
        if !history.is_empty() {
            let mean = total_spent / Decimal::from(history.len());
            if mean > Decimal::ZERO && amount > mean * self.config.unusual_amount_multiplier {
                score += self.config.unusual_amount_points;
                flags.push(FraudFlag::UnusualAmount);
                debug!(msme_id = %profile.msme_id, %amount, %mean, "rule triggered: unusual amount");
            }
        }

        // Rule: wage share limit (relief tokens only)
        if profile.category == SpendingCategory::Wages
            && profile.token_type == TokenType::ReliefToken
            && total_spent > Decimal::ZERO
        {
            let wage_spent: Decimal = history
                .iter()
                .filter(|t| t.category == SpendingCategory::Wages)
                .map(|t| t.amount.value())
                .sum();
            let share = (wage_spent + amount) / (total_spent + amount) * Decimal::ONE_HUNDRED;
            if share > self.config.wage_share_limit_percent {
                score += self.config.wage_limit_points;
                flags.push(FraudFlag::WageLimitExceeded);
                debug!(msme_id = %profile.msme_id, %share, "rule triggered: wage limit exceeded");
            }
        }

        // Rule: new vendor, large amount
        let known_vendor = history.iter().any(|t| t.vendor_id == profile.vendor_id);
        if !known_vendor && amount > self.config.new_vendor_threshold {
            score += self.config.new_vendor_points;
            flags.push(FraudFlag::NewVendorLargeAmount);
            debug!(
                msme_id = %profile.msme_id,
                vendor_id = %profile.vendor_id,
                "rule triggered: new vendor large amount"
            );
        }

        let action = if score >= self.config.block_threshold {
            FraudAction::Block
        } else if score >= self.config.flag_threshold {
            FraudAction::Flag
        } else {
            FraudAction::Allow
        };

        FraudCheck {
            score,
            flags,
            action,
        }
    }
}
