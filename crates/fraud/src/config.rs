//! Fraud heuristic configuration
//!
//! All thresholds and point values are configurable via file, not
//! hardcoded. Defaults match the disbursement-program contract values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for the fraud engine
///
/// Every rule carries its trigger threshold(s) and point value. The
/// decision ladder thresholds live here too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudConfig {
    // === Round amount rule ===
    /// Minimum amount for the round-amount rule to apply
    #[serde(default = "default_round_amount_threshold")]
    pub round_amount_threshold: Decimal,

    /// Divisor an amount must be a multiple of to count as "round"
    #[serde(default = "default_round_amount_step")]
    pub round_amount_step: Decimal,

    #[serde(default = "default_round_amount_points")]
    pub round_amount_points: u32,

    // === Rapid fire rule ===
    /// Look-back window for transaction velocity (in minutes)
    #[serde(default = "default_rapid_fire_window_minutes")]
    pub rapid_fire_window_minutes: i64,

    /// Transaction count inside the window that triggers the rule
    #[serde(default = "default_rapid_fire_tx_count")]
    pub rapid_fire_tx_count: usize,

    #[serde(default = "default_rapid_fire_points")]
    pub rapid_fire_points: u32,

    // === Vendor collusion rule ===
    /// Look-back window for same-vendor repetition (in hours)
    #[serde(default = "default_collusion_window_hours")]
    pub collusion_window_hours: i64,

    /// Same-vendor count inside the window that triggers the rule
    #[serde(default = "default_collusion_tx_count")]
    pub collusion_tx_count: usize,

    #[serde(default = "default_collusion_points")]
    pub collusion_points: u32,

    // === Unusual amount rule ===
    /// Multiple of the recent mean above which an amount is unusual
    #[serde(default = "default_unusual_amount_multiplier")]
    pub unusual_amount_multiplier: Decimal,

    #[serde(default = "default_unusual_amount_points")]
    pub unusual_amount_points: u32,

    // === Wage share rule ===
    /// Maximum share of cumulative relief-token spend that may go to
    /// wages, in percent
    #[serde(default = "default_wage_share_limit_percent")]
    pub wage_share_limit_percent: Decimal,

    #[serde(default = "default_wage_limit_points")]
    pub wage_limit_points: u32,

    // === New vendor rule ===
    /// Amount above which a first payment to a vendor is suspicious
    #[serde(default = "default_new_vendor_threshold")]
    pub new_vendor_threshold: Decimal,

    #[serde(default = "default_new_vendor_points")]
    pub new_vendor_points: u32,

    // === History and ladder ===
    /// How many recent transactions feed the rules
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Score at or above which the spend is blocked outright
    #[serde(default = "default_block_threshold")]
    pub block_threshold: u32,

    /// Score at or above which the spend is flagged for review
    #[serde(default = "default_flag_threshold")]
    pub flag_threshold: u32,
}

// Default value functions for serde

fn default_round_amount_threshold() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_round_amount_step() -> Decimal {
    Decimal::new(1_000, 0)
}

fn default_round_amount_points() -> u32 {
    15
}

fn default_rapid_fire_window_minutes() -> i64 {
    60
}

fn default_rapid_fire_tx_count() -> usize {
    5
}

fn default_rapid_fire_points() -> u32 {
    20
}

fn default_collusion_window_hours() -> i64 {
    24
}

fn default_collusion_tx_count() -> usize {
    3
}

fn default_collusion_points() -> u32 {
    25
}

fn default_unusual_amount_multiplier() -> Decimal {
    Decimal::new(5, 0)
}

fn default_unusual_amount_points() -> u32 {
    15
}

fn default_wage_share_limit_percent() -> Decimal {
    Decimal::new(30, 0)
}

fn default_wage_limit_points() -> u32 {
    30
}

fn default_new_vendor_threshold() -> Decimal {
    Decimal::new(50_000, 0)
}

fn default_new_vendor_points() -> u32 {
    10
}

fn default_history_depth() -> usize {
    10
}

fn default_block_threshold() -> u32 {
    50
}

fn default_flag_threshold() -> u32 {
    30
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            round_amount_threshold: default_round_amount_threshold(),
            round_amount_step: default_round_amount_step(),
            round_amount_points: default_round_amount_points(),
            rapid_fire_window_minutes: default_rapid_fire_window_minutes(),
            rapid_fire_tx_count: default_rapid_fire_tx_count(),
            rapid_fire_points: default_rapid_fire_points(),
            collusion_window_hours: default_collusion_window_hours(),
            collusion_tx_count: default_collusion_tx_count(),
            collusion_points: default_collusion_points(),
            unusual_amount_multiplier: default_unusual_amount_multiplier(),
            unusual_amount_points: default_unusual_amount_points(),
            wage_share_limit_percent: default_wage_share_limit_percent(),
            wage_limit_points: default_wage_limit_points(),
            new_vendor_threshold: default_new_vendor_threshold(),
            new_vendor_points: default_new_vendor_points(),
            history_depth: default_history_depth(),
            block_threshold: default_block_threshold(),
            flag_threshold: default_flag_threshold(),
        }
    }
}

impl FraudConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Rapid-fire look-back window
    pub fn rapid_fire_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.rapid_fire_window_minutes)
    }

    /// Vendor-collusion look-back window
    pub fn collusion_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.collusion_window_hours)
    }
}
