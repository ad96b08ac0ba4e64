//! Fraud decision types
//!
//! A screening produces a score, the set of triggered rule flags, and
//! the action the orchestrator must take.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What the orchestrator does with a scored spend
///
/// Ordered by restrictiveness: Allow < Flag < Block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudAction {
    /// Proceed with the debit immediately
    Allow,
    /// Record the transaction for human review, no debit yet
    Flag,
    /// Reject outright; nothing is persisted
    Block,
}

/// Heuristic rules that can trigger on a spend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudFlag {
    /// Large amount that is an exact multiple of the round step
    RoundAmount,
    /// Too many transactions inside the velocity window
    RapidFire,
    /// Repeated payments to one vendor inside the collusion window
    VendorCollusionRisk,
    /// Amount far above the MSME's recent mean
    UnusualAmount,
    /// Relief-token wage spend share above the program limit
    WageLimitExceeded,
    /// First payment to a vendor, and a large one
    NewVendorLargeAmount,
}

/// Outcome of screening one spend attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudCheck {
    /// Additive score across all triggered rules (no cap)
    pub score: u32,
    /// Rules that triggered, in evaluation order
    pub flags: Vec<FraudFlag>,
    /// Ladder decision derived from the score
    pub action: FraudAction,
}

impl FraudCheck {
    /// Flag names as wire strings, for the transaction record.
    pub fn flag_names(&self) -> Vec<String> {
        self.flags.iter().map(|f| f.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_action_ordering() {
        assert!(FraudAction::Allow < FraudAction::Flag);
        assert!(FraudAction::Flag < FraudAction::Block);
    }

    #[test]
    fn test_flag_wire_names() {
        assert_eq!(FraudFlag::RoundAmount.to_string(), "ROUND_AMOUNT");
        assert_eq!(
            FraudFlag::VendorCollusionRisk.to_string(),
            "VENDOR_COLLUSION_RISK"
        );
        assert_eq!(
            FraudFlag::from_str("WAGE_LIMIT_EXCEEDED"),
            Ok(FraudFlag::WageLimitExceeded)
        );
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&FraudAction::Block).unwrap();
        assert_eq!(json, "\"BLOCK\"");
    }

    #[test]
    fn test_flag_names() {
        let check = FraudCheck {
            score: 35,
            flags: vec![FraudFlag::RoundAmount, FraudFlag::RapidFire],
            action: FraudAction::Flag,
        };
        assert_eq!(check.flag_names(), vec!["ROUND_AMOUNT", "RAPID_FIRE"]);
    }
}
