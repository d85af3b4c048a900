use serde::{Deserialize, Serialize};

use crate::{amount::Amount, state::RevenueShareRecord};

/// JSON view of a revenue share as served to the web front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueShareSummary {
    #[serde(rename = "isInitialized")]
    pub is_initialized: bool,
    /// Base58 member addresses, all 11 slots
    #[serde(rename = "memberAccts")]
    pub members: Vec<String>,
    /// Percentages, two decimals
    #[serde(rename = "memberShares")]
    pub shares: Vec<f64>,
    #[serde(rename = "memberWithdraws")]
    pub withdrawals: Vec<f64>,
    #[serde(rename = "sharedAcctBalance")]
    pub shared_balance: f64,
}

impl RevenueShareSummary {
    pub fn new(record: &RevenueShareRecord, shared_balance: Amount) -> Self {
        Self {
            is_initialized: record.is_initialized,
            members: record.members.iter().map(|m| m.to_string()).collect(),
            shares: (0..record.shares.len())
                .map(|slot| record.share_percentage(slot))
                .collect(),
            withdrawals: record.withdrawals.iter().map(|w| w.to_decimal()).collect(),
            shared_balance: shared_balance.to_decimal(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
