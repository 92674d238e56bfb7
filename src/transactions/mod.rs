pub mod decoder;
pub mod invoice;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use decoder::{decode_operation, decode_operation_at};
pub use invoice::parse_invoice_amount_msat;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    LightningReceive,
    LightningSend,
    OnchainReceive,
    OnchainSend,
    EcashMint,
    EcashSpend,
}

impl TransactionType {
    pub const ALL: [Self; 6] = [
        Self::LightningReceive,
        Self::LightningSend,
        Self::OnchainReceive,
        Self::OnchainSend,
        Self::EcashMint,
        Self::EcashSpend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LightningReceive => "lightning_receive",
            Self::LightningSend => "lightning_send",
            Self::OnchainReceive => "onchain_receive",
            Self::OnchainSend => "onchain_send",
            Self::EcashMint => "ecash_mint",
            Self::EcashSpend => "ecash_spend",
        }
    }

    pub fn is_lightning(&self) -> bool {
        matches!(self, Self::LightningReceive | Self::LightningSend)
    }

    pub fn is_onchain(&self) -> bool {
        matches!(self, Self::OnchainReceive | Self::OnchainSend)
    }

    /// Shown when the operation carries no description of its own
    pub fn default_description(&self) -> &'static str {
        match self {
            Self::LightningReceive => "Lightning payment received",
            Self::LightningSend => "Lightning payment sent",
            Self::OnchainReceive => "On-chain deposit",
            Self::OnchainSend => "On-chain withdrawal",
            Self::EcashMint => "Ecash issued",
            Self::EcashSpend => "Ecash spent",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Completed, Self::Failed];
}

/// A daemon operation reshaped for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// 0 when the amount could not be determined
    pub amount_msat: u64,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    pub federation_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<String>,
}

impl Transaction {
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    /// Amount counted towards volume totals
    pub fn settled_amount_msat(&self) -> u64 {
        if self.is_completed() {
            self.amount_msat
        } else {
            0
        }
    }
}

/// Newest first
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
