//! Core types for settlement engine

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Group member identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create new member ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Net balance of one member within a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// Member ID
    pub id: MemberId,

    /// Display name
    pub name: String,

    /// Net balance (positive = is owed, negative = owes)
    pub balance: Money,
}

impl MemberBalance {
    /// Create new member balance
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: Money) -> Self {
        Self {
            id: MemberId::new(id),
            name: name.into(),
            balance,
        }
    }

    /// Check if owed money beyond `tolerance`
    pub fn is_creditor(&self, tolerance: Money) -> bool {
        self.balance > tolerance
    }

    /// Check if owing money beyond `tolerance`
    pub fn is_debtor(&self, tolerance: Money) -> bool {
        self.balance < -tolerance
    }

    /// Check if settled within `tolerance`
    pub fn is_settled(&self, tolerance: Money) -> bool {
        self.balance.abs() <= tolerance
    }
}

/// Suggested payment from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransfer {
    /// Paying member
    pub from: MemberId,

    /// Receiving member
    pub to: MemberId,

    /// Amount to pay (always positive)
    pub amount: Money,

    /// Paying member's display name
    pub from_name: String,

    /// Receiving member's display name
    pub to_name: String,
}

impl fmt::Display for SettlementTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} to {}", self.from_name, self.amount, self.to_name)
    }
}

/// Magnitude left unmatched after netting
///
/// Produced for unbalanced input, and for cent dust that ends up with no
/// counterparty even when the group sums to zero within tolerance
/// (e.g. `[+0.02, -0.01, -0.01]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Residual {
    /// Member ID
    pub member: MemberId,

    /// Display name
    pub name: String,

    /// Signed remaining balance (positive = still owed, negative = still owes)
    pub remaining: Money,
}

/// Settlement statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementStats {
    /// Members in the input
    pub member_count: usize,

    /// Members owed money
    pub creditor_count: usize,

    /// Members owing money
    pub debtor_count: usize,

    /// Members already settled within tolerance
    pub settled_count: usize,

    /// Transfers emitted
    pub transfer_count: usize,

    /// Sum of all transfer amounts
    pub total_transferred: Money,
}

impl SettlementStats {
    /// Upper bound on transfers for this partition
    pub fn max_transfers(&self) -> usize {
        if self.creditor_count == 0 || self.debtor_count == 0 {
            0
        } else {
            self.creditor_count + self.debtor_count - 1
        }
    }
}

/// Settlement plan result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Plan ID
    pub plan_id: Uuid,

    /// Group the balances belong to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Transfers in generation order (largest first)
    pub transfers: Vec<SettlementTransfer>,

    /// Statistics
    pub stats: SettlementStats,

    /// Unmatched balances (empty for balanced input)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub residual: Vec<Residual>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl SettlementPlan {
    /// Check if nothing needs to be paid
    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Total amount paid by `member`
    pub fn total_paid_by(&self, member: &MemberId) -> Money {
        self.transfers
            .iter()
            .filter(|t| &t.from == member)
            .map(|t| t.amount)
            .sum()
    }

    /// Total amount received by `member`
    pub fn total_received_by(&self, member: &MemberId) -> Money {
        self.transfers
            .iter()
            .filter(|t| &t.to == member)
            .map(|t| t.amount)
            .sum()
    }
}
