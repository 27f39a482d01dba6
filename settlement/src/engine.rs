//! Main settlement engine
//!
//! Wraps the netting pass with input validation, the unbalanced-input
//! policy, logging and metrics.

use crate::{
    config::{EngineConfig, UnbalancedPolicy},
    metrics::Metrics,
    money::Money,
    netting::NettingEngine,
    types::*,
    Error, Result,
};
use std::collections::HashSet;
use std::time::Instant;
use uuid::Uuid;

/// Settlement engine
pub struct SettlementEngine {
    /// Netting engine
    netting: NettingEngine,

    /// Metrics collector
    metrics: Metrics,

    /// Configuration
    config: EngineConfig,
}

impl std::fmt::Debug for SettlementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementEngine")
            .field("netting", &self.netting)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let netting = NettingEngine::new(config.tolerance_money()?);
        let metrics = Metrics::new()?;

        tracing::info!(
            service = %config.service_name,
            version = %config.service_version,
            tolerance = %config.tolerance,
            policy = ?config.unbalanced_policy,
            "Settlement engine ready"
        );

        Ok(Self {
            netting,
            metrics,
            config,
        })
    }

    /// Compute the settlement plan for one group's balances
    pub fn settle(&self, members: &[MemberBalance]) -> Result<SettlementPlan> {
        self.compute_plan(None, members)
    }

    /// Compute the settlement plan for a named group
    pub fn settle_group(
        &self,
        group_id: impl Into<String>,
        members: &[MemberBalance],
    ) -> Result<SettlementPlan> {
        self.compute_plan(Some(group_id.into()), members)
    }

    fn compute_plan(
        &self,
        group_id: Option<String>,
        members: &[MemberBalance],
    ) -> Result<SettlementPlan> {
        let started = Instant::now();

        Self::check_unique(members)?;
        Self::check_amounts(members)?;
        self.check_balanced(group_id.as_deref(), members)?;

        let outcome = self.netting.compute(members);

        for transfer in &outcome.transfers {
            tracing::debug!(
                from = %transfer.from,
                to = %transfer.to,
                amount = %transfer.amount,
                "Settlement transfer"
            );
        }

        if !outcome.residual.is_empty() {
            let unmatched: Money = outcome.residual.iter().map(|r| r.remaining.abs()).sum();
            tracing::warn!(
                group = group_id.as_deref().unwrap_or("-"),
                members = outcome.residual.len(),
                unmatched = %unmatched,
                "Balances left unmatched after netting"
            );
        }

        let total_transferred = outcome
            .transfers
            .iter()
            .try_fold(Money::ZERO, |total, t| total.checked_add(t.amount))
            .ok_or_else(|| {
                Error::AmountOutOfRange("total transferred exceeds the representable range".into())
            })?;

        let member_count = members.len();
        let stats = SettlementStats {
            member_count,
            creditor_count: outcome.creditor_count,
            debtor_count: outcome.debtor_count,
            settled_count: member_count - outcome.creditor_count - outcome.debtor_count,
            transfer_count: outcome.transfers.len(),
            total_transferred,
        };
        debug_assert!(stats.transfer_count <= stats.max_transfers());

        self.metrics.record_plan(stats.member_count, stats.transfer_count);
        self.metrics
            .record_compute_duration(started.elapsed().as_secs_f64());

        tracing::info!(
            "Settlement plan computed: {} members → {} transfers ({} total)",
            stats.member_count,
            stats.transfer_count,
            stats.total_transferred
        );

        Ok(SettlementPlan {
            plan_id: Uuid::new_v4(),
            group_id,
            transfers: outcome.transfers,
            stats,
            residual: outcome.residual,
            created_at: chrono::Utc::now(),
        })
    }

    /// Reject groups listing the same member twice
    fn check_unique(members: &[MemberBalance]) -> Result<()> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in members {
            if !seen.insert(&member.id) {
                return Err(Error::DuplicateMember(member.id.clone()));
            }
        }
        Ok(())
    }

    /// Reject balances whose magnitude has no `Money` representation
    fn check_amounts(members: &[MemberBalance]) -> Result<()> {
        match members.iter().find(|m| m.balance.checked_abs().is_none()) {
            Some(member) => Err(Error::AmountOutOfRange(format!(
                "balance of member {} ({} cents)",
                member.id,
                member.balance.cents()
            ))),
            None => Ok(()),
        }
    }

    /// Apply the unbalanced-input policy.
    ///
    /// Each member may carry up to one tolerance of rounding, so the group
    /// sum may drift by `tolerance * member_count` before it counts as
    /// unbalanced. The sum is taken in `i128` so large balances cannot
    /// saturate their way under the allowance.
    fn check_balanced(&self, group_id: Option<&str>, members: &[MemberBalance]) -> Result<()> {
        let imbalance: i128 = members
            .iter()
            .map(|m| i128::from(m.balance.cents()))
            .sum();
        let allowance = i128::from(self.netting.tolerance().cents()) * members.len() as i128;

        if imbalance.abs() <= allowance {
            return Ok(());
        }

        self.metrics.record_unbalanced();

        match self.config.unbalanced_policy {
            UnbalancedPolicy::Reject => {
                tracing::warn!(
                    group = group_id.unwrap_or("-"),
                    imbalance_cents = %imbalance,
                    "Rejecting unbalanced settlement input"
                );
                match i64::try_from(imbalance) {
                    Ok(cents) => Err(Error::UnbalancedInput {
                        imbalance: Money::from_cents(cents),
                    }),
                    Err(_) => Err(Error::AmountOutOfRange(format!(
                        "group imbalance of {} cents",
                        imbalance
                    ))),
                }
            }
            UnbalancedPolicy::Truncate => {
                tracing::warn!(
                    group = group_id.unwrap_or("-"),
                    imbalance_cents = %imbalance,
                    "Settling unbalanced input, leftover will be reported as residual"
                );
                Ok(())
            }
        }
    }

    /// Members still outside tolerance once `plan` is paid in full
    pub fn verify_plan(&self, members: &[MemberBalance], plan: &SettlementPlan) -> Vec<Residual> {
        self.netting.outstanding_after(members, &plan.transfers)
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
