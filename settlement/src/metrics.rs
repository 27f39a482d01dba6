//! Metrics collection for observability
//!
//! Prometheus metrics for the settlement engine. Each engine owns its own
//! registry so several engines can live in one process.
//!
//! # Metrics
//!
//! - `settlement_plans_total` - Settlement plans computed
//! - `settlement_transfers_total` - Transfers emitted across all plans
//! - `settlement_unbalanced_total` - Inputs whose balances did not sum to zero
//! - `settlement_members_per_plan` - Histogram of group sizes
//! - `settlement_compute_duration_seconds` - Histogram of compute latencies

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Plans computed
    pub plans_total: IntCounter,

    /// Transfers emitted
    pub transfers_total: IntCounter,

    /// Unbalanced inputs seen
    pub unbalanced_total: IntCounter,

    /// Group size histogram
    pub members_per_plan: Histogram,

    /// Compute duration histogram
    pub compute_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("plans_total", &self.plans_total.get())
            .field("transfers_total", &self.transfers_total.get())
            .field("unbalanced_total", &self.unbalanced_total.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let plans_total =
            IntCounter::new("settlement_plans_total", "Settlement plans computed")?;
        registry.register(Box::new(plans_total.clone()))?;

        let transfers_total = IntCounter::new(
            "settlement_transfers_total",
            "Transfers emitted across all plans",
        )?;
        registry.register(Box::new(transfers_total.clone()))?;

        let unbalanced_total = IntCounter::new(
            "settlement_unbalanced_total",
            "Inputs whose balances did not sum to zero",
        )?;
        registry.register(Box::new(unbalanced_total.clone()))?;

        let members_per_plan = Histogram::with_opts(
            HistogramOpts::new("settlement_members_per_plan", "Histogram of group sizes")
                .buckets(vec![2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0]),
        )?;
        registry.register(Box::new(members_per_plan.clone()))?;

        let compute_duration = Histogram::with_opts(
            HistogramOpts::new(
                "settlement_compute_duration_seconds",
                "Histogram of compute latencies",
            )
            .buckets(vec![0.000_01, 0.000_1, 0.001, 0.005, 0.010, 0.050, 0.100]),
        )?;
        registry.register(Box::new(compute_duration.clone()))?;

        Ok(Self {
            plans_total,
            transfers_total,
            unbalanced_total,
            members_per_plan,
            compute_duration,
            registry,
        })
    }

    /// Record a computed plan
    pub fn record_plan(&self, member_count: usize, transfer_count: usize) {
        self.plans_total.inc();
        self.transfers_total.inc_by(transfer_count as u64);
        self.members_per_plan.observe(member_count as f64);
    }

    /// Record unbalanced input
    pub fn record_unbalanced(&self) {
        self.unbalanced_total.inc();
    }

    /// Record compute duration
    pub fn record_compute_duration(&self, duration_seconds: f64) {
        self.compute_duration.observe(duration_seconds);
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> crate::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| crate::Error::Serialization(e.to_string()))
    }
}
