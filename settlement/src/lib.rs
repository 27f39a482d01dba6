//! Cash-Flow Settlement Engine
//!
//! Turns the net balances of a shared-expense group into the list of
//! payments that settles everyone up.
//!
//! # Architecture
//!
//! 1. **Boundary**: Decimal balances are rounded half-up to whole cents
//! 2. **Partition**: Members split into creditors and debtors; anyone within
//!    tolerance of zero (default 0.01) is already settled
//! 3. **Netting**: Largest creditor is repeatedly matched against largest
//!    debtor using two max-priority queues
//! 4. **Plan**: Transfers, statistics and any unmatched residual are returned
//!
//! # Invariants
//!
//! - Every transfer amount is positive
//! - Each debtor pays exactly its debt; each creditor receives exactly its credit
//! - At most `creditors + debtors - 1` transfers
//!
//! # Example
//!
//! ```
//! use settlement::{minimize_settlements, MemberBalance, Money};
//!
//! let members = vec![
//!     MemberBalance::new("a", "Alice", Money::from_cents(2500)),
//!     MemberBalance::new("b", "Bob", Money::from_cents(1500)),
//!     MemberBalance::new("c", "Carol", Money::from_cents(-4000)),
//! ];
//!
//! let transfers = minimize_settlements(&members);
//! assert_eq!(transfers[0].to_string(), "Carol pays 25.00 to Alice");
//! assert_eq!(transfers[1].to_string(), "Carol pays 15.00 to Bob");
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod money;
pub mod netting;
pub mod queue;
pub mod types;

// Re-exports
pub use config::{EngineConfig, UnbalancedPolicy};
pub use engine::SettlementEngine;
pub use error::{Error, Result};
pub use money::Money;
pub use netting::{minimize_settlements, NettingEngine, NettingOutcome};
pub use types::*;
