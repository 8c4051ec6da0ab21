//! # Badminton Ledger
//!
//! Settles shared costs for a group that plays badminton together, and derives match
//! statistics from the same game log.
//!
//! ## Core Concepts
//!
//! - **Match log**: every game with its date, venue, four player slots and score. The
//!   placeholder name `other` marks an untracked player and never shares a cost.
//! - **Expenses**: one court cost per match day, split equally among everyone who played that
//!   day.
//! - **Pooled purchases**: shuttles and other shared kit, split among an explicit list of
//!   beneficiaries.
//! - **Settlements**: money actually handed over, which reduces what is still owed.
//! - **Net balances**: for each pair of people, at most one debt in one direction.
//!
//! Balances are recomputed from the logs on every call; nothing derived is stored.
//!
//! ## Example
//!
//! ```rust,ignore
//! use badminton_ledger::*;
//!
//! let config = LedgerConfig::default();
//! let raw = RawLogs::load_csv_dir(std::path::Path::new("data"))?;
//! let snapshot = raw.into_snapshot(&config)?;
//!
//! match SettlementProcessor::process(&snapshot, &config)? {
//!     BalanceReport::NothingTracked => println!("No expenses tracked yet"),
//!     BalanceReport::Balances(rows) => {
//!         for row in rows {
//!             println!("{} owes {} {:.2}", row.ower, row.payer, row.amount);
//!         }
//!     }
//! }
//! ```

pub mod allocation;
pub mod attendance;
pub mod balancer;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod ledger;
pub mod report;
pub mod schema;
pub mod settlement;
pub mod stats;
pub mod utils;

pub use allocation::{allocate_expenses, allocate_pooled_purchases, ShareEntry, ShareSource};
pub use attendance::{resolve_attendance, AttendanceMap, AttendanceSet};
pub use balancer::{reduce_to_net_balances, verify_net_balances, BalanceReducer, NetBalance};
pub use config::LedgerConfig;
pub use error::{ErrorKind, LedgerError, Result};
pub use ingestion::{
    read_csv_rows, validate_snapshot, ExpenseRow, MatchRow, PooledPurchaseRow, RawLogs,
    SettlementRow,
};
pub use ledger::{PairTotal, PairwiseLedger};
pub use report::{BalanceReport, BalanceRow};
pub use schema::*;
pub use settlement::{aggregate_settlements, apply_settlements};
pub use utils::round_currency;

use log::{debug, info};

/// Every intermediate table of one balance computation, for callers that want to show how a
/// number came about.
#[derive(Debug, Clone)]
pub struct BalanceBreakdown {
    pub attendance: AttendanceMap,
    pub shares: Vec<ShareEntry>,
    pub ledger: PairwiseLedger,
    /// Netted debts before settlements.
    pub net: Vec<NetBalance>,
    /// Debts still outstanding after settlements, unrounded.
    pub outstanding: Vec<NetBalance>,
}

pub struct SettlementProcessor;

impl SettlementProcessor {
    pub fn process(snapshot: &LedgerSnapshot, config: &LedgerConfig) -> Result<BalanceReport> {
        if Self::nothing_tracked(snapshot) {
            config.validate()?;
            info!("No expenses, pooled purchases or settlements tracked yet");
            return Ok(BalanceReport::NothingTracked);
        }

        let breakdown = Self::breakdown(snapshot, config)?;
        Ok(BalanceReport::from_net_balances(&breakdown.outstanding))
    }

    /// Like [`SettlementProcessor::process`], but also checks the finished balance table
    /// against its structural invariants before rounding it for display.
    pub fn process_with_verification(
        snapshot: &LedgerSnapshot,
        config: &LedgerConfig,
    ) -> Result<BalanceReport> {
        if Self::nothing_tracked(snapshot) {
            return Self::process(snapshot, config);
        }

        let breakdown = Self::breakdown(snapshot, config)?;
        verify_net_balances(&breakdown.net)?;
        verify_net_balances(&breakdown.outstanding)?;

        Ok(BalanceReport::from_net_balances(&breakdown.outstanding))
    }

    pub fn breakdown(snapshot: &LedgerSnapshot, config: &LedgerConfig) -> Result<BalanceBreakdown> {
        config.validate()?;
        validate_snapshot(snapshot, config)?;

        info!(
            "Computing balances from {} matches, {} expenses, {} pooled purchases and {} settlements",
            snapshot.matches.len(),
            snapshot.expenses.len(),
            snapshot.pooled_purchases.len(),
            snapshot.settlements.len()
        );

        let attendance = resolve_attendance(&snapshot.matches);
        debug!("Resolved attendance for {} match days", attendance.len());

        let mut shares = allocate_expenses(&snapshot.expenses, &attendance)?;
        shares.extend(allocate_pooled_purchases(&snapshot.pooled_purchases)?);

        let ledger = PairwiseLedger::from_shares(&shares);
        let net = reduce_to_net_balances(&ledger);
        let outstanding = apply_settlements(&net, &snapshot.settlements);

        info!(
            "{} debts outstanding after {} settlements",
            outstanding.len(),
            snapshot.settlements.len()
        );

        Ok(BalanceBreakdown {
            attendance,
            shares,
            ledger,
            net,
            outstanding,
        })
    }

    fn nothing_tracked(snapshot: &LedgerSnapshot) -> bool {
        !snapshot.has_money_entries() && snapshot.settlements.is_empty()
    }
}

pub fn compute_balances(snapshot: &LedgerSnapshot, config: &LedgerConfig) -> Result<BalanceReport> {
    SettlementProcessor::process(snapshot, config)
}

/// Parses the raw tables and computes balances in one step.
pub fn compute_balances_from_rows(raw: &RawLogs, config: &LedgerConfig) -> Result<BalanceReport> {
    let snapshot = raw.into_snapshot(config)?;
    SettlementProcessor::process(&snapshot, config)
}
