use crate::balancer::NetBalance;
use crate::error::Result;
use crate::utils::round_currency;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A debt as shown to people: rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BalanceRow {
    pub ower: String,
    pub payer: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", content = "balances", rename_all = "snake_case")]
pub enum BalanceReport {
    /// No expenses or pooled purchases have been recorded yet.
    NothingTracked,
    /// Outstanding debts. Empty when everyone is settled up.
    Balances(Vec<BalanceRow>),
}

impl BalanceReport {
    pub fn from_net_balances(balances: &[NetBalance]) -> Self {
        let mut rows: Vec<BalanceRow> = balances
            .iter()
            .map(|b| BalanceRow {
                ower: b.ower.clone(),
                payer: b.payer.clone(),
                amount: round_currency(b.amount),
            })
            .filter(|row| row.amount > 0.0)
            .collect();

        rows.sort_by(|a, b| (&a.ower, &a.payer).cmp(&(&b.ower, &b.payer)));

        BalanceReport::Balances(rows)
    }

    pub fn rows(&self) -> &[BalanceRow] {
        match self {
            BalanceReport::NothingTracked => &[],
            BalanceReport::Balances(rows) => rows.as_slice(),
        }
    }

    pub fn is_settled_up(&self) -> bool {
        self.rows().is_empty()
    }

    pub fn amount_owed(&self, ower: &str, payer: &str) -> Option<f64> {
        self.rows()
            .iter()
            .find(|row| row.ower == ower && row.payer == payer)
            .map(|row| row.amount)
    }

    /// What each person is owed overall (positive) or owes overall (negative).
    pub fn net_positions(&self) -> BTreeMap<String, f64> {
        let mut positions: BTreeMap<String, f64> = BTreeMap::new();
        for row in self.rows() {
            *positions.entry(row.payer.clone()).or_insert(0.0) += row.amount;
            *positions.entry(row.ower.clone()).or_insert(0.0) -= row.amount;
        }
        positions
            .into_iter()
            .map(|(name, amount)| (name, round_currency(amount)))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(ower: &str, payer: &str, amount: f64) -> NetBalance {
        NetBalance {
            ower: ower.to_string(),
            payer: payer.to_string(),
            amount,
        }
    }

    #[test]
    fn test_rounding_happens_here() {
        let report = BalanceReport::from_net_balances(&[net("Q", "P", 100.0 / 3.0)]);
        assert_eq!(report.amount_owed("Q", "P"), Some(33.33));
    }

    #[test]
    fn test_sub_cent_debts_are_hidden() {
        let report = BalanceReport::from_net_balances(&[net("Q", "P", 0.004)]);
        assert!(report.is_settled_up());
        assert_eq!(report, BalanceReport::Balances(vec![]));
    }

    #[test]
    fn test_nothing_tracked_json() {
        let json = BalanceReport::NothingTracked.to_json().unwrap();
        assert!(json.contains("nothing_tracked"));
        assert!(BalanceReport::NothingTracked.rows().is_empty());
    }

    #[test]
    fn test_net_positions() {
        let report = BalanceReport::from_net_balances(&[
            net("Bob", "Alice", 75.0),
            net("Carol", "Alice", 100.0),
            net("Dave", "Alice", 100.0),
        ]);
        let positions = report.net_positions();

        assert_eq!(positions["Alice"], 275.0);
        assert_eq!(positions["Bob"], -75.0);
        let sum: f64 = positions.values().sum();
        assert!(sum.abs() < 1e-9);
    }

    #[test]
    fn test_rows_are_sorted() {
        let report = BalanceReport::from_net_balances(&[
            net("Dave", "Alice", 1.0),
            net("Bob", "Carol", 1.0),
            net("Bob", "Alice", 1.0),
        ]);
        let order: Vec<(&str, &str)> = report
            .rows()
            .iter()
            .map(|r| (r.ower.as_str(), r.payer.as_str()))
            .collect();
        assert_eq!(order, vec![("Bob", "Alice"), ("Bob", "Carol"), ("Dave", "Alice")]);
    }
}
