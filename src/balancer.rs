use crate::error::{LedgerError, Result};
use crate::ledger::PairwiseLedger;
use crate::utils::is_effectively_zero;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single-direction debt between two people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetBalance {
    pub ower: String,
    pub payer: String,
    pub amount: f64,
}

pub struct BalanceReducer<'a> {
    ledger: &'a PairwiseLedger,
}

impl<'a> BalanceReducer<'a> {
    pub fn new(ledger: &'a PairwiseLedger) -> Self {
        Self { ledger }
    }

    /// Collapses both directions of every pair into one net debt.
    ///
    /// Each unordered pair is visited once, so a pair can never come out mirrored.
    pub fn reduce(&self) -> Vec<NetBalance> {
        let mut balances = Vec::new();

        for (a, b) in self.unordered_pairs() {
            let owed_ab = self.ledger.owed(&a, &b);
            let owed_ba = self.ledger.owed(&b, &a);
            let difference = owed_ab - owed_ba;

            if is_effectively_zero(difference) {
                continue;
            }

            let (ower, payer) = if difference > 0.0 { (a, b) } else { (b, a) };
            balances.push(NetBalance {
                ower,
                payer,
                amount: difference.abs(),
            });
        }

        debug!(
            "Reduced {} directed pairs to {} net balances",
            self.ledger.len(),
            balances.len()
        );

        balances
    }

    fn unordered_pairs(&self) -> BTreeSet<(String, String)> {
        self.ledger
            .iter()
            .filter(|((ower, payer), _)| ower != payer)
            .map(|((ower, payer), _)| {
                if ower < payer {
                    (ower.clone(), payer.clone())
                } else {
                    (payer.clone(), ower.clone())
                }
            })
            .collect()
    }
}

pub fn reduce_to_net_balances(ledger: &PairwiseLedger) -> Vec<NetBalance> {
    BalanceReducer::new(ledger).reduce()
}

/// Checks the shape every balance table must have: positive finite amounts, no self debts and
/// at most one direction per pair.
pub fn verify_net_balances(balances: &[NetBalance]) -> Result<()> {
    let mut seen: BTreeMap<(&str, &str), &NetBalance> = BTreeMap::new();

    for balance in balances {
        if !balance.amount.is_finite() || balance.amount <= 0.0 {
            return Err(LedgerError::InvariantViolation(format!(
                "{} owes {} a non-positive amount {}",
                balance.ower, balance.payer, balance.amount
            )));
        }

        if balance.ower == balance.payer {
            return Err(LedgerError::InvariantViolation(format!(
                "{} owes themself {}",
                balance.ower, balance.amount
            )));
        }

        let key = if balance.ower < balance.payer {
            (balance.ower.as_str(), balance.payer.as_str())
        } else {
            (balance.payer.as_str(), balance.ower.as_str())
        };

        if let Some(existing) = seen.insert(key, balance) {
            return Err(LedgerError::InvariantViolation(format!(
                "pair {} / {} appears twice ({} -> {} and {} -> {})",
                key.0,
                key.1,
                existing.ower,
                existing.payer,
                balance.ower,
                balance.payer
            )));
        }
    }

    Ok(())
}
