use crate::balancer::NetBalance;
use crate::ledger::PairKey;
use crate::schema::SettlementRecord;
use crate::utils::is_effectively_zero;
use log::debug;
use std::collections::BTreeMap;

/// Total paid per `(paid_by, paid_to)` pair.
pub fn aggregate_settlements(settlements: &[SettlementRecord]) -> BTreeMap<PairKey, f64> {
    let mut totals: BTreeMap<PairKey, f64> = BTreeMap::new();
    for settlement in settlements {
        *totals
            .entry((settlement.paid_by.clone(), settlement.paid_to.clone()))
            .or_insert(0.0) += settlement.amount;
    }
    totals
}

/// Reduces each net debt by what the ower has already paid the payer.
///
/// Overpayment is absorbed rather than carried as credit, and payments in the direction
/// opposite to the debt are ignored. Only debts still outstanding are returned.
pub fn apply_settlements(
    balances: &[NetBalance],
    settlements: &[SettlementRecord],
) -> Vec<NetBalance> {
    let totals = aggregate_settlements(settlements);
    let mut matched = 0usize;

    let remaining: Vec<NetBalance> = balances
        .iter()
        .filter_map(|balance| {
            let key = (balance.ower.clone(), balance.payer.clone());
            let settled = match totals.get(&key) {
                Some(amount) => {
                    matched += 1;
                    *amount
                }
                None => 0.0,
            };

            let left = balance.amount - settled;
            if left <= 0.0 || is_effectively_zero(left) {
                return None;
            }

            Some(NetBalance {
                ower: balance.ower.clone(),
                payer: balance.payer.clone(),
                amount: left,
            })
        })
        .collect();

    if matched < totals.len() {
        debug!(
            "{} settlement pairs do not match an outstanding debt and were ignored",
            totals.len() - matched
        );
    }

    remaining
}
