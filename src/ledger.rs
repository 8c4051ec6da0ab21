use crate::allocation::ShareEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered `(ower, payer)` key.
pub type PairKey = (String, String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairTotal {
    pub amount: f64,
    pub event_count: usize,
    pub earliest: NaiveDate,
}

impl PairTotal {
    fn absorb(&mut self, other: &PairTotal) {
        self.amount += other.amount;
        self.event_count += other.event_count;
        self.earliest = self.earliest.min(other.earliest);
    }
}

/// Cumulative amount each person owes each other person, before netting.
///
/// Folding is order independent, so partial ledgers can be built separately and merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairwiseLedger {
    totals: BTreeMap<PairKey, PairTotal>,
}

impl PairwiseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shares<'a, I>(shares: I) -> Self
    where
        I: IntoIterator<Item = &'a ShareEntry>,
    {
        let mut ledger = Self::new();
        for share in shares {
            ledger.record(share);
        }
        ledger
    }

    pub fn record(&mut self, share: &ShareEntry) {
        let entry = PairTotal {
            amount: share.amount,
            event_count: 1,
            earliest: share.date,
        };
        self.totals
            .entry((share.ower.clone(), share.payer.clone()))
            .and_modify(|total| total.absorb(&entry))
            .or_insert(entry);
    }

    pub fn merge(mut self, other: PairwiseLedger) -> Self {
        for (key, total) in other.totals {
            self.totals
                .entry(key)
                .and_modify(|existing| existing.absorb(&total))
                .or_insert(total);
        }
        self
    }

    pub fn owed(&self, ower: &str, payer: &str) -> f64 {
        self.totals
            .get(&(ower.to_string(), payer.to_string()))
            .map(|total| total.amount)
            .unwrap_or(0.0)
    }

    pub fn get(&self, ower: &str, payer: &str) -> Option<&PairTotal> {
        self.totals.get(&(ower.to_string(), payer.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &PairTotal)> {
        self.totals.iter()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
