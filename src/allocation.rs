use crate::attendance::AttendanceMap;
use crate::error::{LedgerError, Result};
use crate::schema::{ExpenseRecord, PooledPurchase};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum ShareSource {
    /// Court cost of a match day.
    MatchDay(NaiveDate),
    /// A pooled purchase, by id.
    PooledPurchase(usize),
}

/// One participant's share of one event, owed to whoever paid for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub source: ShareSource,
    pub date: NaiveDate,
    pub ower: String,
    pub payer: String,
    pub amount: f64,
}

/// Splits each day's expense equally across that day's attendance.
///
/// The payer's own share is not a debt and produces no entry.
pub fn allocate_expenses(
    expenses: &[ExpenseRecord],
    attendance: &AttendanceMap,
) -> Result<Vec<ShareEntry>> {
    let mut shares = Vec::new();
    let mut seen_dates = BTreeSet::new();

    for expense in expenses {
        if !seen_dates.insert(expense.date) {
            warn!(
                "More than one expense recorded for {}; each is split separately",
                expense.date
            );
        }

        let day = attendance
            .get(&expense.date)
            .ok_or(LedgerError::MissingAttendance(expense.date))?;

        if day.count == 0 {
            return Err(LedgerError::EmptyAttendance(expense.date));
        }

        let share = expense.amount / day.count as f64;

        for participant in &day.participants {
            if *participant == expense.paid_by {
                continue;
            }
            shares.push(ShareEntry {
                source: ShareSource::MatchDay(expense.date),
                date: expense.date,
                ower: participant.clone(),
                payer: expense.paid_by.clone(),
                amount: share,
            });
        }
    }

    debug!(
        "Allocated {} expenses into {} shares",
        expenses.len(),
        shares.len()
    );

    Ok(shares)
}

/// Splits each pooled purchase across its listed beneficiaries.
///
/// The divisor is the full beneficiary set, payer included when listed, while the payer gets
/// no entry of their own.
pub fn allocate_pooled_purchases(purchases: &[PooledPurchase]) -> Result<Vec<ShareEntry>> {
    let mut shares = Vec::new();

    for purchase in purchases {
        if purchase.beneficiaries.is_empty() {
            return Err(LedgerError::EmptyBeneficiaries(purchase.id));
        }

        let share = purchase.amount / purchase.beneficiaries.len() as f64;

        for beneficiary in &purchase.beneficiaries {
            if *beneficiary == purchase.paid_by {
                continue;
            }
            shares.push(ShareEntry {
                source: ShareSource::PooledPurchase(purchase.id),
                date: purchase.date,
                ower: beneficiary.clone(),
                payer: purchase.paid_by.clone(),
                amount: share,
            });
        }
    }

    debug!(
        "Allocated {} pooled purchases into {} shares",
        purchases.len(),
        shares.len()
    );

    Ok(shares)
}
