//! Conversion from the spreadsheet tables into typed, validated records.
//!
//! Every table arrives as rows of strings, exactly as the external store exports them. Parsing
//! is strict: a single malformed row fails the whole load, naming the table and row.

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::schema::{
    is_sentinel, ExpenseRecord, LedgerSnapshot, MatchRecord, Participant, PooledPurchase,
    SettlementRecord,
};
use crate::utils::{parse_amount, parse_date, parse_points, split_names};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const MATCHES_TABLE: &str = "matches";
pub const EXPENSES_TABLE: &str = "expenses";
pub const SETTLEMENTS_TABLE: &str = "settlements";
pub const POOLED_PURCHASES_TABLE: &str = "pooled_purchases";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    pub date: String,
    #[serde(default)]
    pub venue: String,
    pub team_1_player_1: String,
    pub team_1_player_2: String,
    pub team_2_player_1: String,
    pub team_2_player_2: String,
    pub points_team_1: String,
    pub points_team_2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub date: String,
    pub amount: String,
    pub paid_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementRow {
    pub date: String,
    pub paid_by: String,
    pub paid_to: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PooledPurchaseRow {
    pub date: String,
    pub paid_by: String,
    pub amount: String,
    pub shared_by: String,
    #[serde(default)]
    pub comments: String,
}

/// The four tables as fetched, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLogs {
    pub matches: Vec<MatchRow>,
    pub expenses: Vec<ExpenseRow>,
    pub settlements: Vec<SettlementRow>,
    pub pooled_purchases: Vec<PooledPurchaseRow>,
}

impl RawLogs {
    /// Loads `<table>.csv` files from a directory. Only `matches.csv` is required; the money
    /// tables may not have been created yet.
    pub fn load_csv_dir(dir: &Path) -> Result<Self> {
        let matches = read_csv_rows(File::open(dir.join(format!("{}.csv", MATCHES_TABLE)))?)?;

        Ok(Self {
            matches,
            expenses: read_optional_table(dir, EXPENSES_TABLE)?,
            settlements: read_optional_table(dir, SETTLEMENTS_TABLE)?,
            pooled_purchases: read_optional_table(dir, POOLED_PURCHASES_TABLE)?,
        })
    }

    pub fn into_snapshot(&self, config: &LedgerConfig) -> Result<LedgerSnapshot> {
        config.validate()?;

        let matches = self
            .matches
            .iter()
            .enumerate()
            .map(|(idx, row)| parse_match_row(idx + 1, row, config))
            .collect::<Result<Vec<_>>>()?;

        let expenses = self
            .expenses
            .iter()
            .enumerate()
            .map(|(idx, row)| parse_expense_row(idx + 1, row, config))
            .collect::<Result<Vec<_>>>()?;

        let settlements = self
            .settlements
            .iter()
            .enumerate()
            .map(|(idx, row)| parse_settlement_row(idx + 1, row, config))
            .collect::<Result<Vec<_>>>()?;

        let pooled_purchases = self
            .pooled_purchases
            .iter()
            .enumerate()
            .map(|(idx, row)| parse_pooled_purchase_row(idx + 1, row, config))
            .collect::<Result<Vec<_>>>()?;

        let snapshot = LedgerSnapshot {
            matches,
            expenses,
            pooled_purchases,
            settlements,
        };

        validate_snapshot(&snapshot, config)?;

        debug!(
            "Parsed {} matches, {} expenses, {} pooled purchases and {} settlements",
            snapshot.matches.len(),
            snapshot.expenses.len(),
            snapshot.pooled_purchases.len(),
            snapshot.settlements.len()
        );

        Ok(snapshot)
    }
}

pub fn read_csv_rows<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn read_optional_table<T: DeserializeOwned>(dir: &Path, table: &str) -> Result<Vec<T>> {
    let path = dir.join(format!("{}.csv", table));
    if !path.exists() {
        debug!("No {} table at {}, treating it as empty", table, path.display());
        return Ok(Vec::new());
    }
    read_csv_rows(File::open(path)?)
}

fn parse_match_row(row: usize, raw: &MatchRow, config: &LedgerConfig) -> Result<MatchRecord> {
    Ok(MatchRecord {
        date: parse_date(MATCHES_TABLE, row, &raw.date, &config.date_format)?,
        venue: raw.venue.trim().to_string(),
        team_1: [
            parse_player(row, &raw.team_1_player_1)?,
            parse_player(row, &raw.team_1_player_2)?,
        ],
        team_2: [
            parse_player(row, &raw.team_2_player_1)?,
            parse_player(row, &raw.team_2_player_2)?,
        ],
        points_team_1: parse_points(row, &raw.points_team_1)?,
        points_team_2: parse_points(row, &raw.points_team_2)?,
    })
}

fn parse_player(row: usize, raw: &str) -> Result<Participant> {
    if raw.trim().is_empty() {
        return Err(LedgerError::EmptyParticipant {
            table: MATCHES_TABLE,
            row,
            role: "player",
        });
    }
    Ok(Participant::parse(raw))
}

fn parse_expense_row(row: usize, raw: &ExpenseRow, config: &LedgerConfig) -> Result<ExpenseRecord> {
    Ok(ExpenseRecord {
        date: parse_date(EXPENSES_TABLE, row, &raw.date, &config.date_format)?,
        amount: parse_amount(EXPENSES_TABLE, row, &raw.amount)?,
        paid_by: raw.paid_by.trim().to_string(),
    })
}

fn parse_settlement_row(
    row: usize,
    raw: &SettlementRow,
    config: &LedgerConfig,
) -> Result<SettlementRecord> {
    Ok(SettlementRecord {
        date: parse_date(SETTLEMENTS_TABLE, row, &raw.date, &config.date_format)?,
        paid_by: raw.paid_by.trim().to_string(),
        paid_to: raw.paid_to.trim().to_string(),
        amount: parse_amount(SETTLEMENTS_TABLE, row, &raw.amount)?,
    })
}

fn parse_pooled_purchase_row(
    row: usize,
    raw: &PooledPurchaseRow,
    config: &LedgerConfig,
) -> Result<PooledPurchase> {
    let comment = raw.comments.trim();
    Ok(PooledPurchase {
        id: row,
        date: parse_date(POOLED_PURCHASES_TABLE, row, &raw.date, &config.date_format)?,
        paid_by: raw.paid_by.trim().to_string(),
        amount: parse_amount(POOLED_PURCHASES_TABLE, row, &raw.amount)?,
        beneficiaries: split_names(&raw.shared_by, config.shared_by_delimiter),
        comment: (!comment.is_empty()).then(|| comment.to_string()),
    })
}

/// Checks the money logs against the roster and rejects amounts that could not have come
/// from a well-formed row. Runs on typed snapshots too, since those can be built in code.
pub fn validate_snapshot(snapshot: &LedgerSnapshot, config: &LedgerConfig) -> Result<()> {
    for (idx, record) in snapshot.matches.iter().enumerate() {
        let blank = record
            .players()
            .any(|p| p.name().is_some_and(|n| n.trim().is_empty()));
        if blank {
            return Err(LedgerError::EmptyParticipant {
                table: MATCHES_TABLE,
                row: idx + 1,
                role: "player",
            });
        }
    }

    let roster = config.resolve_roster(snapshot.players());

    for (idx, expense) in snapshot.expenses.iter().enumerate() {
        let row = idx + 1;
        check_amount(EXPENSES_TABLE, row, expense.amount)?;
        check_member(&roster, EXPENSES_TABLE, row, "payer", &expense.paid_by)?;
    }

    for (idx, settlement) in snapshot.settlements.iter().enumerate() {
        let row = idx + 1;
        check_amount(SETTLEMENTS_TABLE, row, settlement.amount)?;
        check_member(&roster, SETTLEMENTS_TABLE, row, "payer", &settlement.paid_by)?;
        check_member(&roster, SETTLEMENTS_TABLE, row, "payee", &settlement.paid_to)?;
    }

    for purchase in &snapshot.pooled_purchases {
        let row = purchase.id;
        check_amount(POOLED_PURCHASES_TABLE, row, purchase.amount)?;
        check_member(&roster, POOLED_PURCHASES_TABLE, row, "payer", &purchase.paid_by)?;
        for beneficiary in &purchase.beneficiaries {
            check_member(&roster, POOLED_PURCHASES_TABLE, row, "beneficiary", beneficiary)?;
        }
    }

    Ok(())
}

fn check_amount(table: &'static str, row: usize, amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(LedgerError::InvalidAmount {
            table,
            row,
            value: amount.to_string(),
        });
    }
    if amount < 0.0 {
        return Err(LedgerError::NegativeAmount { table, row, amount });
    }
    Ok(())
}

fn check_member(
    roster: &BTreeSet<String>,
    table: &'static str,
    row: usize,
    role: &'static str,
    name: &str,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::EmptyParticipant { table, row, role });
    }
    if is_sentinel(name) {
        return Err(LedgerError::SentinelParticipant { table, row, role });
    }
    if !roster.contains(name) {
        return Err(LedgerError::UnknownParticipant {
            table,
            row,
            name: name.to_string(),
        });
    }
    Ok(())
}

// Row encodings for appending to the external tables, in column order.

impl ExpenseRecord {
    pub fn to_row(&self, config: &LedgerConfig) -> Vec<String> {
        vec![
            self.date.format(&config.date_format).to_string(),
            self.amount.to_string(),
            self.paid_by.clone(),
        ]
    }
}

impl SettlementRecord {
    pub fn to_row(&self, config: &LedgerConfig) -> Vec<String> {
        vec![
            self.date.format(&config.date_format).to_string(),
            self.paid_by.clone(),
            self.paid_to.clone(),
            self.amount.to_string(),
        ]
    }
}

impl PooledPurchase {
    pub fn to_row(&self, config: &LedgerConfig) -> Vec<String> {
        let delimiter = config.shared_by_delimiter.to_string();
        vec![
            self.date.format(&config.date_format).to_string(),
            self.paid_by.clone(),
            self.amount.to_string(),
            self.beneficiaries
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(&delimiter),
            self.comment.clone().unwrap_or_default(),
        ]
    }
}
