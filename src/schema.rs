use chrono::NaiveDate;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Name used in the match log for a player who is not tracked.
pub const SENTINEL_PARTICIPANT: &str = "other";

/// A player slot in the match log.
///
/// The placeholder name parses to [`Participant::Unknown`]; it never takes part in cost
/// sharing and never appears in balances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Participant {
    Named(String),
    Unknown,
}

impl Participant {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_sentinel(trimmed) {
            Participant::Unknown
        } else {
            Participant::Named(trimmed.to_string())
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Participant::Named(name) => Some(name),
            Participant::Unknown => None,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name() == Some(name)
    }
}

pub fn is_sentinel(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(SENTINEL_PARTICIPANT)
}

impl From<String> for Participant {
    fn from(value: String) -> Self {
        Participant::parse(&value)
    }
}

impl From<&str> for Participant {
    fn from(value: &str) -> Self {
        Participant::parse(value)
    }
}

impl From<Participant> for String {
    fn from(value: Participant) -> Self {
        match value {
            Participant::Named(name) => name,
            Participant::Unknown => SENTINEL_PARTICIPANT.to_string(),
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Named(name) => f.write_str(name),
            Participant::Unknown => f.write_str(SENTINEL_PARTICIPANT),
        }
    }
}

impl JsonSchema for Participant {
    fn schema_name() -> String {
        "Participant".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Team1,
    Team2,
}

impl Team {
    pub fn opposite(self) -> Self {
        match self {
            Team::Team1 => Team::Team2,
            Team::Team2 => Team::Team1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchRecord {
    #[schemars(description = "Date the game was played (YYYY-MM-DD)")]
    pub date: NaiveDate,

    #[schemars(description = "Court or hall where the game was played")]
    pub venue: String,

    #[schemars(description = "The two players of team 1. 'other' marks an untracked player.")]
    pub team_1: [Participant; 2],

    #[schemars(description = "The two players of team 2. 'other' marks an untracked player.")]
    pub team_2: [Participant; 2],

    pub points_team_1: u32,

    pub points_team_2: u32,
}

impl MatchRecord {
    pub fn players(&self) -> impl Iterator<Item = &Participant> {
        self.team_1.iter().chain(self.team_2.iter())
    }

    pub fn team(&self, team: Team) -> &[Participant; 2] {
        match team {
            Team::Team1 => &self.team_1,
            Team::Team2 => &self.team_2,
        }
    }

    pub fn points(&self, team: Team) -> u32 {
        match team {
            Team::Team1 => self.points_team_1,
            Team::Team2 => self.points_team_2,
        }
    }

    /// Which side the named player was on, if they played.
    pub fn team_of(&self, name: &str) -> Option<Team> {
        if self.team_1.iter().any(|p| p.is_named(name)) {
            Some(Team::Team1)
        } else if self.team_2.iter().any(|p| p.is_named(name)) {
            Some(Team::Team2)
        } else {
            None
        }
    }

    pub fn total_points(&self) -> u64 {
        u64::from(self.points_team_1) + u64::from(self.points_team_2)
    }

    pub fn margin(&self) -> u32 {
        self.points_team_1.abs_diff(self.points_team_2)
    }

    pub fn winner(&self) -> Option<Team> {
        match self.points_team_1.cmp(&self.points_team_2) {
            std::cmp::Ordering::Greater => Some(Team::Team1),
            std::cmp::Ordering::Less => Some(Team::Team2),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// One-line description of the game, used for "longest game" style summaries.
    pub fn describe(&self) -> String {
        format!(
            "{} points: ({}, {}) {} - {} ({}, {}) on {} at {}",
            self.total_points(),
            self.team_1[0],
            self.team_1[1],
            self.points_team_1,
            self.points_team_2,
            self.team_2[0],
            self.team_2[1],
            self.date,
            self.venue
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseRecord {
    #[schemars(description = "Match day the court cost belongs to")]
    pub date: NaiveDate,

    #[schemars(description = "Total cost for the day, split equally among everyone who played")]
    pub amount: f64,

    pub paid_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PooledPurchase {
    #[schemars(description = "1-based position of the purchase in the pooled purchases log")]
    pub id: usize,

    pub date: NaiveDate,

    pub paid_by: String,

    pub amount: f64,

    #[schemars(
        description = "Everyone the purchase is shared by. The amount is divided by the size of this set, including the payer when listed, but the payer never owes themself."
    )]
    pub beneficiaries: BTreeSet<String>,

    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SettlementRecord {
    pub date: NaiveDate,

    #[schemars(description = "The person who owed money and paid it back")]
    pub paid_by: String,

    #[schemars(description = "The person who received the payment")]
    pub paid_to: String,

    pub amount: f64,
}

/// All four logs, loaded once per computation and passed down explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub matches: Vec<MatchRecord>,

    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,

    #[serde(default)]
    pub pooled_purchases: Vec<PooledPurchase>,

    #[serde(default)]
    pub settlements: Vec<SettlementRecord>,
}

impl LedgerSnapshot {
    /// Named players appearing anywhere in the match log.
    pub fn players(&self) -> BTreeSet<String> {
        self.matches
            .iter()
            .flat_map(|m| m.players())
            .filter_map(|p| p.name().map(str::to_string))
            .collect()
    }

    pub fn has_money_entries(&self) -> bool {
        !self.expenses.is_empty() || !self.pooled_purchases.is_empty()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LedgerSnapshot)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
