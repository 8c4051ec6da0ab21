use crate::error::{LedgerError, Result};
use crate::schema::is_sentinel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LedgerConfig {
    #[schemars(
        description = "Everyone allowed to appear in the money logs. When omitted, every named player in the match log is known."
    )]
    pub roster: Option<Vec<String>>,

    #[schemars(description = "chrono format string for the date columns of every table")]
    pub date_format: String,

    #[schemars(description = "Separator between names in the pooled purchases 'shared_by' column")]
    pub shared_by_delimiter: char,

    #[schemars(description = "Players need strictly more games than this to be ranked")]
    pub leaderboard_min_games: usize,

    #[schemars(description = "A game with more total points than this went beyond deuce")]
    pub deuce_threshold: u32,

    #[schemars(description = "How many recent results make up a player's form string")]
    pub form_length: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            roster: None,
            date_format: "%Y-%m-%d".to_string(),
            shared_by_delimiter: ',',
            leaderboard_min_games: 25,
            deuce_threshold: 40,
            form_length: 5,
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_format.trim().is_empty() {
            return Err(LedgerError::InvalidConfig(
                "date_format must not be empty".to_string(),
            ));
        }

        if self.form_length == 0 {
            return Err(LedgerError::InvalidConfig(
                "form_length must be at least 1".to_string(),
            ));
        }

        if let Some(roster) = &self.roster {
            if let Some(name) = roster.iter().find(|name| is_sentinel(name)) {
                return Err(LedgerError::InvalidConfig(format!(
                    "roster contains the placeholder participant '{}'",
                    name
                )));
            }
            if roster.iter().any(|name| name.trim().is_empty()) {
                return Err(LedgerError::InvalidConfig(
                    "roster contains an empty name".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The configured roster, or `players` when none is configured.
    pub fn resolve_roster(&self, players: BTreeSet<String>) -> BTreeSet<String> {
        match &self.roster {
            Some(roster) => roster.iter().map(|name| name.trim().to_string()).collect(),
            None => players,
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LedgerConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = LedgerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.leaderboard_min_games, 25);
        assert_eq!(config.deuce_threshold, 40);
    }

    #[test]
    fn test_partial_override() {
        let config =
            LedgerConfig::from_json_str(r#"{"shared_by_delimiter": ";", "roster": ["Alice", "Bob"]}"#)
                .unwrap();
        assert_eq!(config.shared_by_delimiter, ';');
        assert_eq!(config.date_format, "%Y-%m-%d");

        let roster = config.resolve_roster(BTreeSet::new());
        assert!(roster.contains("Alice"));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_roster_rejects_sentinel() {
        let result = LedgerConfig::from_json_str(r#"{"roster": ["Alice", "Other"]}"#);
        assert!(matches!(result, Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_form_length_rejected() {
        let config = LedgerConfig {
            form_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roster_falls_back_to_players() {
        let players: BTreeSet<String> = ["Carol".to_string()].into_iter().collect();
        let roster = LedgerConfig::default().resolve_roster(players.clone());
        assert_eq!(roster, players);
    }
}
