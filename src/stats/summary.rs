use super::player_games;
use crate::config::LedgerConfig;
use crate::schema::MatchRecord;
use crate::utils::{mean, percentage, round_to};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LeaderboardRow {
    pub player: String,
    pub games: usize,
    pub wins: usize,
    pub win_pct: f64,
    /// Latest results first, e.g. `"W W L W L"`.
    pub form: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VenueStats {
    pub venue: String,
    pub games: usize,
    pub average_points: f64,
    pub mean_margin: f64,
    pub max_margin: u32,
    pub min_margin: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DateSummary {
    pub date: NaiveDate,
    pub games: usize,
    pub average_points: f64,
}

/// Ranks players by win percentage. Only players with more than
/// `config.leaderboard_min_games` games are ranked; the leader is the first row.
pub fn leaderboard(matches: &[MatchRecord], config: &LedgerConfig) -> Vec<LeaderboardRow> {
    let players: BTreeSet<&str> = matches
        .iter()
        .flat_map(|m| m.players())
        .filter_map(|p| p.name())
        .collect();

    let mut rows: Vec<LeaderboardRow> = players
        .into_iter()
        .filter_map(|player| {
            let games = player_games(matches, player);
            if games.len() <= config.leaderboard_min_games {
                return None;
            }

            let wins = games.iter().filter(|g| g.is_win()).count();
            let form = games
                .iter()
                .rev()
                .take(config.form_length)
                .map(|g| g.result.letter().to_string())
                .collect::<Vec<_>>()
                .join(" ");

            Some(LeaderboardRow {
                player: player.to_string(),
                games: games.len(),
                wins,
                win_pct: percentage(wins, games.len()),
                form,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.win_pct.partial_cmp(&a.win_pct).unwrap_or(Ordering::Equal));
    rows
}

pub fn venue_stats(matches: &[MatchRecord]) -> Vec<VenueStats> {
    let mut grouped: BTreeMap<&str, Vec<&MatchRecord>> = BTreeMap::new();
    for record in matches {
        grouped.entry(record.venue.as_str()).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(venue, games)| VenueStats {
            venue: venue.to_string(),
            games: games.len(),
            average_points: round_to(
                mean(games.iter().map(|g| g.total_points() as f64)).unwrap_or(0.0),
                2,
            ),
            mean_margin: round_to(
                mean(games.iter().map(|g| g.margin() as f64)).unwrap_or(0.0),
                2,
            ),
            max_margin: games.iter().map(|g| g.margin()).max().unwrap_or(0),
            min_margin: games.iter().map(|g| g.margin()).min().unwrap_or(0),
        })
        .collect()
}

/// The venue with the most games; first in name order on a tie.
pub fn most_visited_venue(stats: &[VenueStats]) -> Option<&VenueStats> {
    stats
        .iter()
        .fold(None, |best: Option<&VenueStats>, candidate| match best {
            Some(current) if current.games >= candidate.games => Some(current),
            _ => Some(candidate),
        })
}

pub fn date_summary(matches: &[MatchRecord]) -> Vec<DateSummary> {
    let mut grouped: BTreeMap<NaiveDate, Vec<u64>> = BTreeMap::new();
    for record in matches {
        grouped
            .entry(record.date)
            .or_default()
            .push(record.total_points());
    }

    grouped
        .into_iter()
        .map(|(date, points)| DateSummary {
            date,
            games: points.len(),
            average_points: round_to(
                mean(points.iter().map(|p| *p as f64)).unwrap_or(0.0),
                2,
            ),
        })
        .collect()
}

/// The date with the most games played; the earliest such date on a tie.
pub fn busiest_date(summary: &[DateSummary]) -> Option<&DateSummary> {
    summary
        .iter()
        .fold(None, |best: Option<&DateSummary>, candidate| match best {
            Some(current) if current.games >= candidate.games => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::game;
    use super::*;

    fn config_with_min(min: usize) -> LedgerConfig {
        LedgerConfig {
            leaderboard_min_games: min,
            ..Default::default()
        }
    }

    fn season() -> Vec<MatchRecord> {
        vec![
            game(1, "Hall A", ["Alice", "Bob"], ["Carol", "Dave"], (21, 15)),
            game(1, "Hall A", ["Alice", "Carol"], ["Bob", "Dave"], (18, 21)),
            game(2, "Hall B", ["Alice", "Dave"], ["Bob", "other"], (21, 19)),
            game(3, "Hall B", ["Alice", "Bob"], ["Carol", "other"], (25, 23)),
            game(3, "Hall A", ["Carol", "Dave"], ["Alice", "Bob"], (21, 12)),
        ]
    }

    #[test]
    fn test_leaderboard_ranking_and_form() {
        let rows = leaderboard(&season(), &config_with_min(0));

        let players: Vec<&str> = rows.iter().map(|r| r.player.as_str()).collect();
        assert!(!players.contains(&"other"));
        assert_eq!(players, vec!["Dave", "Alice", "Bob", "Carol"]);
        assert_eq!(rows[0].win_pct, 75.0);

        let alice = &rows[1];
        assert_eq!(alice.games, 5);
        assert_eq!(alice.wins, 3);
        assert_eq!(alice.win_pct, 60.0);
        assert_eq!(alice.form, "L W W L W");

        for pair in rows.windows(2) {
            assert!(pair[0].win_pct >= pair[1].win_pct);
        }
    }

    #[test]
    fn test_leaderboard_min_games_threshold() {
        // Alice has 5 games, Bob 5, Carol 4, Dave 4
        let rows = leaderboard(&season(), &config_with_min(4));
        let players: Vec<&str> = rows.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(players.len(), 2);
        assert!(players.contains(&"Alice"));
        assert!(players.contains(&"Bob"));

        assert!(leaderboard(&season(), &LedgerConfig::default()).is_empty());
    }

    #[test]
    fn test_form_length() {
        let config = LedgerConfig {
            leaderboard_min_games: 0,
            form_length: 2,
            ..Default::default()
        };
        let rows = leaderboard(&season(), &config);
        let alice = rows.iter().find(|r| r.player == "Alice").unwrap();
        assert_eq!(alice.form, "L W");
    }

    #[test]
    fn test_venue_stats() {
        let stats = venue_stats(&season());
        assert_eq!(stats.len(), 2);

        let hall_a = &stats[0];
        assert_eq!(hall_a.venue, "Hall A");
        assert_eq!(hall_a.games, 3);
        assert_eq!(hall_a.max_margin, 9);
        assert_eq!(hall_a.min_margin, 3);
        assert_eq!(hall_a.average_points, round_to((36.0 + 39.0 + 33.0) / 3.0, 2));

        assert_eq!(most_visited_venue(&stats).unwrap().venue, "Hall A");
    }

    #[test]
    fn test_extreme_scores_in_summaries() {
        let matches = vec![game(1, "Hall A", ["Alice", "Bob"], ["Carol", "Dave"], (u32::MAX, 1))];

        let stats = venue_stats(&matches);
        assert_eq!(stats[0].average_points, u32::MAX as f64 + 1.0);
        assert_eq!(stats[0].max_margin, u32::MAX - 1);

        let summary = date_summary(&matches);
        assert_eq!(summary[0].average_points, u32::MAX as f64 + 1.0);
    }

    #[test]
    fn test_date_summary() {
        let summary = date_summary(&season());
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[1].games, 1);
        assert_eq!(summary[1].average_points, 40.0);

        let busiest = busiest_date(&summary).unwrap();
        assert_eq!(busiest.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
