use super::{player_games, GameResult};
use crate::schema::MatchRecord;
use crate::utils::{mean, percentage, round_to};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutcomeStats {
    pub games: usize,
    pub average_points: f64,
    pub mean_margin: f64,
    pub max_margin: u32,
    pub min_margin: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PartnerStats {
    pub partner: String,
    pub games: usize,
    pub wins: usize,
    pub win_pct: f64,
    pub average_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub games: usize,
    pub wins: usize,
    pub win_pct: f64,
    pub average_points: f64,
}

/// Games, points and margins for the player's wins and for their losses.
pub fn win_loss_stats(matches: &[MatchRecord], player: &str) -> BTreeMap<GameResult, OutcomeStats> {
    let mut grouped: BTreeMap<GameResult, Vec<(u32, u32)>> = BTreeMap::new();
    for game in player_games(matches, player) {
        grouped
            .entry(game.result)
            .or_default()
            .push((game.player_team_points, game.margin()));
    }

    grouped
        .into_iter()
        .map(|(result, games)| {
            let average_points = mean(games.iter().map(|(points, _)| *points as f64)).unwrap_or(0.0);
            let mean_margin = mean(games.iter().map(|(_, margin)| *margin as f64)).unwrap_or(0.0);
            let stats = OutcomeStats {
                games: games.len(),
                average_points: round_to(average_points, 2),
                mean_margin: round_to(mean_margin, 2),
                max_margin: games.iter().map(|(_, m)| *m).max().unwrap_or(0),
                min_margin: games.iter().map(|(_, m)| *m).min().unwrap_or(0),
            };
            (result, stats)
        })
        .collect()
}

#[derive(Default)]
struct Tally {
    games: usize,
    wins: usize,
    points: u64,
}

impl Tally {
    fn add(&mut self, won: bool, points: u32) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
        self.points += points as u64;
    }

    fn average_points(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            round_to(self.points as f64 / self.games as f64, 2)
        }
    }
}

/// Record with each partner, keyed by the partner's name as written in the log.
pub fn partner_stats(matches: &[MatchRecord], player: &str) -> Vec<PartnerStats> {
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();
    for game in player_games(matches, player) {
        tallies
            .entry(game.partner.to_string())
            .or_default()
            .add(game.is_win(), game.player_team_points);
    }

    tallies
        .into_iter()
        .map(|(partner, tally)| PartnerStats {
            partner,
            games: tally.games,
            wins: tally.wins,
            win_pct: percentage(tally.wins, tally.games),
            average_points: tally.average_points(),
        })
        .collect()
}

/// The partner with the best win percentage; the first in name order on a tie.
pub fn best_partner(stats: &[PartnerStats]) -> Option<&PartnerStats> {
    stats
        .iter()
        .fold(None, |best: Option<&PartnerStats>, candidate| match best {
            Some(current) if current.win_pct >= candidate.win_pct => Some(current),
            _ => Some(candidate),
        })
}

pub fn daily_stats(matches: &[MatchRecord], player: &str) -> Vec<DailyStats> {
    let mut tallies: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
    for game in player_games(matches, player) {
        tallies
            .entry(game.record.date)
            .or_default()
            .add(game.is_win(), game.player_team_points);
    }

    tallies
        .into_iter()
        .map(|(date, tally)| DailyStats {
            date,
            games: tally.games,
            wins: tally.wins,
            win_pct: percentage(tally.wins, tally.games),
            average_points: tally.average_points(),
        })
        .collect()
}

/// The day the player played the most games; the earliest such day on a tie.
pub fn busiest_day(stats: &[DailyStats]) -> Option<&DailyStats> {
    stats
        .iter()
        .fold(None, |best: Option<&DailyStats>, candidate| match best {
            Some(current) if current.games >= candidate.games => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::game;
    use super::*;

    fn season() -> Vec<MatchRecord> {
        vec![
            game(1, "Hall A", ["Alice", "Bob"], ["Carol", "Dave"], (21, 15)),
            game(1, "Hall A", ["Alice", "Carol"], ["Bob", "Dave"], (18, 21)),
            game(1, "Hall A", ["Bob", "Alice"], ["Carol", "other"], (23, 21)),
            game(2, "Hall B", ["Alice", "other"], ["Bob", "Carol"], (21, 9)),
        ]
    }

    #[test]
    fn test_win_loss_stats() {
        let stats = win_loss_stats(&season(), "Alice");

        let wins = &stats[&GameResult::Win];
        assert_eq!(wins.games, 3);
        assert_eq!(wins.max_margin, 12);
        assert_eq!(wins.min_margin, 2);
        assert_eq!(wins.mean_margin, round_to((6.0 + 2.0 + 12.0) / 3.0, 2));
        assert_eq!(wins.average_points, round_to((21.0 + 23.0 + 21.0) / 3.0, 2));

        let losses = &stats[&GameResult::Loss];
        assert_eq!(losses.games, 1);
        assert_eq!(losses.average_points, 18.0);
    }

    #[test]
    fn test_partner_stats_and_best_partner() {
        let stats = partner_stats(&season(), "Alice");
        let names: Vec<&str> = stats.iter().map(|s| s.partner.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Carol", "other"]);

        let bob = &stats[0];
        assert_eq!(bob.games, 2);
        assert_eq!(bob.wins, 2);
        assert_eq!(bob.win_pct, 100.0);
        assert_eq!(bob.average_points, 22.0);

        assert_eq!(best_partner(&stats).unwrap().partner, "Bob");
        assert!(best_partner(&[]).is_none());
    }

    #[test]
    fn test_daily_stats_and_busiest_day() {
        let stats = daily_stats(&season(), "Alice");
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].games, 3);
        assert_eq!(stats[0].wins, 2);
        assert_eq!(stats[0].win_pct, 66.67);

        let busiest = busiest_day(&stats).unwrap();
        assert_eq!(busiest.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_unknown_player_has_no_stats() {
        assert!(win_loss_stats(&season(), "Zed").is_empty());
        assert!(partner_stats(&season(), "Zed").is_empty());
        assert!(daily_stats(&season(), "other").is_empty());
    }
}
