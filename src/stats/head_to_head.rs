use super::{player_games, GameView};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::schema::{is_sentinel, MatchRecord};
use crate::utils::{mean, round_to};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One side's numbers in a pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SideStats {
    pub players: [String; 2],
    pub wins: usize,
    pub average_points: f64,
    /// `None` when the side never won.
    pub average_win_margin: Option<f64>,
    pub min_points: u32,
    pub largest_win: Option<String>,
    pub wins_after_deuce: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HeadToHead {
    pub team_a: SideStats,
    pub team_b: SideStats,
    pub games: usize,
    pub average_points_per_game: f64,
    /// Average over every logged game, as a reference point for this pairing.
    pub overall_average_points_per_game: f64,
    pub average_margin: f64,
    pub games_beyond_deuce: usize,
    pub longest_game: String,
    pub most_recent_game: String,
}

/// Compares two fixed pairs over every game they played against each other.
///
/// Returns `Ok(None)` when the pairs never met.
pub fn head_to_head(
    matches: &[MatchRecord],
    team_a: [&str; 2],
    team_b: [&str; 2],
    config: &LedgerConfig,
) -> Result<Option<HeadToHead>> {
    validate_teams(team_a, team_b)?;

    let games: Vec<GameView<'_>> = player_games(matches, team_a[0])
        .into_iter()
        .filter(|g| g.partner.is_named(team_a[1]) && g.is_against(team_b[0], team_b[1]))
        .collect();

    if games.is_empty() {
        return Ok(None);
    }

    let deuce = u64::from(config.deuce_threshold);

    let a_wins: Vec<&GameView<'_>> = games.iter().filter(|g| g.is_win()).collect();
    let b_wins: Vec<&GameView<'_>> = games.iter().filter(|g| !g.is_win()).collect();

    let team_a_stats = SideStats {
        players: [team_a[0].to_string(), team_a[1].to_string()],
        wins: a_wins.len(),
        average_points: average(games.iter().map(|g| u64::from(g.player_team_points))),
        average_win_margin: mean(a_wins.iter().map(|g| g.margin() as f64)).map(|m| round_to(m, 2)),
        min_points: games.iter().map(|g| g.player_team_points).min().unwrap_or(0),
        largest_win: largest_win(&a_wins),
        wins_after_deuce: (!a_wins.is_empty())
            .then(|| a_wins.iter().filter(|g| g.total_points() > deuce).count()),
    };

    let team_b_stats = SideStats {
        players: [team_b[0].to_string(), team_b[1].to_string()],
        wins: b_wins.len(),
        average_points: average(games.iter().map(|g| u64::from(g.other_team_points))),
        average_win_margin: mean(b_wins.iter().map(|g| g.margin() as f64)).map(|m| round_to(m, 2)),
        min_points: games.iter().map(|g| g.other_team_points).min().unwrap_or(0),
        largest_win: largest_win(&b_wins),
        wins_after_deuce: (!b_wins.is_empty())
            .then(|| b_wins.iter().filter(|g| g.total_points() > deuce).count()),
    };

    let longest = games
        .iter()
        .fold(None, |best: Option<&GameView<'_>>, g| match best {
            Some(current) if current.total_points() >= g.total_points() => Some(current),
            _ => Some(g),
        });
    // max_by_key keeps the last of equal dates, i.e. the latest entry in the log
    let most_recent = games.iter().max_by_key(|g| g.record.date);

    Ok(Some(HeadToHead {
        team_a: team_a_stats,
        team_b: team_b_stats,
        games: games.len(),
        average_points_per_game: average(games.iter().map(|g| g.total_points())),
        overall_average_points_per_game: average(matches.iter().map(|m| m.total_points())),
        average_margin: average(games.iter().map(|g| u64::from(g.margin()))),
        games_beyond_deuce: games.iter().filter(|g| g.total_points() > deuce).count(),
        longest_game: longest.map(|g| g.record.describe()).unwrap_or_default(),
        most_recent_game: most_recent.map(|g| g.record.describe()).unwrap_or_default(),
    }))
}

fn validate_teams(team_a: [&str; 2], team_b: [&str; 2]) -> Result<()> {
    let names: Vec<&str> = team_a.iter().chain(team_b.iter()).map(|n| n.trim()).collect();

    if let Some(name) = names.iter().find(|n| is_sentinel(n)) {
        return Err(LedgerError::InvalidTeams(format!(
            "'{}' is not a tracked player",
            name
        )));
    }

    let distinct: BTreeSet<&str> = names.iter().copied().collect();
    if distinct.len() != 4 {
        return Err(LedgerError::InvalidTeams(
            "the four players must be distinct".to_string(),
        ));
    }

    Ok(())
}

fn average<I>(values: I) -> f64
where
    I: IntoIterator<Item = u64>,
{
    round_to(mean(values.into_iter().map(|v| v as f64)).unwrap_or(0.0), 2)
}

fn largest_win(wins: &[&GameView<'_>]) -> Option<String> {
    wins.iter()
        .fold(None, |best: Option<&&GameView<'_>>, g| match best {
            Some(current) if current.margin() >= g.margin() => Some(current),
            _ => Some(g),
        })
        .map(|g| g.record.describe())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::game;
    use super::*;

    fn rivalry() -> Vec<MatchRecord> {
        vec![
            game(1, "Hall A", ["Alice", "Bob"], ["Carol", "Dave"], (21, 15)),
            game(1, "Hall A", ["Dave", "Carol"], ["Bob", "Alice"], (23, 21)),
            game(2, "Hall B", ["Alice", "Bob"], ["Carol", "Eve"], (21, 5)),
            game(2, "Hall B", ["Bob", "Alice"], ["Dave", "Carol"], (21, 10)),
            game(3, "Hall A", ["Alice", "Carol"], ["Bob", "Dave"], (21, 19)),
        ]
    }

    #[test]
    fn test_head_to_head_counts_both_orientations() {
        let h2h = head_to_head(
            &rivalry(),
            ["Alice", "Bob"],
            ["Carol", "Dave"],
            &LedgerConfig::default(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(h2h.games, 3);
        assert_eq!(h2h.team_a.wins, 2);
        assert_eq!(h2h.team_b.wins, 1);
        assert_eq!(h2h.games_beyond_deuce, 1);
        assert_eq!(h2h.team_a.min_points, 21);
        assert_eq!(h2h.team_b.min_points, 10);
        assert_eq!(h2h.team_a.average_win_margin, Some(8.5));
        assert_eq!(h2h.team_b.average_win_margin, Some(2.0));
        assert_eq!(h2h.team_a.wins_after_deuce, Some(0));
        assert_eq!(h2h.team_b.wins_after_deuce, Some(1));
        assert_eq!(h2h.team_a.average_points, 21.0);
        assert_eq!(h2h.team_b.average_points, 16.0);
        assert_eq!(h2h.average_points_per_game, round_to((36.0 + 44.0 + 31.0) / 3.0, 2));
        assert_eq!(h2h.overall_average_points_per_game, round_to(177.0 / 5.0, 2));

        assert!(h2h.longest_game.starts_with("44 points"));
        assert!(h2h.most_recent_game.contains("2024-03-02"));
        assert!(h2h.team_a.largest_win.as_deref().unwrap().contains("21 - 10"));
    }

    #[test]
    fn test_pairs_that_never_met() {
        let result = head_to_head(
            &rivalry(),
            ["Alice", "Eve"],
            ["Carol", "Dave"],
            &LedgerConfig::default(),
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_side_without_wins() {
        let matches = vec![game(1, "Hall A", ["Alice", "Bob"], ["Carol", "Dave"], (21, 3))];
        let h2h = head_to_head(&matches, ["Carol", "Dave"], ["Alice", "Bob"], &LedgerConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(h2h.team_a.wins, 0);
        assert_eq!(h2h.team_a.average_win_margin, None);
        assert_eq!(h2h.team_a.largest_win, None);
        assert_eq!(h2h.team_a.wins_after_deuce, None);
        assert_eq!(h2h.team_b.wins_after_deuce, Some(0));
    }

    #[test]
    fn test_head_to_head_schema() {
        let schema = serde_json::to_string(&schemars::schema_for!(HeadToHead)).unwrap();
        assert!(schema.contains("average_win_margin"));
        assert!(schema.contains("most_recent_game"));
    }

    #[test]
    fn test_teams_must_be_distinct() {
        let err = head_to_head(
            &rivalry(),
            ["Alice", "Bob"],
            ["Bob", "Dave"],
            &LedgerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTeams(_)));

        assert!(head_to_head(
            &rivalry(),
            ["Alice", "other"],
            ["Carol", "Dave"],
            &LedgerConfig::default(),
        )
        .is_err());
    }
}
