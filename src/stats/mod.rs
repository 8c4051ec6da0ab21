//! Match statistics derived from the game log.
//!
//! Nothing here touches money. Every function is a pure view over `&[MatchRecord]`.

pub mod head_to_head;
pub mod player;
pub mod summary;

pub use head_to_head::{head_to_head, HeadToHead};
pub use player::{
    best_partner, busiest_day, daily_stats, partner_stats, win_loss_stats, DailyStats,
    OutcomeStats, PartnerStats,
};
pub use summary::{
    busiest_date, date_summary, leaderboard, most_visited_venue, venue_stats, DateSummary,
    LeaderboardRow, VenueStats,
};

use crate::schema::{MatchRecord, Participant, Team};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn letter(self) -> char {
        match self {
            GameResult::Win => 'W',
            GameResult::Loss => 'L',
        }
    }
}

/// A match seen from one player's side of the net.
#[derive(Debug, Clone)]
pub struct GameView<'a> {
    pub record: &'a MatchRecord,
    pub team: Team,
    pub partner: Participant,
    pub opponents: [Participant; 2],
    pub player_team_points: u32,
    pub other_team_points: u32,
    pub result: GameResult,
}

impl<'a> GameView<'a> {
    pub fn new(record: &'a MatchRecord, player: &str) -> Option<Self> {
        let team = record.team_of(player)?;
        let side = record.team(team);
        let partner = if side[0].is_named(player) {
            side[1].clone()
        } else {
            side[0].clone()
        };

        let player_team_points = record.points(team);
        let other_team_points = record.points(team.opposite());
        let result = if player_team_points > other_team_points {
            GameResult::Win
        } else {
            GameResult::Loss
        };

        Some(Self {
            record,
            team,
            partner,
            opponents: record.team(team.opposite()).clone(),
            player_team_points,
            other_team_points,
            result,
        })
    }

    pub fn is_win(&self) -> bool {
        self.result == GameResult::Win
    }

    pub fn total_points(&self) -> u64 {
        self.record.total_points()
    }

    pub fn margin(&self) -> u32 {
        self.record.margin()
    }

    /// True when the opponents are exactly the two named players, in either order.
    pub fn is_against(&self, a: &str, b: &str) -> bool {
        (self.opponents[0].is_named(a) && self.opponents[1].is_named(b))
            || (self.opponents[0].is_named(b) && self.opponents[1].is_named(a))
    }
}

/// Every game the player took part in, in log order.
pub fn player_games<'a>(matches: &'a [MatchRecord], player: &str) -> Vec<GameView<'a>> {
    matches
        .iter()
        .filter_map(|record| GameView::new(record, player))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::game;
    use super::*;

    #[test]
    fn test_game_view_from_each_side() {
        let record = game(1, "Hall A", ["Alice", "Bob"], ["Carol", "other"], (21, 17));

        let alice = GameView::new(&record, "Alice").unwrap();
        assert_eq!(alice.team, Team::Team1);
        assert_eq!(alice.partner, Participant::Named("Bob".to_string()));
        assert!(alice.is_win());
        assert_eq!(alice.margin(), 4);

        let carol = GameView::new(&record, "Carol").unwrap();
        assert_eq!(carol.partner, Participant::Unknown);
        assert_eq!(carol.result, GameResult::Loss);
        assert_eq!(carol.player_team_points, 17);
        assert!(carol.is_against("Bob", "Alice"));

        assert!(GameView::new(&record, "Dave").is_none());
    }

    #[test]
    fn test_player_games_keeps_log_order() {
        let matches = vec![
            game(2, "Hall A", ["Alice", "Bob"], ["Carol", "Dave"], (21, 10)),
            game(1, "Hall A", ["Carol", "Dave"], ["Eve", "Frank"], (21, 10)),
            game(1, "Hall B", ["Dave", "Alice"], ["Carol", "Bob"], (19, 21)),
        ];

        let games = player_games(&matches, "Alice");
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].result, GameResult::Win);
        assert_eq!(games[1].result, GameResult::Loss);
        assert_eq!(games[1].record.venue, "Hall B");
    }
}
