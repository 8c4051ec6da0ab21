use crate::schema::MatchRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Distinct tracked players on one match day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSet {
    pub participants: BTreeSet<String>,
    pub count: usize,
}

impl AttendanceSet {
    pub fn contains(&self, name: &str) -> bool {
        self.participants.contains(name)
    }
}

pub type AttendanceMap = BTreeMap<NaiveDate, AttendanceSet>;

/// Groups matches by date and collects who played.
///
/// Untracked players are dropped here. A date where only untracked players appear is kept
/// with a count of zero so cost allocation can refuse to split over it.
pub fn resolve_attendance(matches: &[MatchRecord]) -> AttendanceMap {
    let mut attendance: AttendanceMap = BTreeMap::new();

    for record in matches {
        let day = attendance.entry(record.date).or_default();
        for player in record.players() {
            if let Some(name) = player.name() {
                day.participants.insert(name.to_string());
            }
        }
    }

    for day in attendance.values_mut() {
        day.count = day.participants.len();
    }

    attendance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Participant;

    fn game(date: NaiveDate, players: [&str; 4]) -> MatchRecord {
        MatchRecord {
            date,
            venue: "Hall A".to_string(),
            team_1: [Participant::parse(players[0]), Participant::parse(players[1])],
            team_2: [Participant::parse(players[2]), Participant::parse(players[3])],
            points_team_1: 21,
            points_team_2: 17,
        }
    }

    #[test]
    fn test_union_across_matches_of_a_day() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let matches = vec![
            game(d1, ["Alice", "Bob", "Carol", "Dave"]),
            game(d1, ["Alice", "Carol", "Bob", "Eve"]),
            game(d2, ["Alice", "other", "Bob", "other"]),
        ];

        let attendance = resolve_attendance(&matches);

        assert_eq!(attendance.len(), 2);
        assert_eq!(attendance[&d1].count, 5);
        assert!(attendance[&d1].contains("Eve"));
        assert_eq!(attendance[&d2].count, 2);
        assert!(!attendance[&d2].contains("other"));
    }

    #[test]
    fn test_sentinel_only_day_has_zero_count() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let attendance = resolve_attendance(&[game(d, ["other", "other", "other", "other"])]);

        assert_eq!(attendance[&d].count, 0);
        assert!(attendance[&d].participants.is_empty());
    }

    #[test]
    fn test_no_matches() {
        assert!(resolve_attendance(&[]).is_empty());
    }
}
