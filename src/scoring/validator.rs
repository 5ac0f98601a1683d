use std::collections::HashSet;

use super::{ScoreEntry, ScoringError};

/// Validates one game's submitted scores against the section's rules.
///
/// Checks run in order: shape (one entry per seat, every entry resolvable
/// to a section participant, no duplicate seats), quantization (points in
/// units of 100), then balance (total equals starting_points multiplied by
/// player_count). On success the entries come back unchanged and in the
/// submitted order. No side effects.
pub fn validate_scores(
    entries: &[ScoreEntry],
    participant_ids: &[String],
    starting_points: i32,
    player_count: usize,
) -> Result<Vec<ScoreEntry>, ScoringError> {
    if entries.len() != player_count {
        return Err(ScoringError::Shape {
            expected: player_count,
            actual: entries.len(),
        });
    }

    let mut seen = HashSet::new();
    for entry in entries {
        if !participant_ids.contains(&entry.user_id) {
            return Err(ScoringError::UnknownParticipant {
                user_id: entry.user_id.clone(),
            });
        }
        if !seen.insert(entry.user_id.as_str()) {
            return Err(ScoringError::DuplicateParticipant {
                user_id: entry.user_id.clone(),
            });
        }
    }

    for entry in entries {
        if entry.points % 100 != 0 {
            return Err(ScoringError::Quantization {
                user_id: entry.user_id.clone(),
                points: entry.points,
            });
        }
    }

    let expected = starting_points as i64 * player_count as i64;
    let actual: i64 = entries.iter().map(|e| e.points as i64).sum();
    if actual != expected {
        return Err(ScoringError::Balance { expected, actual });
    }

    Ok(entries.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn participants() -> Vec<String> {
        vec![
            "alice".to_string(),
            "bob".to_string(),
            "chiyo".to_string(),
            "daiki".to_string(),
        ]
    }

    fn balanced_entries() -> Vec<ScoreEntry> {
        vec![
            ScoreEntry::new("alice", 45000),
            ScoreEntry::new("bob", 32000),
            ScoreEntry::new("chiyo", 15000),
            ScoreEntry::new("daiki", 8000),
        ]
    }

    #[test]
    fn accepts_balanced_submission_in_order() {
        let entries = balanced_entries();
        let validated = validate_scores(&entries, &participants(), 25000, 4).unwrap();

        assert_eq!(validated, entries);
    }

    #[test]
    fn rejects_wrong_entry_count() {
        let entries = vec![
            ScoreEntry::new("alice", 50000),
            ScoreEntry::new("bob", 50000),
        ];

        let err = validate_scores(&entries, &participants(), 25000, 4).unwrap_err();
        assert_eq!(
            err,
            ScoringError::Shape {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn rejects_unknown_participant() {
        let mut entries = balanced_entries();
        entries[2].user_id = "stranger".to_string();

        let err = validate_scores(&entries, &participants(), 25000, 4).unwrap_err();
        assert!(matches!(err, ScoringError::UnknownParticipant { user_id } if user_id == "stranger"));
    }

    #[test]
    fn rejects_duplicate_participant() {
        let mut entries = balanced_entries();
        entries[3].user_id = "alice".to_string();

        let err = validate_scores(&entries, &participants(), 25000, 4).unwrap_err();
        assert!(matches!(err, ScoringError::DuplicateParticipant { user_id } if user_id == "alice"));
    }

    #[rstest]
    #[case(24950, false)]
    #[case(25000, true)]
    #[case(-100, true)]
    #[case(150, false)]
    #[case(0, true)]
    fn quantization_requires_units_of_100(#[case] points: i32, #[case] accepted: bool) {
        let entries = vec![
            ScoreEntry::new("alice", points),
            ScoreEntry::new("bob", 100000 - points),
            ScoreEntry::new("chiyo", 0),
            ScoreEntry::new("daiki", 0),
        ];

        let result = validate_scores(&entries, &participants(), 25000, 4);
        if accepted {
            assert!(result.is_ok(), "{points} should be accepted");
        } else {
            assert!(
                matches!(result, Err(ScoringError::Quantization { .. })),
                "{points} should be rejected"
            );
        }
    }

    #[test]
    fn balance_error_carries_expected_actual_and_diff() {
        let entries = vec![
            ScoreEntry::new("alice", 45000),
            ScoreEntry::new("bob", 32000),
            ScoreEntry::new("chiyo", 15000),
            ScoreEntry::new("daiki", 7000),
        ];

        let err = validate_scores(&entries, &participants(), 25000, 4).unwrap_err();
        assert_eq!(
            err,
            ScoringError::Balance {
                expected: 100000,
                actual: 99000
            }
        );
        assert_eq!(err.balance_diff(), Some(1000));
        assert!(err.to_string().contains("off by 1000"));
    }

    #[test]
    fn balance_diff_is_signed() {
        let entries = vec![
            ScoreEntry::new("alice", 45000),
            ScoreEntry::new("bob", 32000),
            ScoreEntry::new("chiyo", 15000),
            ScoreEntry::new("daiki", 9000),
        ];

        let err = validate_scores(&entries, &participants(), 25000, 4).unwrap_err();
        assert_eq!(err.balance_diff(), Some(-1000));
    }

    #[test]
    fn three_player_sections_validate_against_their_own_total() {
        let entries = vec![
            ScoreEntry::new("alice", 50000),
            ScoreEntry::new("bob", 30000),
            ScoreEntry::new("chiyo", 25000),
        ];
        let participants = vec![
            "alice".to_string(),
            "bob".to_string(),
            "chiyo".to_string(),
        ];

        let validated = validate_scores(&entries, &participants, 35000, 3).unwrap();
        assert_eq!(validated.len(), 3);
    }
}
