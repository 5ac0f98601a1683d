use std::collections::HashMap;

use super::{rank, settlement};

/// One participant's aggregate line for a section.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub user_id: String,
    pub total_points: i64,
    pub point_diff: i64,
    pub settlement: f64,
    pub rank: u32,
}

/// Aggregates a section's games into one line per participant.
///
/// `games` holds one user-to-points map per game; a participant missing
/// from a game counts as 0 for that game rather than failing. Lines come
/// back in the participants' original order regardless of rank. With zero
/// games every line carries rank 0 and the caller suppresses the table.
pub fn compute_summary(
    participant_ids: &[String],
    games: &[HashMap<String, i32>],
    return_points: i32,
    rate: i32,
) -> Vec<SummaryLine> {
    let totals: Vec<(String, i64)> = participant_ids
        .iter()
        .map(|user_id| {
            let total = games
                .iter()
                .map(|scores| *scores.get(user_id).unwrap_or(&0) as i64)
                .sum();
            (user_id.clone(), total)
        })
        .collect();

    if games.is_empty() {
        return totals
            .into_iter()
            .map(|(user_id, total_points)| SummaryLine {
                user_id,
                total_points,
                point_diff: 0,
                settlement: 0.0,
                rank: 0,
            })
            .collect();
    }

    rank::assign_ranks(&totals)
        .into_iter()
        .map(|entry| {
            let point_diff =
                settlement::session_point_diff(entry.points, games.len(), return_points);
            SummaryLine {
                user_id: entry.user_id,
                total_points: entry.points,
                point_diff,
                settlement: settlement::settle(point_diff, rate),
                rank: entry.rank,
            }
        })
        .collect()
}
