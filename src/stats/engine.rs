use std::collections::{HashMap, HashSet};

use super::models::RankCounts;
use crate::scoring::{rank, settlement, ScoreEntry};

/// Snapshot of one closed section as consumed by the aggregation
#[derive(Debug, Clone)]
pub struct SectionSnapshot {
    pub section_id: String,
    pub return_points: i32,
    pub rate: i32,
    pub participant_ids: Vec<String>,
    /// One score list per game, in game order
    pub games: Vec<Vec<ScoreEntry>>,
}

/// Aggregated totals for one user, before display-name resolution
#[derive(Debug, Clone)]
pub struct UserAggregate {
    pub user_id: String,
    pub game_count: u32,
    pub section_count: u32,
    pub win_count: u32,
    pub win_rate: f64,
    pub average_rank: f64,
    pub total_settlement: f64,
    pub rank_counts: RankCounts,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub users: Vec<UserAggregate>,
    pub total_games: u32,
    pub total_sections: u32,
}

#[derive(Default)]
struct Tally {
    sections: HashSet<String>,
    ranks: Vec<u32>,
    settlement: f64,
}

/// Aggregates per-user lifetime statistics over closed sections.
///
/// Each game is ranked on its own score rows; each score contributes a
/// per-game settlement of ((points - return_points) / 1000) x rate. This
/// per-game form deliberately differs from the section summary's
/// cumulative form. Membership alone counts toward section_count, but
/// users with zero counted games are omitted from the output entirely.
/// Output is ordered by total settlement, highest first.
pub fn aggregate(sections: &[SectionSnapshot]) -> Aggregate {
    let mut tallies: HashMap<String, Tally> = HashMap::new();
    // Encounter order keeps the output deterministic across runs
    let mut order: Vec<String> = Vec::new();
    let mut total_games = 0u32;

    for section in sections {
        for user_id in &section.participant_ids {
            if !tallies.contains_key(user_id) {
                order.push(user_id.clone());
            }
            tallies
                .entry(user_id.clone())
                .or_default()
                .sections
                .insert(section.section_id.clone());
        }

        for game in &section.games {
            total_games += 1;

            let totals: Vec<(String, i64)> = game
                .iter()
                .map(|score| (score.user_id.clone(), score.points as i64))
                .collect();
            let ranked = rank::assign_ranks(&totals);

            for (score, ranked_entry) in game.iter().zip(&ranked) {
                // Score rows from outside the roster are skipped
                let tally = match tallies.get_mut(&score.user_id) {
                    Some(tally) => tally,
                    None => continue,
                };

                tally.ranks.push(ranked_entry.rank);
                tally.settlement += settlement::per_game_settlement(
                    score.points,
                    section.return_points,
                    section.rate,
                );
            }
        }
    }

    let mut users: Vec<UserAggregate> = order
        .iter()
        .filter_map(|user_id| {
            let tally = &tallies[user_id];
            let game_count = tally.ranks.len() as u32;
            if game_count == 0 {
                return None;
            }

            let mut rank_counts = RankCounts::default();
            for rank in &tally.ranks {
                match rank {
                    1 => rank_counts.first += 1,
                    2 => rank_counts.second += 1,
                    3 => rank_counts.third += 1,
                    4 => rank_counts.fourth += 1,
                    _ => {}
                }
            }

            let win_count = rank_counts.first;
            Some(UserAggregate {
                user_id: user_id.clone(),
                game_count,
                section_count: tally.sections.len() as u32,
                win_count,
                win_rate: win_count as f64 / game_count as f64 * 100.0,
                average_rank: tally.ranks.iter().sum::<u32>() as f64 / game_count as f64,
                total_settlement: tally.settlement,
                rank_counts,
            })
        })
        .collect();

    users.sort_by(|a, b| {
        b.total_settlement
            .partial_cmp(&a.total_settlement)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Aggregate {
        users,
        total_games,
        total_sections: sections.len() as u32,
    }
}
