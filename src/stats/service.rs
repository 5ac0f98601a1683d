use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    engine::{self, SectionSnapshot},
    models::{DateRange, StatsResult, UserStats},
};
use crate::{
    game::repository::GameRepository,
    scoring::ScoreEntry,
    section::repository::SectionRepository,
    shared::AppError,
    user::repository::UserRepository,
};

/// Service assembling closed-section snapshots for the aggregation
/// engine. Statistics only ever cover closed sections; open ones are
/// still in play.
pub struct StatsService {
    sections: Arc<dyn SectionRepository + Send + Sync>,
    games: Arc<dyn GameRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl StatsService {
    pub fn new(
        sections: Arc<dyn SectionRepository + Send + Sync>,
        games: Arc<dyn GameRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            sections,
            games,
            users,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_stats(&self, range: DateRange) -> Result<StatsResult, AppError> {
        let (from, to_exclusive) = resolve_bounds(&range);
        let sections = self.sections.closed_sections(from, to_exclusive).await?;
        debug!(section_count = sections.len(), "Closed sections in range");

        let mut snapshots = Vec::with_capacity(sections.len());
        for section in &sections {
            let participants = self.sections.participants(&section.id).await?;
            let games = self.games.games_with_scores(&section.id).await?;

            snapshots.push(SectionSnapshot {
                section_id: section.id.clone(),
                return_points: section.return_points,
                rate: section.rate,
                participant_ids: participants.into_iter().map(|p| p.user_id).collect(),
                games: games
                    .into_iter()
                    .map(|(_, scores)| {
                        scores
                            .into_iter()
                            .map(|s| ScoreEntry::new(s.user_id, s.points))
                            .collect()
                    })
                    .collect(),
            });
        }

        let aggregate = engine::aggregate(&snapshots);

        let user_ids: Vec<String> = aggregate.users.iter().map(|u| u.user_id.clone()).collect();
        let names = self.users.display_names(&user_ids).await?;

        Ok(StatsResult {
            users: aggregate
                .users
                .into_iter()
                .map(|u| UserStats {
                    display_name: names
                        .get(&u.user_id)
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string()),
                    user_id: u.user_id,
                    game_count: u.game_count,
                    section_count: u.section_count,
                    win_count: u.win_count,
                    win_rate: u.win_rate,
                    average_rank: u.average_rank,
                    total_settlement: u.total_settlement,
                    rank_counts: u.rank_counts,
                })
                .collect(),
            total_games: aggregate.total_games,
            total_sections: aggregate.total_sections,
        })
    }

    /// The same aggregate narrowed to one user; None when the user has
    /// no counted games in the range.
    #[instrument(skip(self))]
    pub async fn get_user_stats(
        &self,
        user_id: &str,
        range: DateRange,
    ) -> Result<Option<UserStats>, AppError> {
        let result = self.get_stats(range).await?;
        Ok(result.users.into_iter().find(|u| u.user_id == user_id))
    }
}

/// Resolves calendar days to instants: `from` at its own midnight
/// (inclusive), `to` as an exclusive bound at the start of the following
/// day, so the whole `to` day is included.
fn resolve_bounds(range: &DateRange) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let from = range
        .from
        .map(|day| Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)));
    let to_exclusive = range
        .to
        .and_then(|day| day.succ_opt())
        .map(|day| Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)));
    (from, to_exclusive)
}
