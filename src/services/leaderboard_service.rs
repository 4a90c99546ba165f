//! Leaderboard ranking service
//!
//! Serves the ordered ranking per contest from a cached snapshot that is a
//! derived view over ContestPoints, never a second source of truth. The
//! scoring engine invalidates a contest's snapshot on every commit and the
//! next reader rebuilds it from a single consistent store read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::constants::MAX_LEADERBOARD_ENTRIES;
use crate::error::{AppError, AppResult};
use crate::models::Contest;
use crate::store::Store;

/// One ranked leaderboard row
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position in the total order; the tie-break chain (points
    /// descending, earliest last success, then user id) is total, so ranks
    /// are strictly sequential and deterministic across queries
    pub rank: i64,
    pub user_id: Uuid,
    pub user_name: String,
    pub points: i64,
    pub solved_count: i64,
    pub last_submission_time: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct CacheSlot {
    /// Bumped on every invalidation; a rebuild only publishes its snapshot
    /// if no commit intervened since it read the store, so the cache can be
    /// stale but never misses a commit forever
    generation: u64,
    snapshot: Option<std::sync::Arc<Vec<LeaderboardEntry>>>,
}

/// Leaderboard service holding the per-contest snapshot cache
#[derive(Default)]
pub struct LeaderboardService {
    cache: Mutex<HashMap<Uuid, CacheSlot>>,
}

impl LeaderboardService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a contest's cached snapshot after a scoring commit
    pub async fn invalidate(&self, contest_id: &Uuid) {
        let mut cache = self.cache.lock().await;
        let slot = cache.entry(*contest_id).or_default();
        slot.generation += 1;
        slot.snapshot = None;
        debug!(%contest_id, generation = slot.generation, "Leaderboard invalidated");
    }

    /// Top `limit` entries for a visible contest, at most 100
    pub async fn get_top(
        &self,
        store: &dyn Store,
        contest_id: &Uuid,
        limit: usize,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let contest = store
            .contest_by_id(contest_id)
            .await?
            .filter(Contest::is_visible)
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        let limit = limit.clamp(1, MAX_LEADERBOARD_ENTRIES);

        let generation = {
            let mut cache = self.cache.lock().await;
            let slot = cache.entry(contest.id).or_default();
            if let Some(snapshot) = &slot.snapshot {
                return Ok(snapshot.iter().take(limit).cloned().collect());
            }
            slot.generation
        };

        let entries = self.rebuild(store, &contest.id).await?;
        let snapshot = std::sync::Arc::new(entries);

        {
            let mut cache = self.cache.lock().await;
            let slot = cache.entry(contest.id).or_default();
            if slot.generation == generation {
                slot.snapshot = Some(std::sync::Arc::clone(&snapshot));
            }
        }

        Ok(snapshot.iter().take(limit).cloned().collect())
    }

    async fn rebuild(
        &self,
        store: &dyn Store,
        contest_id: &Uuid,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let rows = store
            .top_contest_points(contest_id, MAX_LEADERBOARD_ENTRIES)
            .await?;

        let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
        let names = store.display_names(&user_ids).await?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| LeaderboardEntry {
                rank: (index + 1) as i64,
                user_name: names
                    .get(&row.user_id)
                    .cloned()
                    .unwrap_or_else(|| row.user_id.to_string()),
                user_id: row.user_id,
                points: row.points,
                solved_count: row.solved_count,
                last_submission_time: row.last_successful_submission_at,
            })
            .collect())
    }
}
