use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::Recommendation;
use crate::services::poster::PosterClient;
use crate::services::recommender;
use crate::services::transport::HttpTransport;
use crate::store::MovieStore;

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Pause after this many poster fetches within a single batch.
const FETCHES_PER_PAUSE: usize = 5;
const COURTESY_PAUSE: Duration = Duration::from_millis(200);

/// Pagination state for the currently selected movie
struct ActiveQuery {
    title: String,
    ranked: Vec<usize>,
    revealed: usize,
    materialized: Vec<Recommendation>,
}

/// One presenter-facing recommendation session
///
/// Drives the select → materialize → "more" loop: ranking is computed fresh
/// per selected movie, reveal count grows in fixed batches capped at the
/// candidate total, and `materialized` only ever grows by appending — an
/// already-shown entry is never refetched, reordered, or dropped.
pub struct RecommendationSession<T: HttpTransport> {
    store: Arc<MovieStore>,
    posters: PosterClient<T>,
    batch_size: usize,
    active: Option<ActiveQuery>,
}

impl<T: HttpTransport> RecommendationSession<T> {
    pub fn new(store: Arc<MovieStore>, posters: PosterClient<T>) -> Self {
        Self::with_batch_size(store, posters, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(
        store: Arc<MovieStore>,
        posters: PosterClient<T>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            posters,
            batch_size: batch_size.max(1),
            active: None,
        }
    }

    /// Selects a movie, resetting pagination state.
    ///
    /// Selecting the movie that is already active is a no-op: state and
    /// materialized results are preserved. A failed lookup leaves the
    /// previous selection untouched.
    pub fn select_movie(&mut self, title: &str) -> AppResult<()> {
        if let Some(active) = &self.active {
            if active.title == title {
                tracing::debug!(title = %title, "Movie already selected, keeping state");
                return Ok(());
            }
        }

        let ranked = recommender::rank(&self.store, title)?;
        let revealed = self.batch_size.min(ranked.len());

        tracing::info!(title = %title, candidates = ranked.len(), "New movie selected");

        self.active = Some(ActiveQuery {
            title: title.to_string(),
            ranked,
            revealed,
            materialized: Vec::new(),
        });

        Ok(())
    }

    /// Grows the reveal count by one batch, capped at the candidate total.
    /// Returns false when nothing is selected or all results are already
    /// revealed.
    pub fn request_more(&mut self) -> bool {
        let Some(active) = &mut self.active else {
            return false;
        };
        if active.revealed >= active.ranked.len() {
            return false;
        }
        active.revealed = (active.revealed + self.batch_size).min(active.ranked.len());
        true
    }

    /// Materializes everything revealed but not yet fetched, in rank order,
    /// and returns the newly materialized slice.
    ///
    /// Posters that cannot be fetched are recorded as `None` rather than
    /// omitted, so titles and posters stay index-aligned. After every few
    /// fetches a short courtesy pause keeps the catalog API from seeing a
    /// burst.
    pub async fn next_batch(&mut self) -> AppResult<&[Recommendation]> {
        let Some(active) = &mut self.active else {
            return Ok(&[]);
        };

        let start = active.materialized.len();
        let pending = active.revealed.saturating_sub(start);

        for (fetched, rank_pos) in (start..active.revealed).enumerate() {
            let idx = active.ranked[rank_pos];
            let movie = self.store.movie(idx).ok_or(AppError::IndexOutOfRange {
                index: idx,
                rows: self.store.len(),
            })?;

            let poster_url = self.posters.fetch(movie.id).await;
            active.materialized.push(Recommendation {
                title: movie.title.clone(),
                poster_url,
            });

            let done = fetched + 1;
            if done % FETCHES_PER_PAUSE == 0 && done < pending {
                tokio::time::sleep(COURTESY_PAUSE).await;
            }
        }

        Ok(&active.materialized[start..])
    }

    /// Everything materialized so far for the active movie, in rank order.
    pub fn current_batch(&self) -> &[Recommendation] {
        self.active
            .as_ref()
            .map(|a| a.materialized.as_slice())
            .unwrap_or(&[])
    }

    /// True once every ranked candidate has been revealed.
    pub fn is_complete(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| a.revealed == a.ranked.len())
            .unwrap_or(false)
    }

    pub fn selected_title(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.title.as_str())
    }

    /// Total number of ranked candidates for the active movie.
    pub fn total_candidates(&self) -> usize {
        self.active.as_ref().map(|a| a.ranked.len()).unwrap_or(0)
    }
}
