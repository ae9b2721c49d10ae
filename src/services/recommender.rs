use crate::error::{AppError, AppResult};
use crate::store::MovieStore;

/// Ranks every other movie by similarity to the given title.
///
/// Resolution is an exact title match; with duplicate titles the first row
/// wins. The returned indices are sorted by descending similarity score,
/// ties keeping their original row order, and never include the query row.
/// Computed fresh on every call; the matrix is read-only.
pub fn rank(store: &MovieStore, title: &str) -> AppResult<Vec<usize>> {
    let query = store
        .find_by_title(title)
        .ok_or_else(|| AppError::MovieNotFound(title.to_string()))?;

    let similarity = store.similarity();
    let row = similarity.row(query).ok_or(AppError::IndexOutOfRange {
        index: query,
        rows: similarity.rows(),
    })?;

    let mut scored: Vec<(usize, f32)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(j, _)| j != query)
        .collect();

    // Stable sort keeps ascending row order among equal scores.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    tracing::debug!(title = %title, query_row = query, candidates = scored.len(), "Ranked candidates");

    Ok(scored.into_iter().map(|(j, _)| j).collect())
}
