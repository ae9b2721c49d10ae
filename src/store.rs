use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, SimilarityMatrix};

/// Immutable store of the movie table and its aligned similarity matrix
///
/// Loaded once at startup and shared read-only afterwards; nothing here
/// mutates after `load` returns.
pub struct MovieStore {
    pub(crate) movies: Vec<Movie>,
    pub(crate) similarity: SimilarityMatrix,
}

impl MovieStore {
    /// Loads both backing blobs and validates their alignment.
    ///
    /// Each blob is decoded as JSON first, falling back to bincode before
    /// giving up. A row-count mismatch between the table and the matrix is
    /// fatal and is never papered over by truncation or padding.
    pub fn load(
        movies_path: impl AsRef<Path>,
        similarity_path: impl AsRef<Path>,
    ) -> AppResult<Self> {
        let movies: Vec<Movie> = decode_blob(movies_path.as_ref(), "movie table")?;
        let rows: Vec<Vec<f32>> = decode_blob(similarity_path.as_ref(), "similarity matrix")?;

        let store = Self::from_parts(movies, SimilarityMatrix::new(rows))?;

        tracing::info!(
            movies = store.movies.len(),
            "Movie store loaded"
        );

        Ok(store)
    }

    /// Assembles a store from already-decoded parts, enforcing alignment.
    ///
    /// The matrix must be square against the movie table: one row per movie
    /// and every row one score per movie. A ragged row would silently
    /// shorten rankings, so it fails here instead.
    pub fn from_parts(movies: Vec<Movie>, similarity: SimilarityMatrix) -> AppResult<Self> {
        if movies.len() != similarity.rows() {
            return Err(AppError::DataIntegrity {
                expected: movies.len(),
                found: similarity.rows(),
            });
        }
        if let Some(width) = (0..similarity.rows())
            .filter_map(|i| similarity.row(i))
            .map(|row| row.len())
            .find(|&width| width != movies.len())
        {
            return Err(AppError::DataIntegrity {
                expected: movies.len(),
                found: width,
            });
        }
        Ok(Self { movies, similarity })
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn movie(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Finds the row for an exact title match. Duplicate titles resolve to
    /// the first matching row.
    pub fn find_by_title(&self, title: &str) -> Option<usize> {
        self.movies.iter().position(|m| m.title == title)
    }
}

/// Reads a blob and decodes it as JSON, falling back to bincode.
///
/// Only after both decoders fail (or the file cannot be read at all) does
/// the error surface, carrying the path and what it was supposed to hold.
fn decode_blob<T: serde::de::DeserializeOwned>(path: &Path, description: &str) -> AppResult<T> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::DataLoad(format!("{} at {}: {}", description, path.display(), e))
    })?;

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            tracing::debug!(
                path = %path.display(),
                error = %json_err,
                "JSON decode failed, trying bincode"
            );
            bincode::deserialize(&bytes).map_err(|bin_err| {
                AppError::DataLoad(format!(
                    "{} at {} is not decodable as JSON ({}) or bincode ({})",
                    description,
                    path.display(),
                    json_err,
                    bin_err
                ))
            })
        }
    }
}
