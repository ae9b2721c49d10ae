use serde::{Deserialize, Serialize};

/// A movie in the loaded table
///
/// Identified by its row position in the table; `id` is the catalog
/// (TMDB) identifier used for poster lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
}

/// Square matrix of pairwise similarity scores, row/column aligned to the
/// movie table by index.
///
/// Alignment with the movie table is enforced by the store at load time,
/// not here. Symmetry is assumed but not checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatrix(pub(crate) Vec<Vec<f32>>);

impl SimilarityMatrix {
    pub fn new(rows: Vec<Vec<f32>>) -> Self {
        Self(rows)
    }

    pub fn rows(&self) -> usize {
        self.0.len()
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        self.0.get(i).map(|r| r.as_slice())
    }
}

/// One materialized recommendation, ready for display
///
/// `poster_url` is `None` both when the catalog has no poster and when the
/// fetch failed; the two cases are only distinguished in logs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    pub poster_url: Option<String>,
}

/// Catalog API movie detail record. Only the poster path matters here;
/// every other field in the response is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
}
