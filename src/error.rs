use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Backing data blob is missing or undecodable by every known format
    #[error("Failed to load data: {0}")]
    DataLoad(String),

    /// Movie table and similarity matrix are out of alignment, either in
    /// row count or in the width of some row.
    ///
    /// Never auto-corrected by truncation or padding; the caller must stop.
    #[error("Data mismatch: movie table and similarity matrix are misaligned (expected {expected}, found {found})")]
    DataIntegrity { expected: usize, found: usize },

    #[error("Movie not found: {0}")]
    MovieNotFound(String),

    /// A resolved row index fell outside the similarity matrix. The store
    /// validates alignment at load time, so hitting this is a bug signal.
    #[error("Row index {index} out of range for {rows} similarity rows")]
    IndexOutOfRange { index: usize, rows: usize },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Catalog API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;
