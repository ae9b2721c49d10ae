pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Movie, Recommendation, SimilarityMatrix};
pub use session::RecommendationSession;
pub use store::MovieStore;
