use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key (required)
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL for poster images, width segment included
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Path to the serialized movie table
    #[serde(default = "default_movies_path")]
    pub movies_path: String,

    /// Path to the serialized similarity matrix
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_movies_path() -> String {
    "data/movies.json".to_string()
}

fn default_similarity_path() -> String {
    "data/similarity.json".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// The API key is the only required setting; everything else has a
    /// sensible default. A missing key is a fatal startup condition and the
    /// error tells the user where to put it rather than falling back
    /// silently.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| match e {
            envy::Error::MissingValue("tmdb_api_key") => anyhow::anyhow!(
                "TMDB API key not found. Set TMDB_API_KEY in your environment \
                 or add `TMDB_API_KEY=your_key_here` to a .env file in the \
                 working directory."
            ),
            other => anyhow::anyhow!("Failed to load config: {}", other),
        })
    }
}
