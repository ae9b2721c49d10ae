use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::MovieDetails;
use crate::services::transport::{HttpTransport, RetryPolicy, RetryingClient};

const POSTER_CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour

/// Cached poster lookup result. Absent posters are cached too, so a movie
/// without artwork does not trigger a fresh catalog call on every batch.
struct CacheEntry {
    url: Option<String>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// TTL-cached poster fetcher over the catalog API
///
/// The public surface is infallible: every transport failure, exhausted
/// retry, or malformed response is absorbed into "no poster" so one flaky
/// catalog call can never break a batch. Expiry is checked lazily at read
/// time; there is no background sweep.
pub struct PosterClient<T: HttpTransport> {
    http: RetryingClient<T>,
    api_key: String,
    api_url: String,
    image_base_url: String,
    cache: HashMap<u64, CacheEntry>,
    ttl: Duration,
}

impl<T: HttpTransport> PosterClient<T> {
    pub fn new(transport: T, api_key: String, api_url: String, image_base_url: String) -> Self {
        Self {
            http: RetryingClient::new(transport, RetryPolicy::default()),
            api_key,
            api_url,
            image_base_url,
            cache: HashMap::new(),
            ttl: POSTER_CACHE_TTL,
        }
    }

    /// Overrides the cache TTL. Intended for tests.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the poster URL for a movie, or `None` if the catalog has no
    /// poster or the fetch failed. Fresh cache entries short-circuit the
    /// network entirely.
    pub async fn fetch(&mut self, movie_id: u64) -> Option<String> {
        if let Some(entry) = self.cache.get(&movie_id) {
            if entry.is_fresh(self.ttl) {
                tracing::debug!(movie_id = movie_id, "Poster cache hit");
                return entry.url.clone();
            }
            tracing::debug!(movie_id = movie_id, "Poster cache entry expired");
        }

        let url = self.fetch_from_catalog(movie_id).await;
        self.cache.insert(
            movie_id,
            CacheEntry {
                url: url.clone(),
                fetched_at: Instant::now(),
            },
        );
        url
    }

    async fn fetch_from_catalog(&self, movie_id: u64) -> Option<String> {
        let url = format!(
            "{}/movie/{}?api_key={}&language=en-US",
            self.api_url, movie_id, self.api_key
        );

        let response = match self.http.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    movie_id = movie_id,
                    error = %e,
                    "Poster fetch failed, treating as no poster"
                );
                return None;
            }
        };

        let details: MovieDetails = match serde_json::from_str(&response.body) {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    movie_id = movie_id,
                    error = %e,
                    "Malformed catalog response, treating as no poster"
                );
                return None;
            }
        };

        match details.poster_path {
            Some(path) if !path.is_empty() => {
                Some(format!("{}{}", self.image_base_url, path))
            }
            _ => {
                tracing::debug!(movie_id = movie_id, "Catalog record has no poster");
                None
            }
        }
    }
}
