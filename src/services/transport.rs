use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_IDLE_CONNECTIONS: usize = 20;

/// Minimal view of an HTTP response: status plus the full body
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Single "perform one GET" primitive
///
/// The retry client layers on top of this, so retry behavior is testable
/// against a scripted fake without any real sockets.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> AppResult<TransportResponse>;
}

/// Transport backed by a pooled reqwest client
///
/// Connections are reused across the many sequential catalog calls a
/// session makes, amortizing TLS setup. Each attempt is bounded by a fixed
/// timeout; the retry layer bounds the total.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(ATTEMPT_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> AppResult<TransportResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// Retry parameters for idempotent GETs
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub retryable_statuses: &'static [u16],
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            retryable_statuses: &[429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    fn is_retryable(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Exponential schedule: base * 2^(attempt-1)
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(6);
        self.backoff_base
            .checked_mul(1 << exponent)
            .unwrap_or(self.backoff_base)
    }
}

/// GET client that retries retryable failures with exponential backoff
///
/// Transport errors and the retryable status set are retried up to
/// `max_attempts`; any other non-success status fails immediately. Only for
/// idempotent GETs.
pub struct RetryingClient<T: HttpTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: HttpTransport> RetryingClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    #[cfg(test)]
    pub(crate) fn transport_ref(&self) -> &T {
        &self.transport
    }

    pub async fn get(&self, url: &str) -> AppResult<TransportResponse> {
        let mut attempt = 1u32;
        loop {
            let outcome = self.transport.get(url).await;

            match outcome {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if self.policy.is_retryable(response.status) => {
                    if attempt >= self.policy.max_attempts {
                        return Err(AppError::Api {
                            status: response.status,
                            body: response.body,
                        });
                    }
                    let delay = self.policy.backoff_delay(attempt);
                    tracing::warn!(
                        status = response.status,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retryable status from catalog API, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => {
                    return Err(AppError::Api {
                        status: response.status,
                        body: response.body,
                    });
                }
                Err(e) => {
                    if attempt >= self.policy.max_attempts {
                        return Err(e);
                    }
                    let delay = self.policy.backoff_delay(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transport error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            attempt += 1;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted transport: pops one canned outcome per call and counts calls
    pub(crate) struct FakeTransport {
        responses: Mutex<VecDeque<AppResult<TransportResponse>>>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeTransport {
        pub(crate) fn new(responses: Vec<AppResult<TransportResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn ok(status: u16, body: &str) -> AppResult<TransportResponse> {
            Ok(TransportResponse {
                status,
                body: body.to_string(),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(&self, _url: &str) -> AppResult<TransportResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Internal("fake transport exhausted".into())))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let transport = FakeTransport::new(vec![FakeTransport::ok(200, "{}")]);
        let client = RetryingClient::new(transport, RetryPolicy::default());

        let response = client.get("http://test.local/movie/1").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(client.transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_retryable_status_then_succeeds() {
        let transport = FakeTransport::new(vec![
            FakeTransport::ok(503, "unavailable"),
            FakeTransport::ok(503, "unavailable"),
            FakeTransport::ok(200, r#"{"ok":true}"#),
        ]);
        let client = RetryingClient::new(transport, RetryPolicy::default());

        let response = client.get("http://test.local/movie/1").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(client.transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_status_fails_immediately() {
        let transport = FakeTransport::new(vec![
            FakeTransport::ok(404, "not found"),
            FakeTransport::ok(200, "{}"),
        ]);
        let client = RetryingClient::new(transport, RetryPolicy::default());

        let result = client.get("http://test.local/movie/1").await;
        assert!(matches!(result, Err(AppError::Api { status: 404, .. })));
        assert_eq!(client.transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let transport = FakeTransport::new(vec![
            FakeTransport::ok(500, "boom"),
            FakeTransport::ok(502, "boom"),
            FakeTransport::ok(503, "boom"),
            FakeTransport::ok(200, "never reached"),
        ]);
        let client = RetryingClient::new(transport, RetryPolicy::default());

        let result = client.get("http://test.local/movie/1").await;
        assert!(matches!(result, Err(AppError::Api { status: 503, .. })));
        assert_eq!(client.transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transport_errors() {
        let transport = FakeTransport::new(vec![
            Err(AppError::Internal("connection reset".into())),
            FakeTransport::ok(200, "{}"),
        ]);
        let client = RetryingClient::new(transport, RetryPolicy::default());

        let response = client.get("http://test.local/movie/1").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(client.transport.call_count(), 2);
    }

    #[test]
    fn test_backoff_schedule_is_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(4));
    }
}
