use std::time::Duration;

use reqwest::{StatusCode, header::HeaderMap};
use tokio::time::sleep;
use tracing::warn;

use crate::client::{GenerationRequest, GenerativeModel, ModelError};

pub const DEFAULT_MAX_RETRIES: usize = 1;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// How often, and how patiently, transient failures are retried.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay before the next attempt. A server hint wins when it is longer.
    pub fn wait_for(&self, delay: Duration, retry_after: Option<Duration>) -> Duration {
        let wait = match retry_after {
            Some(hint) if hint > delay => hint,
            _ => delay,
        };
        wait.min(self.max_delay)
    }

    pub fn next_delay(&self, current: Duration) -> Duration {
        current
            .saturating_mul(2)
            .max(self.base_delay)
            .min(self.max_delay)
    }
}

/// A model client that retries rate-limited and unavailable responses.
///
/// Build one per process and hand it to the orchestrator by reference.
#[derive(Clone, Debug)]
pub struct Retrying<M> {
    inner: M,
    policy: RetryPolicy,
}

impl<M: GenerativeModel> Retrying<M> {
    pub fn new(inner: M) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: M, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<M: GenerativeModel> GenerativeModel for Retrying<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn supports_media(&self) -> bool {
        self.inner.supports_media()
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ModelError> {
        let mut attempt = 0usize;
        let mut delay = self.policy.base_delay;
        loop {
            match self.inner.generate(request).await {
                Err(err) if err.is_transient() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let wait = self.policy.wait_for(delay, err.retry_after());
                    warn!(
                        "{} unavailable; retrying in {:.1}s (attempt {}/{}): {}",
                        self.inner.name(),
                        wait.as_secs_f32(),
                        attempt,
                        self.policy.max_retries,
                        err
                    );
                    sleep(wait).await;
                    delay = self.policy.next_delay(delay);
                }
                result => return result,
            }
        }
    }
}

pub(crate) fn is_rate_limited(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
        return true;
    }
    if status.as_u16() == 529 {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("too many requests")
        || lower.contains("resource_exhausted")
        || lower.contains("quota")
        || lower.contains("overloaded")
}

pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?.trim();
    value.parse::<u64>().ok().map(Duration::from_secs)
}
