//! HTTP fetching with retries, user-agent rotation, and an AMP fallback.
//!
//! Article pages sit behind bot protection that answers with 403s, 429s, and
//! the odd 5xx. The client layers three independent defenses:
//!
//! - [`StatusRetry`]: transport-level retries on retryable status codes
//!   (429/500/502/503/504 by default) with a fixed backoff multiplier
//! - [`FetchClient`]: retries on connection-level failures with exponential
//!   backoff, rotating the `User-Agent` on every attempt
//! - AMP fallback: a 403 is retried once against the `platform=amp` variant of
//!   the same URL
//!
//! Status retries run inside each network attempt, so the two budgets compose.
//!
//! # Architecture
//!
//! - [`Transport`]: one GET with a chosen user agent
//! - [`ReqwestTransport`]: pooled `reqwest::Client` with browser-like headers
//! - [`StatusRetry`]: decorator that retries any [`Transport`] on bad statuses
//! - [`FetchClient`]: the public entry point producing a [`FetchResult`]

use crate::config::{DEFAULT_USER_AGENTS, FetchConfig};
use crate::error::{FetchError, TransportError};
use crate::models::FetchResult;
use rand::{Rng, rng};
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Raw response handed back by a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<TransportResponse> for FetchResult {
    fn from(resp: TransportResponse) -> Self {
        FetchResult {
            final_url: resp.final_url,
            status_code: resp.status,
            body: resp.body,
            headers: resp.headers,
        }
    }
}

/// A single HTTP GET.
///
/// Implementors report connection-level failures as [`TransportError`]; any
/// response that arrives, whatever its status, is `Ok`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
///
/// The client is built once and reused for every call, so connections are
/// kept alive across fetches. Cloning shares the same pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the pooled client with a mandatory per-request timeout.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, TransportError> {
        let resp = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await?;
        let final_url = resp.url().to_string();
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.text().await?;
        Ok(TransportResponse {
            final_url,
            status,
            headers,
            body,
        })
    }
}

/// Fixed headers sent with every request, mimicking a desktop browser.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(header::REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers
}

/// Decorator retrying a [`Transport`] when the response status is retryable.
///
/// The delay before retry `n` (1-based) is `backoff * 2^(n-1)`. Once the
/// budget is spent the last response is returned as-is, so the caller sees
/// the status rather than a synthetic error.
pub struct StatusRetry<T> {
    inner: T,
    max_retries: u32,
    backoff: Duration,
    statuses: Vec<u16>,
}

impl<T> StatusRetry<T>
where
    T: Transport,
{
    pub fn new(inner: T, max_retries: u32, backoff: Duration, statuses: Vec<u16>) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
            statuses,
        }
    }

    fn should_retry(&self, status: u16, retries: u32) -> bool {
        self.statuses.contains(&status) && retries < self.max_retries
    }
}

impl<T> fmt::Debug for StatusRetry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusRetry")
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("statuses", &self.statuses)
            .finish()
    }
}

impl<T> Transport for StatusRetry<T>
where
    T: Transport,
{
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, TransportError> {
        let mut retries = 0u32;
        loop {
            let resp = self.inner.get(url, user_agent).await?;
            if !self.should_retry(resp.status, retries) {
                return Ok(resp);
            }
            retries += 1;
            let delay = doubling_delay(self.backoff, retries - 1);
            warn!(
                %url,
                status = resp.status,
                retry = retries,
                max = self.max_retries,
                ?delay,
                "Retryable status; backing off"
            );
            sleep(delay).await;
        }
    }
}

/// `base * 2^doublings`, saturating instead of overflowing.
///
/// Network retries pass the 0-based attempt number; status retries pass
/// `n - 1` for the `n`th retry.
pub fn doubling_delay(base: Duration, doublings: u32) -> Duration {
    base.saturating_mul(1u32.checked_shl(doublings).unwrap_or(u32::MAX))
}

/// Outcome of one network attempt.
enum AttemptError {
    /// Retried by the network loop.
    Network(TransportError),
    /// Surfaced immediately.
    Fatal(FetchError),
}

/// Article fetcher: UA rotation, network retries, and the AMP fallback.
pub struct FetchClient<T = StatusRetry<ReqwestTransport>> {
    transport: T,
    user_agents: Vec<String>,
    network_retries: u32,
    network_backoff: Duration,
}

impl FetchClient {
    /// Build the default client: pooled reqwest transport wrapped in status retries.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let transport = StatusRetry::new(
            ReqwestTransport::new(config)?,
            config.status_retries,
            config.status_backoff(),
            config.retry_statuses.clone(),
        );
        Ok(Self::with_transport(transport, config))
    }

    /// Download raw bytes (an image, say) over the shared connection pool.
    ///
    /// Uses the same user-agent pool and status-retry policy as [`fetch`](Self::fetch),
    /// but no network retries and no AMP fallback.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the resource
    ///
    /// # Returns
    ///
    /// The response body, or [`FetchError::Network`] / [`FetchError::Http`]
    /// when the request fails or ends on a non-2xx status.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let policy = &self.transport;
        let user_agent = self.pick_user_agent();
        let network_error = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: TransportError::from(e).0,
        };

        let mut retries = 0u32;
        loop {
            let resp = policy
                .inner
                .client
                .get(url)
                .header(header::USER_AGENT, user_agent)
                .send()
                .await
                .map_err(network_error)?;
            let status = resp.status().as_u16();

            if policy.should_retry(status, retries) {
                retries += 1;
                let delay = doubling_delay(policy.backoff, retries - 1);
                warn!(status, retry = retries, max = policy.max_retries, ?delay, "Retryable status; backing off");
                sleep(delay).await;
                continue;
            }
            if !resp.status().is_success() {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    status,
                });
            }
            let bytes = resp.bytes().await.map_err(network_error)?;
            return Ok(bytes.to_vec());
        }
    }
}

impl<T> fmt::Debug for FetchClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("user_agents", &self.user_agents.len())
            .field("network_retries", &self.network_retries)
            .field("network_backoff", &self.network_backoff)
            .finish()
    }
}

impl<T> FetchClient<T>
where
    T: Transport,
{
    /// Wrap an arbitrary transport. Only the network-retry and UA settings of
    /// `config` are used here; status retries belong to the transport.
    pub fn with_transport(transport: T, config: &FetchConfig) -> Self {
        Self {
            transport,
            user_agents: config.user_agents.clone(),
            network_retries: config.network_retries,
            network_backoff: config.network_backoff(),
        }
    }

    /// Fetch `url`, returning the final URL, status, headers, and body.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute article URL
    ///
    /// # Returns
    ///
    /// The first 2xx response, which may come from the AMP variant when the
    /// original URL answered 403.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] if `url` does not parse
    /// - [`FetchError::Network`] once every network attempt has failed
    /// - [`FetchError::Http`] for a terminal non-2xx status (a 403 only after
    ///   the AMP variant also failed)
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let total_t0 = Instant::now();
        let mut attempt = 0u32;
        loop {
            let user_agent = self.pick_user_agent();
            debug!(attempt, %user_agent, "Fetching");
            match self.attempt(url, user_agent).await {
                Ok(result) => {
                    info!(
                        status = result.status_code,
                        final_url = %result.final_url,
                        bytes = result.body.len(),
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        "Fetched page"
                    );
                    return Ok(result);
                }
                Err(AttemptError::Fatal(e)) => {
                    error!(error = %e, "Fetch failed");
                    return Err(e);
                }
                Err(AttemptError::Network(e)) => {
                    if attempt >= self.network_retries {
                        error!(
                            attempt,
                            max = self.network_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(FetchError::Network {
                            url: url.to_string(),
                            message: e.0,
                        });
                    }
                    let delay = doubling_delay(self.network_backoff, attempt);
                    warn!(
                        attempt,
                        max = self.network_retries,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, url: &str, user_agent: &str) -> Result<FetchResult, AttemptError> {
        let resp = self
            .transport
            .get(url, user_agent)
            .await
            .map_err(AttemptError::Network)?;

        if resp.status == 403 {
            let amp_url = amp_variant(url).map_err(|source| {
                AttemptError::Fatal(FetchError::InvalidUrl {
                    url: url.to_string(),
                    source,
                })
            })?;
            warn!(%amp_url, "Blocked with 403; trying AMP variant");
            let amp = self
                .transport
                .get(&amp_url, user_agent)
                .await
                .map_err(AttemptError::Network)?;
            if amp.is_success() {
                info!(status = amp.status, "AMP variant succeeded");
                return Ok(amp.into());
            }
            warn!(status = amp.status, "AMP variant failed; surfacing original 403");
            return Err(AttemptError::Fatal(FetchError::Http {
                url: url.to_string(),
                status: resp.status,
            }));
        }

        if !resp.is_success() {
            return Err(AttemptError::Fatal(FetchError::Http {
                url: url.to_string(),
                status: resp.status,
            }));
        }
        Ok(resp.into())
    }

    fn pick_user_agent(&self) -> &str {
        if self.user_agents.is_empty() {
            return DEFAULT_USER_AGENTS[0];
        }
        let i = rng().random_range(0..self.user_agents.len());
        &self.user_agents[i]
    }
}

/// Same URL with `platform=amp`, keeping every other query parameter in place.
///
/// An existing `platform` parameter is overwritten where it stands; otherwise
/// the parameter is appended.
pub fn amp_variant(url: &str) -> Result<String, url::ParseError> {
    let mut parsed = Url::parse(url)?;
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (k, v) in parsed.query_pairs() {
        if k == "platform" {
            if !replaced {
                pairs.push(("platform".to_string(), "amp".to_string()));
                replaced = true;
            }
            continue;
        }
        pairs.push((k.into_owned(), v.into_owned()));
    }
    if !replaced {
        pairs.push(("platform".to_string(), "amp".to_string()));
    }
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(parsed.to_string())
}
