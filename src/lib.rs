mod get_survey;
mod survey;
pub use survey::Survey;
mod normalize;
pub use normalize::{extract_uid, normalize, with_surveys};
mod retry;
pub use retry::RetryPolicy;
mod error;
pub use error::Error;
pub mod config;
pub mod server;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

pub const API_URL: &str = "https://api.zexumglobalresearch.net/api/getsurvey";
pub const DEFAULT_TIMEOUT_SECS: u64 = 190;
const TOKEN_HEADER: &str = "token";

pub struct Gateway {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

/// Outcome of a single attempt that did not produce a body.
enum Failure {
    Retry {
        reason: String,
        retry_after: Option<Duration>,
    },
    Fatal(String),
}

impl Gateway {
    /// Builds a gateway against the public survey endpoint.
    ///
    /// The credential is only checked when a call is made, so a gateway
    /// without one can still be constructed and served.
    pub fn new(token: Option<String>, timeout: Option<Duration>) -> Result<Gateway, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let timeout = match timeout {
            Some(t) => t,
            None => Duration::new(DEFAULT_TIMEOUT_SECS, 0),
        };

        let client = match reqwest::ClientBuilder::new()
            .default_headers(headers)
            .build()
        {
            Ok(r) => r,
            Err(err) => {
                return Err(Error::Config(format!(
                    "Could not create reqwest client ({}).",
                    err.to_string()
                )))
            }
        };

        let token = token.filter(|t| !t.is_empty());

        Ok(Gateway {
            client,
            url: API_URL.to_string(),
            token,
            timeout,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Gateway {
        self.url = url.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Gateway {
        self.retry = retry;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn token_header(&self) -> Result<HeaderValue, Error> {
        let token = match &self.token {
            Some(token) => token,
            None => return Err(Error::Config("credential not configured".to_string())),
        };

        HeaderValue::from_str(token)
            .map_err(|_| Error::Config("credential is not a valid header value".to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let token = self.token_header()?;

        let attempts = self.retry.attempts();
        for attempt in 1..=attempts {
            let text = match self.get_without_retry(url, &token).await {
                Ok(text) => text,
                Err(Failure::Retry {
                    reason,
                    retry_after,
                }) => {
                    if attempt == attempts {
                        return Err(upstream(format!(
                            "{} (gave up after {} attempts)",
                            reason, attempts
                        )));
                    }

                    let delay = self.retry.delay_with_hint(attempt - 1, retry_after);
                    warn!(
                        "Attempt {}/{} against {} failed: {}. Retrying in {:?}.",
                        attempt, attempts, url, reason, delay
                    );
                    sleep(delay).await;
                    continue;
                }
                Err(Failure::Fatal(reason)) => return Err(upstream(reason)),
            };

            let body: T = match serde_json::from_str(&text) {
                Ok(r) => r,
                Err(err) => {
                    return Err(upstream(format!(
                        "could not deserialize response ({})",
                        err
                    )))
                }
            };

            return Ok(body);
        }

        Err(upstream(format!("no attempt made against {}", url)))
    }

    async fn get_without_retry(&self, url: &str, token: &HeaderValue) -> Result<String, Failure> {
        let res = match self
            .client
            .get(url)
            .header(TOKEN_HEADER, token.clone())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                let reason = format!("could not send request ({})", err);
                if err.is_connect() || err.is_timeout() {
                    return Err(Failure::Retry {
                        reason,
                        retry_after: None,
                    });
                }
                return Err(Failure::Fatal(reason));
            }
        };

        let status = res.status();
        debug!("{} responded with {}", url, status);

        if !status.is_success() {
            let code = status.as_u16();
            let reason = format!("upstream responded with HTTP {}", status);
            if retry::is_retryable_status(code) {
                return Err(Failure::Retry {
                    reason,
                    retry_after: retry::retry_after(code, res.headers()),
                });
            }

            return Err(Failure::Fatal(reason));
        }

        match res.text().await {
            Ok(text) => Ok(text),
            Err(err) => {
                let reason = format!("could not read response body ({})", err);
                if err.is_timeout() {
                    return Err(Failure::Retry {
                        reason,
                        retry_after: None,
                    });
                }
                Err(Failure::Fatal(reason))
            }
        }
    }
}

fn upstream(cause: String) -> Error {
    Error::Upstream(format!("Zexum API call failed: {}", cause))
}
