pub mod error;
pub mod rate_limit;
pub mod types;

pub use error::{RedditError, Result};
pub use rate_limit::RateLimit;
pub use types::{Comment, Link, RedditCredentials, SubmissionLookup};

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use types::{Listing, TokenResponse};

pub const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";

const TOKEN_PATH: &str = "/api/v1/access_token";

/// Refresh this long before the server-side expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct AccessToken {
    value: String,
    expires_at: Instant,
}

pub struct RedditClient {
    client: reqwest::Client,
    auth_base_url: String,
    api_base_url: String,
    credentials: RedditCredentials,
    token: Mutex<Option<AccessToken>>,
    /// Set when the server reports a spent quota; requests wait until then.
    resume_at: Mutex<Option<tokio::time::Instant>>,
}

impl RedditClient {
    /// `auth_base_url` serves the token endpoint, `api_base_url` the OAuth
    /// resources. Production values are [`DEFAULT_AUTH_BASE_URL`] and
    /// [`DEFAULT_API_BASE_URL`].
    pub fn new(
        credentials: RedditCredentials,
        auth_base_url: &str,
        api_base_url: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(credentials.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(None),
            resume_at: Mutex::new(None),
        })
    }

    /// Run the password grant eagerly so bad credentials fail before any work starts.
    pub async fn authenticate(&self) -> Result<()> {
        self.bearer().await.map(|_| ())
    }

    async fn bearer(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
            tracing::debug!("Reddit access token expired, refreshing");
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken> {
        let creds = &self.credentials;
        let form = [
            ("grant_type", "password"),
            ("username", creds.username.as_str()),
            ("password", creds.password.as_str()),
        ];

        let resp = self
            .client
            .post(format!("{}{}", self.auth_base_url, TOKEN_PATH))
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Auth(format!("status {}: {}", status.as_u16(), body)));
        }

        let token: TokenResponse = serde_json::from_str(&resp.text().await?)?;
        if let Some(err) = token.error {
            return Err(RedditError::Auth(err));
        }
        let value = token
            .access_token
            .ok_or_else(|| RedditError::Auth("token response missing access_token".to_string()))?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));

        tracing::info!(
            username = %creds.username,
            expires_in_secs = lifetime.as_secs(),
            "Obtained Reddit access token"
        );

        Ok(AccessToken {
            value,
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        })
    }

    /// Fetch a submission's live score and its top-ranked comment.
    pub async fn submission_with_top_comment(&self, id: &str) -> Result<SubmissionLookup> {
        self.wait_for_quota().await;
        let token = self.bearer().await?;
        let url = format!("{}/comments/{}", self.api_base_url, id);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("sort", "top"), ("limit", "1"), ("depth", "1")])
            .send()
            .await?;
        self.track_quota(resp.headers()).await;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::from_status(status.as_u16(), body));
        }

        let listings: Vec<Listing> = serde_json::from_str(&resp.text().await?)?;
        SubmissionLookup::from_listings(listings)
    }

    async fn wait_for_quota(&self) {
        let resume_at = self.resume_at.lock().await.take();
        if let Some(at) = resume_at {
            let wait = at.saturating_duration_since(tokio::time::Instant::now());
            if !wait.is_zero() {
                tracing::info!(
                    wait_secs = wait.as_secs(),
                    "Reddit rate limit reached, waiting for reset"
                );
                tokio::time::sleep_until(at).await;
            }
        }
    }

    async fn track_quota(&self, headers: &reqwest::header::HeaderMap) {
        let Some(limit) = RateLimit::from_headers(headers) else {
            return;
        };
        tracing::trace!(
            remaining = limit.remaining,
            reset_secs = limit.reset.as_secs(),
            "Reddit quota"
        );
        if let Some(pause) = limit.pause() {
            *self.resume_at.lock().await = Some(tokio::time::Instant::now() + pause);
        }
    }
}
