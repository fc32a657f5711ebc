use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{RedditError, Result};

/// Script-app credentials for the OAuth password grant.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// --- OAuth ---

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Reddit answers bad credentials with 200 and `{"error": "invalid_grant"}`.
    #[serde(default)]
    pub error: Option<String>,
}

// --- Listings ---

/// `{"kind": "Listing", "data": {"children": [...]}}`
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// A typed child of a listing. `kind` is `t3` for submissions, `t1` for
/// comments and `more` for collapsed reply stubs.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: serde_json::Value,
}

impl Thing {
    fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Live state of a submission (`t3`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub id: String,
    pub score: i64,
    #[serde(default)]
    pub num_comments: Option<i64>,
}

/// A comment (`t1`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Comment {
    pub id: String,
    pub score: i64,
    #[serde(default)]
    pub body: Option<String>,
}

/// Submission score plus its highest-ranked top-level comment, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionLookup {
    pub link: Link,
    pub top_comment: Option<Comment>,
}

impl SubmissionLookup {
    /// Build from the `[submission listing, comment listing]` pair returned by
    /// `/comments/{id}`. Comments are expected in the order the request asked for.
    pub fn from_listings(listings: Vec<Listing>) -> Result<Self> {
        let mut listings = listings.into_iter();
        let submission = listings
            .next()
            .ok_or_else(|| RedditError::Parse("empty comments response".to_string()))?;
        let link = submission
            .data
            .children
            .iter()
            .find(|t| t.kind == "t3")
            .ok_or_else(|| RedditError::Parse("no t3 child in submission listing".to_string()))?
            .parse::<Link>()?;

        let top_comment = match listings.next() {
            Some(comments) => comments
                .data
                .children
                .iter()
                .find(|t| t.kind == "t1")
                .map(Thing::parse::<Comment>)
                .transpose()?,
            None => None,
        };

        Ok(Self { link, top_comment })
    }
}
