use std::path::Path;

use reddit_client::RedditCredentials;
use serde::Deserialize;

use crate::error::HarvestError;

pub const DEFAULT_USER_AGENT: &str = "privacy_gigwork_project";

/// On-disk credentials bundle. `api_key` is the historical name of the client secret.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    client_id: String,
    #[serde(alias = "api_key")]
    client_secret: String,
    username: String,
    password: String,
    #[serde(default)]
    user_agent: Option<String>,
}

impl From<CredentialsFile> for RedditCredentials {
    fn from(file: CredentialsFile) -> Self {
        RedditCredentials {
            client_id: file.client_id,
            client_secret: file.client_secret,
            username: file.username,
            password: file.password,
            user_agent: file.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }
}

/// Load credentials from a JSON file.
pub fn from_file(path: &Path) -> Result<RedditCredentials, HarvestError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        HarvestError::Credentials(format!("cannot read {}: {e}", path.display()))
    })?;
    let file: CredentialsFile = serde_json::from_str(&raw).map_err(|e| {
        HarvestError::Credentials(format!("invalid credentials file {}: {e}", path.display()))
    })?;
    Ok(file.into())
}

/// Load credentials from `REDDIT_*` environment variables.
pub fn from_env() -> Result<RedditCredentials, HarvestError> {
    from_vars(|key| std::env::var(key).ok())
}

/// Resolve credentials through an arbitrary variable lookup.
pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<RedditCredentials, HarvestError> {
    let required = |key: &str| {
        get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| HarvestError::Credentials(format!("{key} is not set")))
    };

    Ok(RedditCredentials {
        client_id: required("REDDIT_CLIENT_ID")?,
        client_secret: required("REDDIT_CLIENT_SECRET")?,
        username: required("REDDIT_USERNAME")?,
        password: required("REDDIT_PASSWORD")?,
        user_agent: get("REDDIT_USER_AGENT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
    })
}

/// First three characters plus the character count.
fn preview(val: &str) -> String {
    let n = val.chars().take(3).map(char::len_utf8).sum::<usize>();
    format!("{}...({} chars)", &val[..n], val.chars().count())
}

pub fn log_redacted(creds: &RedditCredentials) {
    tracing::info!("Reddit credentials loaded:");
    tracing::info!("  client_id: {}", preview(&creds.client_id));
    tracing::info!("  client_secret: <{} chars>", creds.client_secret.chars().count());
    tracing::info!("  username: {}", creds.username);
    tracing::info!("  user_agent: {}", creds.user_agent);
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn file_accepts_legacy_api_key_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"client_id": "cid", "api_key": "secret", "username": "u", "password": "p"}}"#
        )
        .unwrap();

        let creds = from_file(file.path()).unwrap();
        assert_eq!(creds.client_secret, "secret");
        assert_eq!(creds.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn missing_file_is_credentials_error() {
        let result = from_file(Path::new("/nonexistent/credentials.json"));
        assert!(matches!(result, Err(HarvestError::Credentials(_))));
    }

    #[test]
    fn vars_require_secret_fields() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("REDDIT_CLIENT_ID", "cid"),
            ("REDDIT_CLIENT_SECRET", "secret"),
            ("REDDIT_USERNAME", "u"),
        ]);
        let result = from_vars(|k| vars.get(k).map(|v| v.to_string()));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("REDDIT_PASSWORD"), "got: {err}");
    }

    #[test]
    fn vars_use_custom_user_agent() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("REDDIT_CLIENT_ID", "cid"),
            ("REDDIT_CLIENT_SECRET", "secret"),
            ("REDDIT_USERNAME", "u"),
            ("REDDIT_PASSWORD", "p"),
            ("REDDIT_USER_AGENT", "research-bot/0.1"),
        ]);
        let creds = from_vars(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(creds.user_agent, "research-bot/0.1");
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        assert_eq!(preview("abcdef"), "abc...(6 chars)");
        assert_eq!(preview("ñandú-id"), "ñan...(8 chars)");
        assert_eq!(preview("é"), "é...(1 chars)");
    }
}
