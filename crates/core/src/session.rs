use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

// Tokens within this window of their recorded expiry count as expired.
const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn with_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

pub fn acquire_session(token_path: &Path) -> Result<Session> {
    let data = fs::read_to_string(token_path).with_context(|| {
        format!(
            "failed to read stored token {}; run the authorization flow first",
            token_path.display()
        )
    })?;
    let mut stored: StoredToken = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse stored token {}", token_path.display()))?;

    if token_expired(&stored) {
        info!("stored access token expired; refreshing");
        let refreshed = refresh_access_token(&stored)?;
        stored.access_token = refreshed.access_token;
        stored.expiry = Some(Utc::now() + Duration::seconds(refreshed.expires_in));

        match serde_json::to_string_pretty(&stored) {
            Ok(payload) => {
                if let Err(err) = fs::write(token_path, payload) {
                    warn!(
                        "failed to persist refreshed token to {}: {}",
                        token_path.display(),
                        err
                    );
                }
            }
            Err(err) => warn!("failed to serialize refreshed token: {}", err),
        }
    }

    Ok(Session {
        access_token: stored.access_token,
    })
}

fn token_expired(stored: &StoredToken) -> bool {
    match stored.expiry {
        Some(expiry) => expiry <= Utc::now() + Duration::seconds(EXPIRY_SKEW_SECONDS),
        None => false,
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

fn refresh_access_token(stored: &StoredToken) -> Result<RefreshResponse> {
    let refresh_token = stored.refresh_token.as_deref().ok_or_else(|| {
        anyhow!("stored token expired and carries no refresh token; re-run the authorization flow")
    })?;

    let response = reqwest::blocking::Client::new()
        .post(&stored.token_uri)
        .form(&[
            ("client_id", stored.client_id.as_str()),
            ("client_secret", stored.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .context("token refresh request failed")?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().unwrap_or_default();
        return Err(anyhow!("token endpoint returned {}: {}", status, detail));
    }

    response
        .json::<RefreshResponse>()
        .context("failed to decode token refresh response")
}
