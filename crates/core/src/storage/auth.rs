use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::CoreError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const REVOKE_URI: &str = "https://oauth2.googleapis.com/revoke";
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The parts of a Google service-account JSON key the tracker uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| CoreError::Credentials(format!("Malformed key file: {e}")))?;
        key.validate()?;
        Ok(key)
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Credentials(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if let Some(kind) = self.key_type.as_deref() {
            if kind != "service_account" {
                return Err(CoreError::Credentials(format!(
                    "Expected a service_account key, found '{kind}'"
                )));
            }
        }
        if self.client_email.trim().is_empty() {
            return Err(CoreError::Credentials("client_email is empty".into()));
        }
        if !self.private_key.contains("PRIVATE KEY") {
            return Err(CoreError::Credentials("private_key is not a PEM key".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Sign the RS256 JWT assertion exchanged for an access token.
pub fn build_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, CoreError> {
    let iat = now.timestamp();
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&header, &claims, &encoding_key)?)
}

/// A bearer token and the moment it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// Still usable for at least another minute.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(60) > now
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange a signed assertion for an access token.
pub async fn fetch_access_token(client: &Client, key: &ServiceAccountKey) -> Result<AccessToken, CoreError> {
    let now = Utc::now();
    let assertion = build_assertion(key, now)?;

    let resp = client
        .post(&key.token_uri)
        .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {desc}", err.error),
                None => err.error,
            },
            Err(_) => format!("token endpoint returned {status}"),
        };
        return Err(CoreError::Auth(message));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| CoreError::Auth(format!("Unexpected token response: {e}")))?;

    Ok(AccessToken {
        value: token.access_token,
        expires_at: now + Duration::seconds(token.expires_in),
    })
}

/// Revoke a token so it cannot be reused after the run.
pub async fn revoke_access_token(client: &Client, token: &AccessToken) -> Result<(), CoreError> {
    client
        .post(REVOKE_URI)
        .form(&[("token", token.value.as_str())])
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
