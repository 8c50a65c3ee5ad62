//! Two-stage credential lifecycle for a GenAI platform agent.
//!
//! The platform hands out a long-lived refresh token in exchange for the
//! agent key, and short-lived access tokens in exchange for the refresh
//! token. Both are JWTs whose `exp` claim is read without verifying the
//! signature: the client holds no verification key.

use jsonwebtoken::{decode, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::agents::error::{AgentResult, AuthError, TokenError};

/// Source of the current time in seconds since the Unix epoch
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<u64>,
}

/// Read the `exp` claim of a JWT without checking its signature.
pub fn expiry_of(token: &str) -> Result<u64, TokenError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    data.claims.exp.ok_or(TokenError::MissingExpiry)
}

/// Whether `token` has expired at `now`.
///
/// A token without an `exp` claim or with a broken structure is an error,
/// never reported as expired.
pub fn is_expired(token: &str, now: u64) -> Result<bool, TokenError> {
    Ok(expiry_of(token)? <= now)
}

/// One credential slot
#[derive(Debug, Default)]
enum Credential {
    #[default]
    NotIssued,
    Issued {
        token: SecretString,
        expires_at: u64,
    },
}

impl Credential {
    fn issued(token: String) -> Result<Self, TokenError> {
        let expires_at = expiry_of(&token)?;
        Ok(Credential::Issued {
            token: SecretString::from(token),
            expires_at,
        })
    }

    /// The token, if it is still valid at `now`
    fn current(&self, now: u64) -> Option<&str> {
        match self {
            Credential::NotIssued => None,
            Credential::Issued { token, expires_at } if *expires_at > now => {
                Some(token.expose_secret())
            }
            Credential::Issued { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct CredentialState {
    refresh: Credential,
    access: Credential,
}

#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Lazily issues and renews the refresh/access token pair for one agent.
///
/// Refresh passes are serialized: concurrent callers wait for the pass in
/// flight and then reuse its result instead of issuing their own requests.
#[derive(Debug)]
pub struct TokenManager {
    http: reqwest::Client,
    api_base: String,
    agent_id: String,
    agent_key: SecretString,
    clock: Arc<dyn Clock>,
    state: Mutex<CredentialState>,
}

impl TokenManager {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        agent_id: impl Into<String>,
        agent_key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            agent_id: agent_id.into(),
            agent_key: SecretString::from(agent_key.into()),
            clock,
            state: Mutex::new(CredentialState::default()),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/auth/agents/{}/token", self.api_base, self.agent_id)
    }

    /// Make sure both tokens are present and unexpired, renewing whichever
    /// is not, and return the access token validated in this pass.
    pub async fn ensure_valid(&self) -> AgentResult<SecretString> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        let refresh = match state.refresh.current(now) {
            Some(token) => token.to_owned(),
            None => {
                debug!(agent_id = %self.agent_id, "Issuing refresh token");
                let token = self.issue_refresh_token().await?;
                state.refresh = Credential::issued(token.clone())?;
                token
            }
        };

        if let Some(token) = state.access.current(now) {
            return Ok(SecretString::from(token.to_owned()));
        }

        debug!(agent_id = %self.agent_id, "Refreshing access token");
        let token = self.refresh_access_token(&refresh).await?;
        state.access = Credential::issued(token.clone())?;
        Ok(SecretString::from(token))
    }

    async fn issue_refresh_token(&self) -> AgentResult<String> {
        let response = self
            .http
            .post(self.token_url())
            .header("X-Api-Key", self.agent_key.expose_secret())
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::RefreshIssuance {
                status: status.as_u16(),
            }
            .into());
        }

        let body: RefreshTokenResponse = response.json().await?;
        Ok(body.refresh_token)
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> AgentResult<String> {
        let response = self
            .http
            .put(self.token_url())
            .query(&[("refresh_token", refresh_token)])
            .header("X-Api-Key", self.agent_key.expose_secret())
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::AccessRefresh {
                status: status.as_u16(),
            }
            .into());
        }

        let body: AccessTokenResponse = response.json().await?;
        Ok(body.access_token)
    }
}
