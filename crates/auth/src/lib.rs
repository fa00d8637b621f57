//! GoTrue authentication client for the laundry admin dashboard
//!
//! This crate covers the account operations the dashboard needs:
//! sign up, sign in with a password, sign out, password recovery
//! and the in-memory session those calls produce.

use log::{debug, info, warn};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use url::Url;

/// Error type
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Missing session")]
    MissingSession,
}

/// An authenticated account as returned by GoTrue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Session information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: User,
}

/// Sign-up answers with a session when the project auto-confirms
/// accounts, and with the bare user when email confirmation is pending.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    User(User),
}

impl SignUpResponse {
    pub fn user(&self) -> &User {
        match self {
            SignUpResponse::Session(session) => &session.user,
            SignUpResponse::User(user) => user,
        }
    }
}

/// Client options
#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub persist_session: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
        }
    }
}

/// Auth client
#[derive(Clone)]
pub struct Auth {
    url: String,
    key: String,
    http_client: Client,
    options: AuthOptions,
    current_session: Arc<RwLock<Option<Session>>>,
}

impl Auth {
    /// Create a new auth client for the project at `url`
    pub fn new(url: &str, key: &str, http_client: Client, options: AuthOptions) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            options,
            current_session: Arc::new(RwLock::new(None)),
        }
    }

    /// Register a new account. `user_data` ends up in the user's metadata,
    /// where a database trigger can pick it up to create the profile row.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        user_data: Option<serde_json::Value>,
    ) -> Result<SignUpResponse, AuthError> {
        let url = format!("{}/auth/v1/signup", self.url);

        let mut payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        if let Some(data) = user_data {
            payload["data"] = data;
        }

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let response = check_response(response).await?;
        let sign_up: SignUpResponse = response.json().await?;

        if let SignUpResponse::Session(session) = &sign_up {
            self.store_session(session.clone());
        } else {
            info!("Sign up for {} is awaiting email confirmation", email);
        }

        Ok(sign_up)
    }

    /// Sign in with email and password
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.url);

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let response = check_response(response).await?;
        let session: Session = response.json().await?;
        debug!("Signed in as {}", session.user.id);

        self.store_session(session.clone());

        Ok(session)
    }

    /// Current session, if any
    pub fn get_session(&self) -> Option<Session> {
        let read_guard = self
            .current_session
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        read_guard.clone()
    }

    /// Install a session obtained elsewhere, e.g. restored from disk
    pub fn set_session(&self, session: Option<Session>) {
        let mut write_guard = self
            .current_session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *write_guard = session;
    }

    /// Fetch the user behind the current session
    pub async fn get_user(&self) -> Result<User, AuthError> {
        let session = self.get_session().ok_or(AuthError::MissingSession)?;

        let url = format!("{}/auth/v1/user", self.url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await?;

        let response = check_response(response).await?;
        let user: User = response.json().await?;

        Ok(user)
    }

    /// Sign out. Without a session there is nothing to revoke and the
    /// call succeeds locally.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.get_session() else {
            debug!("sign_out called without a session");
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await?;

        check_response(response).await?;

        self.set_session(None);

        Ok(())
    }

    /// Send a password reset email. `redirect_to` is where the link in
    /// the email sends the user.
    pub async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError> {
        let mut url = Url::parse(&format!("{}/auth/v1/recover", self.url))?;
        if let Some(redirect) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }

        let payload = serde_json::json!({
            "email": email,
        });

        let response = self
            .http_client
            .post(url.as_str())
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        check_response(response).await?;

        Ok(())
    }

    fn store_session(&self, session: Session) {
        if self.options.persist_session {
            self.set_session(Some(session));
        }
    }
}

/// Turn a non-success response into an `ApiError` carrying the most
/// readable message GoTrue put in the body.
async fn check_response(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await?;
    warn!("Auth request failed with status {}: {}", status, error_text);
    Err(AuthError::ApiError(error_message(&error_text)))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|field| value.get(field).and_then(|v| v.as_str()).map(String::from))
        })
        .unwrap_or_else(|| body.to_string())
}
