//! Account endpoints: register, login, refresh, logout, current user

use serde::Serialize;

use super::{ApiClient, ApiRequest};
use crate::error::{Error, Result};
use crate::models::{ApiUser, AuthenticatedUser, TokenResponse};

pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const LOGOUT_ALL_PATH: &str = "/auth/logout_all";
pub const ME_PATH: &str = "/auth/me";

/// Minimum password length accepted by the server
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum password length (bcrypt truncates beyond 72 bytes)
pub const MAX_PASSWORD_LEN: usize = 72;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Create an account; does not log in
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthenticatedUser> {
        let request = ApiRequest::post(REGISTER_PATH).json(&Credentials { email, password })?;
        let data: ApiUser = self.call(&request).await?;
        log::info!("[api:auth] Registered account {}", data.email);
        AuthenticatedUser::try_from(data)
    }

    /// Obtain a session and keep its access token in memory
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let request = ApiRequest::post(LOGIN_PATH).json(&Credentials { email, password })?;
        let tokens: TokenResponse = self.call(&request).await?;

        if tokens.access_token.is_empty() {
            return Err(Error::protocol("login response has no access_token"));
        }

        self.tokens().set(tokens.access_token).await;
        log::info!("[api:auth] Logged in as {}", email);
        Ok(())
    }

    /// End the current session; the token is cleared even if the call fails
    pub async fn logout(&self) -> Result<()> {
        let result = self.call_empty(&ApiRequest::post(LOGOUT_PATH)).await;
        self.tokens().clear().await;
        if let Err(e) = &result {
            log::warn!("[api:auth] Logout call failed, local session cleared anyway: {}", e);
        }
        result
    }

    /// End every session of the user; the token is cleared even if the call fails
    pub async fn logout_all(&self) -> Result<()> {
        let result = self
            .call_empty(&ApiRequest::post(LOGOUT_ALL_PATH).authenticated())
            .await;
        self.tokens().clear().await;
        if let Err(e) = &result {
            log::warn!("[api:auth] Logout-all call failed, local session cleared anyway: {}", e);
        }
        result
    }

    /// Fetch the logged-in user
    pub async fn current_user(&self) -> Result<AuthenticatedUser> {
        let data: ApiUser = self.call(&ApiRequest::get(ME_PATH).authenticated()).await?;
        AuthenticatedUser::try_from(data)
    }

    /// Fetch the logged-in user, or `None` when the session is gone
    ///
    /// A 401 clears the held token; other failures are propagated.
    pub async fn try_current_user(&self) -> Result<Option<AuthenticatedUser>> {
        match self.current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_unauthorized() => {
                self.tokens().clear().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Client-side validation and messages
// ============================================================================

/// Check an email/password pair before sending it
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if !is_valid_email(email.trim()) {
        return Err(Error::validation("Enter a valid email address"));
    }

    if !password.chars().all(|c| (' '..='~').contains(&c)) {
        return Err(Error::validation(
            "Password may only contain Latin letters, digits and symbols",
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at most {} characters",
            MAX_PASSWORD_LEN
        )));
    }

    Ok(())
}

/// `local@domain.tld`, no whitespace
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Message to show when registration fails
pub fn registration_error_message(err: &Error) -> String {
    match err {
        Error::Validation(msg) => msg.clone(),
        _ => match err.status() {
            Some(400) => "This email is already registered".to_string(),
            Some(status) if status >= 500 => "Something went wrong, please try again later".to_string(),
            Some(_) => "Could not create the account, please try again".to_string(),
            None => "Something went wrong, please try again later".to_string(),
        },
    }
}

/// Message to show when login fails
pub fn login_error_message(err: &Error) -> String {
    match err {
        Error::Validation(msg) => msg.clone(),
        _ => match err.status() {
            Some(401) => "Invalid email or password".to_string(),
            Some(status) if status >= 500 => "Something went wrong, please try again later".to_string(),
            _ => err.user_message(),
        },
    }
}
