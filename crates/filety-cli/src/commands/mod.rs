//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod account;
pub mod config;
pub mod health;
pub mod transcribe;
pub mod usage;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use filety_core::api::auth::{login_error_message, validate_credentials};
use filety_core::{ApiClient, ClientConfig, FileIdentityStore, Uploader};

use crate::output::{print_progress, OutputFormat};

/// Email and password given on the command line or in the environment
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Shared context for all commands
pub struct Context {
    pub config: ClientConfig,
    pub state_dir: PathBuf,
    pub uploader: Uploader,
    pub identity_store: Arc<FileIdentityStore>,
    pub credentials: Option<Credentials>,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    pub fn new(
        config: ClientConfig,
        state_dir: PathBuf,
        credentials: Option<Credentials>,
        format: OutputFormat,
        quiet: bool,
    ) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        let identity_store = Arc::new(FileIdentityStore::new(&state_dir));
        let uploader = Uploader::new(client, &config, identity_store.clone());

        Ok(Self {
            config,
            state_dir,
            uploader,
            identity_store,
            credentials,
            format,
            quiet,
        })
    }

    pub fn client(&self) -> &ApiClient {
        self.uploader.client()
    }

    /// Credentials, or an error naming how to provide them
    pub fn credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            anyhow!("Email and password are required: pass --email/--password or set FILETY_EMAIL/FILETY_PASSWORD")
        })
    }

    /// Log in with the configured credentials
    ///
    /// The token lives only as long as this process.
    pub async fn login(&self) -> Result<()> {
        let creds = self.credentials()?;
        validate_credentials(&creds.email, &creds.password)
            .map_err(|e| anyhow!(login_error_message(&e)))?;

        print_progress(&format!("Logging in as {}...", creds.email), self.quiet);
        self.client()
            .login(creds.email.trim(), &creds.password)
            .await
            .map_err(|e| anyhow!(login_error_message(&e)))
    }

    /// Log in when credentials were given; commands still work anonymously otherwise
    pub async fn login_if_configured(&self) -> Result<bool> {
        if self.credentials.is_none() {
            return Ok(false);
        }
        self.login().await?;
        Ok(true)
    }
}
