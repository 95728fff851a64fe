//! Config commands
//!
//! Commands for inspecting CLI configuration.

use anyhow::Result;
use clap::Subcommand;
use filety_core::config::{DEFAULT_API_BASE_URL, ENV_API_URL, ENV_REQUEST_TIMEOUT, ENV_STATE_DIR};
use filety_core::IdentityStore;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{print_error, print_info, print_output};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

/// Config row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

pub async fn execute(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => print_output(&get_all_config(ctx), ctx.format),
        ConfigAction::Get { key } => {
            let rows = get_all_config(ctx);
            match rows.iter().find(|r| r.key.eq_ignore_ascii_case(&key)) {
                Some(row) => print_info(&format!("{} = {}", row.key, row.value), ctx.quiet),
                None => print_error(&format!("Config key not found: {}", key)),
            }
            Ok(())
        }
    }
}

fn source_of(env_var: &str, is_default: bool) -> String {
    if std::env::var(env_var).is_ok() {
        "env"
    } else if is_default {
        "default"
    } else {
        "flag"
    }
    .to_string()
}

fn get_all_config(ctx: &Context) -> Vec<ConfigRow> {
    let mut rows = Vec::new();

    rows.push(ConfigRow {
        key: "api_url".to_string(),
        value: ctx.config.base_url.clone(),
        source: source_of(ENV_API_URL, ctx.config.base_url == DEFAULT_API_BASE_URL),
    });

    rows.push(ConfigRow {
        key: "request_timeout".to_string(),
        value: format!("{}s", ctx.config.request_timeout.as_secs()),
        source: if std::env::var(ENV_REQUEST_TIMEOUT).is_ok() { "env" } else { "default" }.to_string(),
    });

    rows.push(ConfigRow {
        key: "poll_interval".to_string(),
        value: format!("{}ms", ctx.config.poll_interval.as_millis()),
        source: "default".to_string(),
    });

    rows.push(ConfigRow {
        key: "deadline".to_string(),
        value: format!("{}s", ctx.config.deadline.as_secs()),
        source: "default".to_string(),
    });

    rows.push(ConfigRow {
        key: "state_dir".to_string(),
        value: ctx.state_dir.to_string_lossy().to_string(),
        source: source_of(ENV_STATE_DIR, true),
    });

    let anon_id = match ctx.identity_store.load() {
        Ok(id) => id.unwrap_or_else(|| "-".to_string()),
        Err(e) => format!("unreadable ({})", e),
    };
    rows.push(ConfigRow {
        key: "anon_id".to_string(),
        value: anon_id,
        source: ctx.identity_store.path().to_string_lossy().to_string(),
    });

    rows.push(ConfigRow {
        key: "email".to_string(),
        value: ctx
            .credentials
            .as_ref()
            .map(|c| c.email.clone())
            .unwrap_or_else(|| "-".to_string()),
        source: if ctx.credentials.is_some() { "env/flag" } else { "n/a" }.to_string(),
    });

    rows
}
