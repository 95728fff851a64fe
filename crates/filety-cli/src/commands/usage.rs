//! Usage commands
//!
//! Show the anonymous identity and the remaining daily quota.

use anyhow::Result;
use filety_core::services::format_duration;
use filety_core::{AnonymousIdentity, IdentityStore, UsageSnapshot};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{print_info, print_single};

/// Identity row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct IdentityRow {
    #[tabled(rename = "Identity")]
    pub id: String,
    #[tabled(rename = "Used today")]
    pub used: String,
    #[tabled(rename = "Daily limit")]
    pub limit: String,
    #[tabled(rename = "Created")]
    pub created_at: String,
}

impl From<&AnonymousIdentity> for IdentityRow {
    fn from(identity: &AnonymousIdentity) -> Self {
        Self {
            id: identity.id.clone(),
            used: format_duration(identity.used_seconds),
            limit: format_duration(identity.limit_seconds),
            created_at: identity.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Usage row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct UsageRow {
    #[tabled(rename = "Source")]
    pub source: String,
    #[tabled(rename = "Used")]
    pub used: String,
    #[tabled(rename = "Limit")]
    pub limit: String,
    #[tabled(rename = "Remaining")]
    pub remaining: String,
    #[tabled(skip)]
    pub remaining_seconds: Option<i64>,
}

impl From<&UsageSnapshot> for UsageRow {
    fn from(snapshot: &UsageSnapshot) -> Self {
        let unlimited = || "unlimited".to_string();
        Self {
            source: snapshot.source.to_string(),
            used: format_duration(snapshot.used_seconds),
            limit: snapshot.limit_seconds.map(format_duration).unwrap_or_else(unlimited),
            remaining: snapshot
                .remaining_seconds
                .map(format_duration)
                .unwrap_or_else(unlimited),
            remaining_seconds: snapshot.remaining_seconds,
        }
    }
}

/// Establish (or confirm) the anonymous identity and show it
pub async fn anon(ctx: &Context) -> Result<()> {
    let stored = ctx.uploader.tracker().anon_id().await;
    let identity = ctx.client().establish_anonymous(stored.as_deref()).await?;

    if stored.as_deref() != Some(identity.id.as_str()) {
        ctx.identity_store.save(&identity.id)?;
        print_info(&format!("New anonymous identity {}", identity.id), ctx.quiet);
    }

    print_single(&IdentityRow::from(&identity), ctx.format)
}

/// Show the remaining quota, for the logged-in user when credentials are set
pub async fn usage(ctx: &Context) -> Result<()> {
    ctx.login_if_configured().await?;

    let records = ctx.uploader.tracker().refresh().await?;
    match records.snapshot() {
        Some(snapshot) => print_single(&UsageRow::from(&snapshot), ctx.format),
        None => {
            print_info("Usage is not known yet.", ctx.quiet);
            Ok(())
        }
    }
}
