//! Account commands
//!
//! Registration, login and session management. Tokens are never written to
//! disk, so every command logs in again with the configured credentials.

use anyhow::{anyhow, Result};
use filety_core::api::auth::{registration_error_message, validate_credentials};
use filety_core::services::format_duration;
use filety_core::services::usage::daily_limit_for_plan;
use filety_core::AuthenticatedUser;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{print_progress, print_single, print_success};

/// User row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "Plan")]
    pub plan: String,
    #[tabled(rename = "Used today")]
    pub used: String,
    #[tabled(rename = "Daily limit")]
    pub limit: String,
    #[tabled(rename = "Member since")]
    pub created_at: String,
}

impl From<&AuthenticatedUser> for UserRow {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            plan: user.tariff_plan.to_string(),
            used: format_duration(user.daily_used_seconds),
            limit: daily_limit_for_plan(user.tariff_plan)
                .map(format_duration)
                .unwrap_or_else(|| "unlimited".to_string()),
            created_at: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

pub async fn register(ctx: &Context) -> Result<()> {
    let creds = ctx.credentials()?;
    validate_credentials(&creds.email, &creds.password)
        .map_err(|e| anyhow!(registration_error_message(&e)))?;

    print_progress(&format!("Creating account {}...", creds.email.trim()), ctx.quiet);
    ctx.client()
        .register(creds.email.trim(), &creds.password)
        .await
        .map_err(|e| anyhow!(registration_error_message(&e)))?;

    ctx.login().await?;
    let user = ctx.client().current_user().await?;
    print_success(&format!("Account created, logged in as {}", user.email), ctx.quiet);
    print_single(&UserRow::from(&user), ctx.format)
}

pub async fn login(ctx: &Context) -> Result<()> {
    ctx.login().await?;
    let user = ctx.client().current_user().await?;
    print_success(&format!("Logged in as {}", user.email), ctx.quiet);
    print_single(&UserRow::from(&user), ctx.format)
}

pub async fn me(ctx: &Context) -> Result<()> {
    ctx.login().await?;
    let user = ctx.client().current_user().await?;
    print_single(&UserRow::from(&user), ctx.format)
}

pub async fn logout(ctx: &Context) -> Result<()> {
    ctx.login().await?;
    ctx.client().logout().await?;
    ctx.uploader.tracker().clear_user().await;
    print_success("Logged out", ctx.quiet);
    Ok(())
}

pub async fn logout_all(ctx: &Context) -> Result<()> {
    ctx.login().await?;
    ctx.client().logout_all().await?;
    ctx.uploader.tracker().clear_user().await;
    print_success("Logged out of all sessions", ctx.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use filety_core::TariffPlan;

    fn user(plan: TariffPlan) -> AuthenticatedUser {
        AuthenticatedUser {
            id: 3,
            email: "ann@example.com".to_string(),
            created_at: chrono::Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            tariff_plan: plan,
            daily_used_seconds: 200,
        }
    }

    #[test]
    fn test_user_row() {
        let row = UserRow::from(&user(TariffPlan::Free));
        assert_eq!(row.used, "3 min 20 s");
        assert_eq!(row.limit, "12 min 00 s");
        assert_eq!(row.created_at, "2025-03-01");
    }

    #[test]
    fn test_premium_row_is_unlimited() {
        let row = UserRow::from(&user(TariffPlan::Premium));
        assert_eq!(row.limit, "unlimited");
    }
}
