//! Health command

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::print_single;

#[derive(Debug, Serialize, Tabled)]
pub struct HealthRow {
    #[tabled(rename = "API")]
    pub api_url: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

pub async fn execute(ctx: &Context) -> Result<()> {
    let health = ctx.client().health().await?;
    let row = HealthRow {
        api_url: ctx.config.base_url.clone(),
        status: health.status,
    };
    print_single(&row, ctx.format)
}
