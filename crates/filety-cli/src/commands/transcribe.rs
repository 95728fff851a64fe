//! Transcription commands
//!
//! Upload a file and wait for its text, or list past transcriptions.

use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};
use filety_core::services::format_duration;
use filety_core::{friendly_error, RecentTranscription, UploadFile, WorkflowState};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{print_info, print_output, print_progress, print_success, truncate, OutputFormat};

/// Recent transcription row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct RecentRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Created")]
    pub created_at: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Text")]
    pub text: String,
}

impl From<RecentTranscription> for RecentRow {
    fn from(item: RecentTranscription) -> Self {
        Self {
            id: item.id,
            created_at: item.created_at,
            status: item.status,
            text: truncate(&item.text, 60),
        }
    }
}

fn describe(state: WorkflowState) -> Option<&'static str> {
    match state {
        WorkflowState::Uploading => Some("Uploading..."),
        WorkflowState::Processing => Some("Processing, this can take a few minutes..."),
        _ => None,
    }
}

pub async fn transcribe(ctx: &Context, file: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let upload = UploadFile::from_path(&file)
        .await
        .with_context(|| format!("Could not read {}", file.display()))?;

    ctx.login_if_configured().await?;

    let quiet = ctx.quiet;
    let result = ctx
        .uploader
        .transcribe(upload, move |state| {
            if let Some(message) = describe(state) {
                print_progress(message, quiet);
            }
        })
        .await;

    // Let the post-upload usage refresh land before reporting the quota
    ctx.uploader.settle().await;

    let result = result.map_err(|e| anyhow!(friendly_error(&e)))?;

    match (&output, ctx.format) {
        (Some(path), _) => {
            tokio::fs::write(path, &result.text)
                .await
                .with_context(|| format!("Could not write {}", path.display()))?;
            print_success(&format!("Saved transcription to {}", path.display()), ctx.quiet);
        }
        (None, OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&result)?),
        (None, OutputFormat::Table) => println!("{}", result.text),
    }

    if let Some(remaining) = ctx
        .uploader
        .tracker()
        .snapshot()
        .await
        .and_then(|s| s.remaining_seconds)
    {
        print_progress(&format!("Remaining today: {}", format_duration(remaining)), ctx.quiet);
    }

    Ok(())
}

pub async fn recent(ctx: &Context, limit: usize) -> Result<()> {
    if !ctx.login_if_configured().await? {
        // Make sure an identity exists before asking for its history
        if let Err(e) = ctx.uploader.tracker().refresh().await {
            log::warn!("Usage refresh failed: {}", e);
        }
    }

    let items = ctx.uploader.recent(limit).await?;
    if items.is_empty() {
        print_info("No transcriptions yet.", ctx.quiet);
        return Ok(());
    }

    let rows: Vec<RecentRow> = items.into_iter().map(RecentRow::from).collect();
    print_output(&rows, ctx.format)
}
