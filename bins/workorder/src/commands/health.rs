//! Health check command

use crate::context::AppContext;
use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use serde_json::json;
use workorder_cli::output::format_duration;
use workorder_cli::progress::{finish_error, finish_success, spinner};

pub async fn run(ctx: &AppContext) -> Result<()> {
    let api = ctx.client().health();
    let pb = (!ctx.is_json()).then(|| spinner("Checking API health..."));

    let (health, elapsed) = match api.check_timed().await {
        Ok(result) => result,
        Err(e) => {
            if let Some(pb) = &pb {
                finish_error(pb, "API unreachable");
            }
            return Err(e.into());
        }
    };
    // Version is informational only
    let info = api.info().await.ok();

    if let Some(pb) = &pb {
        if health.is_healthy() {
            finish_success(pb, "API healthy");
        } else {
            finish_error(pb, "API unhealthy");
        }
    }

    ctx.emit(
        &json!({
            "status": health.status,
            "healthy": health.is_healthy(),
            "latencyMs": u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "baseUrl": ctx.client().config().base_url,
            "version": info.as_ref().map(|i| i.version.as_str()),
        }),
        || {
            println!("  URL:      {}", ctx.client().config().base_url);
            println!("  Status:   {}", health.status);
            println!("  Latency:  {}", format_duration(elapsed).dimmed());
            if let Some(info) = &info {
                println!("  Service:  {} (v{})", info.message, info.version);
            }
        },
    )?;

    if !health.is_healthy() {
        bail!("API reported status '{}'", health.status);
    }
    Ok(())
}
