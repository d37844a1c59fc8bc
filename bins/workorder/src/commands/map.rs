//! Map command: geocode the locations of active work orders

use crate::context::AppContext;
use anyhow::Result;
use serde_json::json;
use workorder_api_client::models::WorkOrderQuery;
use workorder_cli::output::format_count;
use workorder_cli::progress::{finish_success, spinner};
use workorder_cli::{Status, Table};
use workorder_web::constants::{is_active_status, DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, MAP_TILE_URL};

pub async fn run(ctx: &AppContext, limit: u32) -> Result<()> {
    ctx.sign_in().await?;

    let query = WorkOrderQuery {
        limit: Some(limit),
        ..WorkOrderQuery::default()
    };
    let response = ctx.client().work_orders().list(&query).await?;
    let active: Vec<_> = response
        .data
        .into_iter()
        .filter(|order| is_active_status(order.status))
        .collect();

    let pb = (!ctx.is_json()).then(|| spinner("Geocoding work order locations..."));
    let located = ctx.geocoder()?.locate_work_orders(&active).await;
    let placed: usize = located.iter().map(|l| l.work_order_count()).sum();
    if let Some(pb) = &pb {
        finish_success(pb, &format!("{} placed", format_count(located.len(), "location", "locations")));
    }

    // Center on the first placed location, or the default
    let center = located.first().map_or(DEFAULT_MAP_CENTER, |l| l.coordinate);

    ctx.emit(
        &json!({
            "center": center,
            "zoom": DEFAULT_MAP_ZOOM,
            "tileUrl": MAP_TILE_URL,
            "locations": located,
        }),
        || {
            if located.is_empty() {
                Status::info("No active work orders with a resolvable address");
                return;
            }
            let mut table = Table::new(["ADDRESS", "LATITUDE", "LONGITUDE", "ORDERS"]);
            for location in &located {
                table.add_row([
                    location.address.clone(),
                    format!("{:.6}", location.coordinate.latitude),
                    format!("{:.6}", location.coordinate.longitude),
                    location.work_order_count().to_string(),
                ]);
            }
            println!("{}", table.render());
            println!();
            println!(
                "{} of {} on the map, centered at {center}",
                placed,
                format_count(active.len(), "active work order", "active work orders"),
            );
        },
    )
}
