//! Address geocoding command

use crate::context::AppContext;
use anyhow::Result;
use serde_json::json;
use std::collections::HashSet;
use workorder_cli::progress::{finish_error, finish_success, geocode_progress};
use workorder_cli::{Status, Table};

pub async fn run(ctx: &AppContext, addresses: &[String]) -> Result<()> {
    let service = ctx.geocoder()?;

    let mut seen = HashSet::new();
    let distinct: Vec<&str> = addresses
        .iter()
        .map(String::as_str)
        .filter(|a| seen.insert(*a))
        .collect();

    let pb = (!ctx.is_json()).then(|| geocode_progress(distinct.len() as u64));
    let results = service
        .resolve_many_with_progress(distinct.iter().copied(), |address, _| {
            if let Some(pb) = &pb {
                pb.set_message(address.to_string());
                pb.inc(1);
            }
        })
        .await;

    let found = results.values().filter(|r| r.is_some()).count();
    if let Some(pb) = &pb {
        if found == distinct.len() {
            finish_success(pb, "all addresses resolved");
        } else {
            finish_error(pb, &format!("{} not found", distinct.len() - found));
        }
    }

    let rows: Vec<_> = distinct
        .iter()
        .map(|address| (*address, results.get(*address).copied().flatten()))
        .collect();

    ctx.emit(
        &rows
            .iter()
            .map(|(address, coordinate)| json!({ "address": address, "coordinate": coordinate }))
            .collect::<Vec<_>>(),
        || {
            let mut table = Table::new(["ADDRESS", "LATITUDE", "LONGITUDE"]);
            for (address, coordinate) in &rows {
                match coordinate {
                    Some(c) => table.add_row([
                        (*address).to_string(),
                        format!("{:.6}", c.latitude),
                        format!("{:.6}", c.longitude),
                    ]),
                    None => table.add_row([(*address).to_string(), "not found".to_string()]),
                }
            }
            println!("{}", table.render());
        },
    )?;

    if found == 0 {
        Status::warning("No address could be resolved");
    }
    Ok(())
}
