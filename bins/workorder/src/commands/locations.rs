//! Location commands

use crate::context::AppContext;
use anyhow::Result;
use workorder_cli::{Status, Table};

pub async fn list(ctx: &AppContext) -> Result<()> {
    ctx.sign_in().await?;
    let locations = ctx.client().locations().list().await?;

    ctx.emit(&locations, || {
        if locations.is_empty() {
            Status::info("No locations found");
            return;
        }
        let mut table = Table::new(["ID", "NAME", "ADDRESS"]);
        for location in &locations {
            table.add_row([
                location.id.clone(),
                location.name.clone(),
                location.formatted_address().unwrap_or_default(),
            ]);
        }
        println!("{}", table.render());
    })
}

pub async fn get(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.sign_in().await?;
    let location = ctx.client().locations().get(id).await?;

    ctx.emit(&location, || {
        Status::header(&location.name);
        println!("  ID:       {}", location.id);
        if let Some(address) = location.formatted_address() {
            println!("  Address:  {address}");
        }
        if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
            println!("  Position: {lat:.6}, {lon:.6}");
        }
    })
}
