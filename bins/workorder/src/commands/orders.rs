//! Work-order commands

use crate::context::AppContext;
use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use workorder_api_client::models::{WorkOrder, WorkOrderCreate, WorkOrderQuery, WorkOrderUpdate};
use workorder_cli::output::{colorize_priority, colorize_status, format_count, work_order_table};
use workorder_cli::Status;

pub async fn list(ctx: &AppContext, query: &WorkOrderQuery) -> Result<()> {
    ctx.sign_in().await?;
    let response = ctx.client().work_orders().list(query).await?;

    ctx.emit(&response, || {
        if response.data.is_empty() {
            Status::info("No work orders found");
            return;
        }
        println!("{}", work_order_table(&response.data).render());
        println!();
        let shown = format_count(response.data.len(), "work order", "work orders");
        match &response.pagination {
            Some(p) => println!("{shown} of {} (page {}/{})", response.count, p.page, p.total_pages.max(1)),
            None => println!("{shown} of {}", response.count),
        }
    })
}

pub async fn get(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.sign_in().await?;
    let order = ctx.client().work_orders().get(id).await?;
    ctx.emit(&order, || print_order(&order))
}

pub async fn create(ctx: &AppContext, order: &WorkOrderCreate) -> Result<()> {
    ctx.sign_in().await?;
    let created = ctx.client().work_orders().create(order).await?;
    ctx.emit(&created, || {
        Status::success(&format!("Created work order {}", created.id));
        print_order(&created);
    })
}

pub async fn update(ctx: &AppContext, id: &str, update: &WorkOrderUpdate) -> Result<()> {
    if update.is_empty() {
        bail!("nothing to update: pass at least one field to change");
    }
    ctx.sign_in().await?;
    let updated = ctx.client().work_orders().update(id, update).await?;
    ctx.emit(&updated, || {
        Status::success(&format!("Updated work order {}", updated.id));
        print_order(&updated);
    })
}

pub async fn delete(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.sign_in().await?;
    ctx.client().work_orders().delete(id).await?;
    ctx.emit(&serde_json::json!({ "deleted": id }), || {
        Status::success(&format!("Deleted work order {id}"));
    })
}

fn print_order(order: &WorkOrder) {
    Status::header(&order.title);
    println!("  ID:        {}", order.id);
    println!("  Status:    {}", colorize_status(order.status));
    println!("  Priority:  {}", colorize_priority(order.priority));
    if let Some(description) = &order.description {
        println!("  Details:   {description}");
    }
    if let Some(location) = &order.location {
        let address = location.formatted_address().unwrap_or_default();
        println!("  Location:  {} {}", location.name, address.dimmed());
    }
    if let Some(assignee) = &order.assigned_to_user_id {
        println!("  Assignee:  {assignee}");
    }
    println!("  Updated:   {}", order.updated_at.dimmed());
}
