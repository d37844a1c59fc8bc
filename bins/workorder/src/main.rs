//! workorder - command-line client for the work-order management API
//!
//! Lists and edits work orders and locations, checks service health and
//! places active work orders on the map through the geocoding service.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use workorder_api_client::models::{WorkOrderPriority, WorkOrderStatus};
use workorder_api_client::ApiError;
use workorder_cli::OutputFormat;

mod commands;
mod context;

use commands::{geocode, health, locations, map, orders, whoami};
use context::AppContext;

/// Work-order management from the terminal
#[derive(Parser)]
#[command(name = "workorder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Configuration file (defaults to workorder.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,

    /// Manage work orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },

    /// Browse locations
    Locations {
        #[command(subcommand)]
        action: LocationsAction,
    },

    /// Resolve addresses to coordinates
    Geocode {
        /// Addresses to resolve
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Place active work orders on the map
    Map {
        /// Maximum number of work orders to fetch
        #[arg(short, long, default_value = "100")]
        limit: u32,
    },

    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List work orders
    List {
        #[arg(long)]
        page: Option<u32>,

        #[arg(short, long)]
        limit: Option<u32>,

        /// Filter by status (e.g. open, "in progress")
        #[arg(short, long)]
        status: Option<WorkOrderStatus>,

        /// Filter by priority
        #[arg(short, long)]
        priority: Option<WorkOrderPriority>,

        /// Filter by assignee user id
        #[arg(long)]
        assigned_to: Option<String>,
    },

    /// Show one work order
    Get { id: String },

    /// Create a work order
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        status: Option<WorkOrderStatus>,

        #[arg(short, long)]
        priority: Option<WorkOrderPriority>,

        #[arg(long)]
        location_id: Option<String>,

        #[arg(long)]
        assign: Option<String>,
    },

    /// Change fields of a work order
    Update {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        status: Option<WorkOrderStatus>,

        #[arg(short, long)]
        priority: Option<WorkOrderPriority>,

        #[arg(long)]
        location_id: Option<String>,

        #[arg(long)]
        assign: Option<String>,
    },

    /// Delete a work order
    Delete { id: String },
}

#[derive(Subcommand)]
enum LocationsAction {
    /// List locations
    List,

    /// Show one location
    Get { id: String },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::load(cli.config.as_deref(), cli.format)?;
    let _telemetry = ctx.init_telemetry(cli.verbose)?;

    match cli.command {
        Commands::Health => health::run(&ctx).await,

        Commands::Orders { action } => match action {
            OrdersAction::List {
                page,
                limit,
                status,
                priority,
                assigned_to,
            } => {
                let query = workorder_api_client::models::WorkOrderQuery {
                    page,
                    limit,
                    status,
                    priority,
                    assigned_to,
                };
                orders::list(&ctx, &query).await
            }
            OrdersAction::Get { id } => orders::get(&ctx, &id).await,
            OrdersAction::Create {
                title,
                description,
                status,
                priority,
                location_id,
                assign,
            } => {
                let mut order = workorder_api_client::models::WorkOrderCreate::new(title);
                order.description = description;
                if let Some(status) = status {
                    order.status = status;
                }
                if let Some(priority) = priority {
                    order.priority = priority;
                }
                order.location_id = location_id;
                order.assigned_to_user_id = assign;
                orders::create(&ctx, &order).await
            }
            OrdersAction::Update {
                id,
                title,
                description,
                status,
                priority,
                location_id,
                assign,
            } => {
                let update = workorder_api_client::models::WorkOrderUpdate {
                    title,
                    description,
                    status,
                    priority,
                    location_id,
                    assigned_to_user_id: assign,
                };
                orders::update(&ctx, &id, &update).await
            }
            OrdersAction::Delete { id } => orders::delete(&ctx, &id).await,
        },

        Commands::Locations { action } => match action {
            LocationsAction::List => locations::list(&ctx).await,
            LocationsAction::Get { id } => locations::get(&ctx, &id).await,
        },

        Commands::Geocode { addresses } => geocode::run(&ctx, &addresses).await,

        Commands::Map { limit } => map::run(&ctx, limit).await,

        Commands::Whoami => whoami::run(&ctx).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), with_error_code(e));
            ExitCode::FAILURE
        }
    }
}

/// API failures are reported with their error code and recovery hint
fn with_error_code(err: anyhow::Error) -> anyhow::Error {
    match err.downcast::<ApiError>() {
        Ok(api) => workorder_core::Error::from(api).into(),
        Err(other) => other,
    }
}
