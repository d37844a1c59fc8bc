//! Shared UI constants

use workorder_api_client::models::{WorkOrderPriority, WorkOrderStatus};
use workorder_geo::Coordinate;

/// Status choices for dropdowns and filters
pub const WORK_ORDER_STATUS_OPTIONS: [WorkOrderStatus; 5] = [
    WorkOrderStatus::Open,
    WorkOrderStatus::InProgress,
    WorkOrderStatus::Completed,
    WorkOrderStatus::Cancelled,
    WorkOrderStatus::OnHold,
];

/// Priority choices for dropdowns and filters
pub const WORK_ORDER_PRIORITY_OPTIONS: [WorkOrderPriority; 3] = WorkOrderPriority::ALL;

/// Statuses shown on the map
pub const ACTIVE_WORK_ORDER_STATUSES: [WorkOrderStatus; 2] = [WorkOrderStatus::Open, WorkOrderStatus::InProgress];

// Map defaults (New York)
/// Initial map center
pub const DEFAULT_MAP_CENTER: Coordinate = Coordinate {
    latitude: 40.7128,
    longitude: -74.006,
};
/// Initial map zoom level
pub const DEFAULT_MAP_ZOOM: u8 = 13;
/// OpenStreetMap tile URL template
pub const MAP_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
/// Attribution shown under the map
pub const MAP_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Whether orders with `status` belong on the map
pub fn is_active_status(status: WorkOrderStatus) -> bool {
    ACTIVE_WORK_ORDER_STATUSES.contains(&status)
}

/// Theme color name for a status
pub fn status_color(status: WorkOrderStatus) -> &'static str {
    match status {
        WorkOrderStatus::Open => "info",
        WorkOrderStatus::InProgress | WorkOrderStatus::OnHold => "warning",
        WorkOrderStatus::Completed => "success",
        WorkOrderStatus::Cancelled => "error",
    }
}

/// Theme color name for a priority
pub fn priority_color(priority: WorkOrderPriority) -> &'static str {
    match priority {
        WorkOrderPriority::Low => "info",
        WorkOrderPriority::Medium => "warning",
        WorkOrderPriority::High => "error",
    }
}
