//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for one group of backend routes.
//!
//! | Module | Routes |
//! |--------|--------|
//! | `work_orders` | `/api/v1/work-orders`, `/api/v1/work-orders/{id}` |
//! | `locations` | `/api/v1/locations`, `/api/v1/locations/{id}` |
//! | `auth` | `/api/v1/auth/*` |
//! | `health` | `/health`, `/` |

pub mod auth;
pub mod health;
pub mod locations;
pub mod work_orders;

pub use auth::AuthApi;
pub use health::HealthApi;
pub use locations::LocationsApi;
pub use work_orders::WorkOrdersApi;
