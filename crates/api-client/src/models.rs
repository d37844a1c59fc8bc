//! Request and response types of the work-order REST API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Work order lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkOrderStatus {
    /// Not started
    #[serde(rename = "Open")]
    Open,
    /// Being worked on
    #[serde(rename = "In Progress")]
    InProgress,
    /// Done
    #[serde(rename = "Completed")]
    Completed,
    /// Abandoned
    #[serde(rename = "Cancelled")]
    Cancelled,
    /// Paused
    #[serde(rename = "On Hold")]
    OnHold,
}

impl WorkOrderStatus {
    /// Every status, in display order
    pub const ALL: [WorkOrderStatus; 5] = [
        Self::Open,
        Self::InProgress,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Label used by the API
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::OnHold => "On Hold",
        }
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().to_lowercase() == normalized)
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// Work order urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkOrderPriority {
    /// Can wait
    Low,
    /// Default urgency
    Medium,
    /// Needs attention first
    High,
}

impl WorkOrderPriority {
    /// Every priority, lowest first
    pub const ALL: [WorkOrderPriority; 3] = [Self::Low, Self::Medium, Self::High];

    /// Label used by the API
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for WorkOrderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkOrderPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown priority '{s}'"))
    }
}

/// A site where work happens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Location id
    pub id: String,
    /// Display name
    pub name: String,
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// State or province
    #[serde(default)]
    pub state_province: Option<String>,
    /// Postal code
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
    /// Stored latitude
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Stored longitude
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Location {
    /// Non-empty address parts joined with `", "`, suitable for geocoding
    #[must_use]
    pub fn formatted_address(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.address,
            &self.city,
            &self.state_province,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() { None } else { Some(parts.join(", ")) }
    }
}

/// Body of `POST /api/v1/locations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCreate {
    /// Display name
    pub name: String,
    /// Street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// City
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or province
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    /// Postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Country, `USA` unless set
    pub country: String,
    /// Known latitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Known longitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl LocationCreate {
    /// Named location with the backend's default country
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            city: None,
            state_province: None,
            postal_code: None,
            country: "USA".to_string(),
            latitude: None,
            longitude: None,
        }
    }
}

/// A unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Work order id
    pub id: String,
    /// Short summary
    pub title: String,
    /// Longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Lifecycle state
    pub status: WorkOrderStatus,
    /// Urgency
    pub priority: WorkOrderPriority,
    /// Expanded location, when the backend joins it
    #[serde(default)]
    pub location: Option<Location>,
    /// Location the work happens at
    #[serde(default)]
    pub location_id: Option<String>,
    /// Assignee
    #[serde(default)]
    pub assigned_to_user_id: Option<String>,
    /// Author
    pub created_by_user_id: String,
    /// Creation time (RFC 3339)
    pub created_at: String,
    /// Last modification (RFC 3339)
    pub updated_at: String,
}

/// Body of `POST /api/v1/work-orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderCreate {
    /// Short summary
    pub title: String,
    /// Longer description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial state
    pub status: WorkOrderStatus,
    /// Urgency
    pub priority: WorkOrderPriority,
    /// Location the work happens at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Assignee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<String>,
}

impl WorkOrderCreate {
    /// New open, medium-priority work order
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: WorkOrderStatus::Open,
            priority: WorkOrderPriority::Medium,
            location_id: None,
            assigned_to_user_id: None,
        }
    }
}

/// Body of `PUT /api/v1/work-orders/{id}`; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderUpdate {
    /// New summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkOrderStatus>,
    /// New urgency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<WorkOrderPriority>,
    /// New location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// New assignee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<String>,
}

impl WorkOrderUpdate {
    /// Whether no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Page metadata of a list response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Current page, 1-based
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total matching records
    pub total: u64,
    /// Number of pages
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// `GET /api/v1/work-orders` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrdersResponse {
    /// Work orders on this page
    pub data: Vec<WorkOrder>,
    /// Total matching records
    pub count: u64,
    /// Page metadata, when paginated
    #[serde(default)]
    pub pagination: Option<PaginationInfo>,
}

/// Filters for listing work orders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkOrderQuery {
    /// Page to fetch, 1-based
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
    /// Only this status
    pub status: Option<WorkOrderStatus>,
    /// Only this priority
    pub priority: Option<WorkOrderPriority>,
    /// Only work assigned to this user id
    pub assigned_to: Option<String>,
}

/// Credentials for sign-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSignUp {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Credentials for sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSignIn {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Body of `POST /api/v1/auth/refresh`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRefresh {
    /// Refresh token from the current session
    pub refresh_token: String,
}

/// User as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    /// User id
    pub id: String,
    /// Account email
    pub email: String,
    /// Account creation time
    pub created_at: String,
    /// Last profile update
    #[serde(default)]
    pub updated_at: Option<String>,
    /// When the email was confirmed
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Most recent sign-in
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
}

/// Session as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Bearer token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Token scheme
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    /// Expiry as a unix timestamp
    pub expires_at: i64,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Sign-up, sign-in and refresh response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Signed-in user
    pub user: UserResponse,
    /// Session, absent until the email is confirmed
    #[serde(default)]
    pub session: Option<SessionResponse>,
}

/// Plain acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Backend message
    pub message: String,
}
