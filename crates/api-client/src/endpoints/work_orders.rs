//! Work order endpoints

use crate::client::WorkOrderClient;
use crate::error::ApiResult;
use crate::models::{WorkOrder, WorkOrderCreate, WorkOrderQuery, WorkOrderUpdate, WorkOrdersResponse};
use crate::transport::ApiRequest;

const BASE_PATH: &str = "/api/v1/work-orders";

/// Work orders API interface
#[derive(Clone)]
pub struct WorkOrdersApi {
    client: WorkOrderClient,
}

impl WorkOrdersApi {
    pub(crate) fn new(client: WorkOrderClient) -> Self {
        Self { client }
    }

    /// List work orders with filters and pagination
    ///
    /// GET /api/v1/work-orders
    pub async fn list(&self, query: &WorkOrderQuery) -> ApiResult<WorkOrdersResponse> {
        let request = ApiRequest::get(BASE_PATH)
            .with_optional_query("page", query.page)
            .with_optional_query("limit", query.limit)
            .with_optional_query("status", query.status)
            .with_optional_query("priority", query.priority)
            .with_optional_query("assigned_to", query.assigned_to.as_deref());
        self.client.send(request).await
    }

    /// Get a single work order
    ///
    /// GET /api/v1/work-orders/{id}
    pub async fn get(&self, id: &str) -> ApiResult<WorkOrder> {
        self.client.get(&format!("{BASE_PATH}/{id}")).await
    }

    /// Create a work order
    ///
    /// POST /api/v1/work-orders
    pub async fn create(&self, work_order: &WorkOrderCreate) -> ApiResult<WorkOrder> {
        self.client.post(BASE_PATH, work_order).await
    }

    /// Update a work order; unset fields are left unchanged
    ///
    /// PUT /api/v1/work-orders/{id}
    pub async fn update(&self, id: &str, update: &WorkOrderUpdate) -> ApiResult<WorkOrder> {
        self.client.put(&format!("{BASE_PATH}/{id}"), update).await
    }

    /// Delete a work order
    ///
    /// DELETE /api/v1/work-orders/{id}
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&format!("{BASE_PATH}/{id}")).await
    }
}
