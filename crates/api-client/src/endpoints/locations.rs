//! Location endpoints

use crate::client::WorkOrderClient;
use crate::error::ApiResult;
use crate::models::{Location, LocationCreate};

const BASE_PATH: &str = "/api/v1/locations";

/// Locations API interface
#[derive(Clone)]
pub struct LocationsApi {
    client: WorkOrderClient,
}

impl LocationsApi {
    pub(crate) fn new(client: WorkOrderClient) -> Self {
        Self { client }
    }

    /// GET /api/v1/locations
    pub async fn list(&self) -> ApiResult<Vec<Location>> {
        self.client.get(BASE_PATH).await
    }

    /// GET /api/v1/locations/{id}
    pub async fn get(&self, id: &str) -> ApiResult<Location> {
        self.client.get(&format!("{BASE_PATH}/{id}")).await
    }

    /// POST /api/v1/locations
    ///
    /// The backend returns the existing location when one with the same
    /// name and address already exists.
    pub async fn create(&self, location: &LocationCreate) -> ApiResult<Location> {
        self.client.post(BASE_PATH, location).await
    }
}

#[cfg(test)]
mod tests {
    use crate::endpoints::testing::{client, last_request};
    use crate::models::LocationCreate;
    use crate::transport::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_and_create() {
        let (api, transport) = client(200, json!([{"id": "l-1", "name": "Depot", "city": "Austin"}]));
        let locations = api.locations().list().await.unwrap();
        assert_eq!(locations[0].city.as_deref(), Some("Austin"));
        assert_eq!(last_request(&transport).path, "/api/v1/locations");

        let (api, transport) = client(201, json!({"id": "l-2", "name": "Yard"}));
        let mut create = LocationCreate::new("Yard");
        create.city = Some("Austin".to_string());
        let created = api.locations().create(&create).await.unwrap();
        assert_eq!(created.id, "l-2");

        let request = last_request(&transport);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Some(json!({"name": "Yard", "city": "Austin", "country": "USA"})));
    }
}
