//! Shared, session-less endpoints

use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Brand list route
pub const BRANDS_PATH: &str = "/home/brand";

/// Common API interface
#[derive(Clone)]
pub struct CommonApi {
    client: ApiClient,
}

impl CommonApi {
    /// Create a new common API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List phone brands for the home page
    ///
    /// GET /home/brand
    pub async fn get_brands(&self) -> ApiResult<Vec<Brand>> {
        self.client.get(BRANDS_PATH).await
    }
}

/// Phone brand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    /// Server-side identifier, numeric or string
    #[serde(default)]
    pub id: Value,
    /// Brand name
    pub name: String,
    /// Logo URL
    #[serde(default, alias = "logoUrl")]
    pub logo: Option<String>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
