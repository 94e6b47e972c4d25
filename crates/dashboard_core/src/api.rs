use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Metrics, Person, SessionState},
    protocol::{people_from_value, Resource},
};

use crate::error::SyncError;

/// Read side of the seating backend. One call per resource; the sync
/// controller decides how results are combined.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_metrics(&self) -> Result<Metrics, SyncError>;
    async fn fetch_people(&self) -> Result<Vec<Person>, SyncError>;
    async fn fetch_session(&self) -> Result<SessionState, SyncError>;
}

pub struct HttpDashboardApi {
    http: Client,
    base_url: String,
}

impl HttpDashboardApi {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, SyncError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| SyncError::Transport {
                resource: Resource::Metrics,
                message: format!("failed to build http client: {err}"),
            })?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: Resource) -> Result<T, SyncError> {
        let url = format!("{}{}", self.base_url, resource.path());
        self.http
            .get(url)
            .send()
            .await
            .map_err(|err| SyncError::from_reqwest(resource, err))?
            .error_for_status()
            .map_err(|err| SyncError::from_reqwest(resource, err))?
            .json::<T>()
            .await
            .map_err(|err| SyncError::from_reqwest(resource, err))
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_metrics(&self) -> Result<Metrics, SyncError> {
        self.get_json(Resource::Metrics).await
    }

    async fn fetch_people(&self) -> Result<Vec<Person>, SyncError> {
        let body: serde_json::Value = self.get_json(Resource::Users).await?;
        people_from_value(body).map_err(|err| SyncError::Decode {
            resource: Resource::Users,
            message: err.to_string(),
        })
    }

    async fn fetch_session(&self) -> Result<SessionState, SyncError> {
        self.get_json(Resource::Ready).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
