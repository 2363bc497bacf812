use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{ProviderReputation, Role, SeekerAttributes, TargetAttributes, TargetType};
use crate::services::directory::{ActorDirectory, ReputationSink, ResolvedActor, ResolvedTarget, TargetDirectory};

/// Errors that can occur when talking to the profile/catalog service
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct TargetDocument {
    #[serde(rename = "isActive", default = "default_true")]
    is_active: bool,
    #[serde(rename = "providerId", default)]
    provider_id: Option<String>,
    #[serde(default)]
    attributes: TargetAttributes,
}

#[derive(Debug, Deserialize)]
struct ActorDocument {
    role: String,
    #[serde(default)]
    attributes: SeekerAttributes,
}

#[derive(Debug, Serialize)]
struct ReputationPayload {
    average: f64,
    count: u32,
}

fn default_true() -> bool {
    true
}

/// HTTP client for the profile/catalog and identity services
///
/// Handles:
/// - Resolving providers and services (existence, activity, scoring attributes)
/// - Resolving actors to a role and seeker attributes
/// - Publishing recomputed provider ratings back to the provider record
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            collection,
            urlencoding::encode(id)
        )
    }

    /// GET a document; `Ok(None)` on 404
    async fn fetch<T>(&self, url: &str) -> Result<Option<T>, CatalogError>
    where
        T: for<'de> Deserialize<'de>,
    {
        tracing::debug!("Fetching catalog document: {}", url);

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(CatalogError::Unauthorized),
            status if !status.is_success() => {
                return Err(CatalogError::ApiError(format!("Failed to fetch {}: {}", url, status)));
            }
            _ => {}
        }

        let doc = response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        Ok(Some(doc))
    }
}

#[async_trait]
impl TargetDirectory for CatalogClient {
    async fn resolve_target(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<ResolvedTarget>, CatalogError> {
        let collection = match target_type {
            TargetType::Provider => "providers",
            TargetType::Service => "services",
        };

        let Some(doc) = self.fetch::<TargetDocument>(&self.url(collection, target_id)).await? else {
            return Ok(None);
        };

        let provider_id = match (target_type, doc.provider_id) {
            (TargetType::Provider, _) => target_id.to_string(),
            (TargetType::Service, Some(owner)) => owner,
            (TargetType::Service, None) => {
                return Err(CatalogError::InvalidResponse(format!(
                    "service {} has no providerId",
                    target_id
                )));
            }
        };

        Ok(Some(ResolvedTarget {
            target_id: target_id.to_string(),
            target_type,
            is_active: doc.is_active,
            provider_id,
            attributes: doc.attributes,
        }))
    }
}

#[async_trait]
impl ActorDirectory for CatalogClient {
    async fn resolve_actor(&self, actor_id: &str) -> Result<Option<ResolvedActor>, CatalogError> {
        let Some(doc) = self.fetch::<ActorDocument>(&self.url("users", actor_id)).await? else {
            return Ok(None);
        };

        let role: Role = doc.role.parse().map_err(CatalogError::InvalidResponse)?;

        Ok(Some(ResolvedActor {
            actor_id: actor_id.to_string(),
            role,
            attributes: doc.attributes,
        }))
    }
}

#[async_trait]
impl ReputationSink for CatalogClient {
    async fn publish_reputation(&self, reputation: &ProviderReputation) -> Result<(), CatalogError> {
        let url = format!("{}/rating", self.url("providers", &reputation.provider_id));

        let response = self
            .client
            .put(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&ReputationPayload {
                average: reputation.average,
                count: reputation.count,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::ApiError(format!(
                "Failed to publish rating: {}",
                response.status()
            )));
        }

        tracing::debug!("Published rating for provider {}", reputation.provider_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> CatalogClient {
        CatalogClient::new(server.url(), "test_key".to_string(), 5).unwrap()
    }

    #[test]
    fn test_catalog_client_creation() {
        let client = CatalogClient::new("https://catalog.test/v1/".to_string(), "test_key".to_string(), 5).unwrap();

        assert_eq!(client.url("providers", "p 1"), "https://catalog.test/v1/providers/p%201");
        assert_eq!(client.api_key, "test_key");
    }

    #[tokio::test]
    async fn test_resolve_service_target() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/services/svc1")
            .match_header("X-Api-Key", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"isActive": true, "providerId": "p1", "attributes": {"price": 120.0, "specializations": ["family"]}}"#)
            .create_async()
            .await;

        let target = client_for(&server)
            .resolve_target("svc1", TargetType::Service)
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(target.provider_id, "p1");
        assert_eq!(target.attributes.price, Some(120.0));
        assert!(target.is_active);
    }

    #[tokio::test]
    async fn test_missing_target_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/providers/ghost")
            .with_status(404)
            .create_async()
            .await;

        let target = client_for(&server)
            .resolve_target("ghost", TargetType::Provider)
            .await
            .unwrap();

        assert!(target.is_none());
    }

    #[tokio::test]
    async fn test_resolve_actor_role() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/s1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"role": "client", "attributes": {"needs": ["divorce"]}}"#)
            .create_async()
            .await;

        let actor = client_for(&server).resolve_actor("s1").await.unwrap().unwrap();

        assert_eq!(actor.role, Role::Seeker);
        assert_eq!(actor.attributes.needs, vec!["divorce"]);
    }

    #[tokio::test]
    async fn test_unauthorized_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/users/s1").with_status(401).create_async().await;

        let result = client_for(&server).resolve_actor("s1").await;
        assert!(matches!(result, Err(CatalogError::Unauthorized)));
    }
}
