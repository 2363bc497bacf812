use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::models::{ProviderReputation, Role, SeekerAttributes, TargetAttributes, TargetType};
use crate::services::catalog::CatalogError;

/// A swipeable provider or service as seen by the profile/catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "targetType")]
    pub target_type: TargetType,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    /// Owning provider; equal to `target_id` for provider targets
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub attributes: TargetAttributes,
}

/// An authenticated actor as seen by the identity service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedActor {
    #[serde(rename = "actorId")]
    pub actor_id: String,
    pub role: Role,
    pub attributes: SeekerAttributes,
}

/// Profile/catalog lookups for swipe targets
#[async_trait]
pub trait TargetDirectory: Send + Sync {
    async fn resolve_target(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<ResolvedTarget>, CatalogError>;
}

/// Identity lookups for actors
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    async fn resolve_actor(&self, actor_id: &str) -> Result<Option<ResolvedActor>, CatalogError>;
}

/// Receiver of recomputed provider reputations
#[async_trait]
pub trait ReputationSink: Send + Sync {
    async fn publish_reputation(&self, reputation: &ProviderReputation) -> Result<(), CatalogError>;
}

/// Fixed in-memory directory for tests and local runs
#[derive(Default)]
pub struct StaticDirectory {
    targets: HashMap<(String, TargetType), ResolvedTarget>,
    actors: HashMap<String, ResolvedActor>,
    published: Mutex<Vec<ProviderReputation>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(self, provider_id: &str, attributes: TargetAttributes) -> Self {
        self.with_target(provider_id, TargetType::Provider, provider_id, true, attributes)
    }

    pub fn with_service(self, service_id: &str, provider_id: &str, attributes: TargetAttributes) -> Self {
        self.with_target(service_id, TargetType::Service, provider_id, true, attributes)
    }

    pub fn with_target(
        mut self,
        target_id: &str,
        target_type: TargetType,
        provider_id: &str,
        is_active: bool,
        attributes: TargetAttributes,
    ) -> Self {
        self.targets.insert(
            (target_id.to_string(), target_type),
            ResolvedTarget {
                target_id: target_id.to_string(),
                target_type,
                is_active,
                provider_id: provider_id.to_string(),
                attributes,
            },
        );
        self
    }

    pub fn with_actor(mut self, actor_id: &str, role: Role, attributes: SeekerAttributes) -> Self {
        self.actors.insert(
            actor_id.to_string(),
            ResolvedActor {
                actor_id: actor_id.to_string(),
                role,
                attributes,
            },
        );
        self
    }

    /// Reputations published so far, oldest first
    pub async fn published(&self) -> Vec<ProviderReputation> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl TargetDirectory for StaticDirectory {
    async fn resolve_target(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<ResolvedTarget>, CatalogError> {
        Ok(self.targets.get(&(target_id.to_string(), target_type)).cloned())
    }
}

#[async_trait]
impl ActorDirectory for StaticDirectory {
    async fn resolve_actor(&self, actor_id: &str) -> Result<Option<ResolvedActor>, CatalogError> {
        Ok(self.actors.get(actor_id).cloned())
    }
}

#[async_trait]
impl ReputationSink for StaticDirectory {
    async fn publish_reputation(&self, reputation: &ProviderReputation) -> Result<(), CatalogError> {
        self.published.lock().await.push(reputation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory_lookup() {
        let directory = StaticDirectory::new()
            .with_provider("p1", TargetAttributes::default())
            .with_service("svc1", "p1", TargetAttributes::default())
            .with_actor("s1", Role::Seeker, SeekerAttributes::default());

        let service = directory
            .resolve_target("svc1", TargetType::Service)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(service.provider_id, "p1");

        // Same id under another target type is a different target
        assert!(directory.resolve_target("svc1", TargetType::Provider).await.unwrap().is_none());
        assert_eq!(directory.resolve_actor("s1").await.unwrap().unwrap().role, Role::Seeker);
    }
}
