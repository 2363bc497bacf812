use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Match, ProviderReputation, Role};
use crate::services::{EngineStore, ReputationSink};

/// Mean and count of a provider's seeker ratings
///
/// An empty slice yields an unrated reputation (average 0, count 0).
pub fn aggregate(provider_id: &str, ratings: &[u8]) -> ProviderReputation {
    if ratings.is_empty() {
        return ProviderReputation::unrated(provider_id);
    }

    let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
    let count = ratings.len() as u32;

    ProviderReputation {
        provider_id: provider_id.to_string(),
        average: f64::from(sum) / f64::from(count),
        count,
        updated_at: Some(Utc::now()),
    }
}

/// Accepts one rating per role per match and keeps provider reputations current
///
/// Only seeker ratings feed the provider aggregate; provider ratings of
/// seekers are stored on the match and go no further.
#[derive(Clone)]
pub struct ReputationAggregator {
    store: Arc<dyn EngineStore>,
    sink: Arc<dyn ReputationSink>,
}

impl ReputationAggregator {
    pub fn new(store: Arc<dyn EngineStore>, sink: Arc<dyn ReputationSink>) -> Self {
        Self { store, sink }
    }

    /// Record a rating and, for seeker ratings, recompute the provider's reputation
    ///
    /// # Errors
    /// * `Validation` - rating outside 1..=5
    /// * `NotFound` - unknown match
    /// * `AlreadyRated` - this role already rated the match
    /// * `InvalidStateTransition` - match is neither active nor completed
    pub async fn submit_rating(
        &self,
        match_id: Uuid,
        by_role: Role,
        rating: u8,
        comment: Option<String>,
    ) -> Result<(Match, Option<ProviderReputation>), EngineError> {
        if !(1..=5).contains(&rating) {
            return Err(EngineError::Validation(format!("rating must be between 1 and 5 (got {})", rating)));
        }
        let comment = comment.as_deref().map(str::trim).filter(|c| !c.is_empty());

        let rated = match self
            .store
            .record_rating(match_id, by_role, rating, comment, Utc::now())
            .await?
        {
            Some(m) => m,
            None => return Err(self.reject(match_id, by_role).await),
        };

        tracing::info!("Match {} rated {} by {}", match_id, rating, by_role);

        if by_role != Role::Seeker {
            return Ok((rated, None));
        }

        let ratings = self.store.seeker_ratings_for_provider(&rated.provider_id).await?;
        let reputation = self.publish(aggregate(&rated.provider_id, &ratings)).await?;
        Ok((rated, Some(reputation)))
    }

    /// Work out why a conditional rating write did not apply
    ///
    /// A repeated seeker rating also brings the provider's reputation up to
    /// date, since the first attempt may have stored the rating and then
    /// failed before its recompute was saved.
    async fn reject(&self, match_id: Uuid, by_role: Role) -> EngineError {
        let current = match self.store.get_match(match_id).await {
            Ok(Some(m)) => m,
            Ok(None) => return EngineError::NotFound(format!("match {}", match_id)),
            Err(e) => return e.into(),
        };

        if current.feedback.rating_by(by_role).is_none() {
            return EngineError::InvalidStateTransition {
                match_id,
                from: current.status,
                action: "rate",
            };
        }

        if by_role == Role::Seeker {
            if let Err(e) = self.refresh_if_stale(&current.provider_id).await {
                return e;
            }
        }

        EngineError::AlreadyRated { match_id, role: by_role }
    }

    /// Recompute when the stored reputation covers fewer ratings than exist
    async fn refresh_if_stale(&self, provider_id: &str) -> Result<(), EngineError> {
        let ratings = self.store.seeker_ratings_for_provider(provider_id).await?;
        let stored = self.store.get_reputation(provider_id).await?.map_or(0, |r| r.count);
        if stored as usize >= ratings.len() {
            return Ok(());
        }

        tracing::warn!(
            "Provider {} reputation covers {} of {} rating(s); recomputing",
            provider_id,
            stored,
            ratings.len()
        );
        self.publish(aggregate(provider_id, &ratings)).await?;
        Ok(())
    }

    /// Save a recomputed reputation, then a best-effort publish
    async fn publish(&self, reputation: ProviderReputation) -> Result<ProviderReputation, EngineError> {
        self.store.save_reputation(&reputation).await?;

        tracing::info!(
            "Provider {} reputation now {:.2} over {} rating(s)",
            reputation.provider_id,
            reputation.average,
            reputation.count
        );

        if let Err(e) = self.sink.publish_reputation(&reputation).await {
            tracing::warn!("Failed to publish reputation for provider {}: {}", reputation.provider_id, e);
        }

        Ok(reputation)
    }

    pub async fn reputation(&self, provider_id: &str) -> Result<ProviderReputation, EngineError> {
        if provider_id.trim().is_empty() {
            return Err(EngineError::Validation("providerId is required".to_string()));
        }
        Ok(self
            .store
            .get_reputation(provider_id)
            .await?
            .unwrap_or_else(|| ProviderReputation::unrated(provider_id)))
    }
}
