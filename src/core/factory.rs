use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::scoring::CompatibilityScorer;
use crate::error::EngineError;
use crate::models::{Feedback, Interactions, Match, MatchKey, MatchStatus, SeekerAttributes, TargetAttributes};
use crate::services::{EngineStore, StoreError};

/// Outcome of a find-or-create
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matched: Match,
    /// True only for the call whose insert won
    pub created: bool,
}

/// Idempotent find-or-create of matches
///
/// Concurrent calls for the same key converge on one row: the storage
/// layer's unique index rejects the loser, which re-fetches the winner.
#[derive(Clone)]
pub struct MatchFactory {
    store: Arc<dyn EngineStore>,
    scorer: CompatibilityScorer,
    ttl: Duration,
}

impl MatchFactory {
    pub fn new(store: Arc<dyn EngineStore>, scorer: CompatibilityScorer, ttl_days: i64) -> Self {
        Self {
            store,
            scorer,
            ttl: Duration::days(ttl_days.max(1)),
        }
    }

    /// Return the open match for (seeker, provider, service), creating a pending one if absent
    pub async fn get_or_create(
        &self,
        seeker_id: &str,
        provider_id: &str,
        service_id: Option<&str>,
        seeker: &SeekerAttributes,
        target: &TargetAttributes,
    ) -> Result<MatchOutcome, EngineError> {
        if seeker_id == provider_id {
            return Err(EngineError::Validation("seeker and provider must differ".to_string()));
        }

        let key = MatchKey::new(seeker_id, provider_id, service_id);
        if let Some(existing) = self.store.find_open_match(&key).await? {
            tracing::debug!("Match already exists for {} -> {}: {}", seeker_id, provider_id, existing.id);
            return Ok(MatchOutcome {
                matched: existing,
                created: false,
            });
        }

        let candidate = self.build(&key, seeker, target);

        match self.store.insert_match(&candidate).await {
            Ok(()) => {
                tracing::info!(
                    "Created match {} for {} -> {} (score {:.1})",
                    candidate.id,
                    seeker_id,
                    provider_id,
                    candidate.compatibility.score
                );
                Ok(MatchOutcome {
                    matched: candidate,
                    created: true,
                })
            }
            Err(StoreError::Conflict(reason)) => {
                // Lost a race against the same logical request; return the winner
                tracing::debug!("Match insert conflict for {} -> {}: {}", seeker_id, provider_id, reason);
                match self.store.find_open_match(&key).await? {
                    Some(existing) => Ok(MatchOutcome {
                        matched: existing,
                        created: false,
                    }),
                    None => Err(EngineError::StorageConflict(format!(
                        "match for {} -> {} conflicted but could not be re-fetched",
                        seeker_id, provider_id
                    ))),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn build(&self, key: &MatchKey, seeker: &SeekerAttributes, target: &TargetAttributes) -> Match {
        let now = Utc::now();

        Match {
            id: Uuid::new_v4(),
            seeker_id: key.seeker_id.clone(),
            provider_id: key.provider_id.clone(),
            service_id: key.service_id.clone(),
            status: MatchStatus::Pending,
            compatibility: self.scorer.score(seeker, target),
            interactions: Interactions::default(),
            booking: None,
            feedback: Feedback::default(),
            chat_room_id: None,
            is_active: true,
            matched_at: now,
            expires_at: now + self.ttl,
            last_activity: now,
        }
    }
}
