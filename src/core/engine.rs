use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::core::{
    chat::ChatRoomProvisioner,
    factory::{MatchFactory, MatchOutcome},
    reputation::ReputationAggregator,
    scoring::CompatibilityScorer,
    state_machine::MatchStateMachine,
    swipes::SwipeStore,
};
use crate::error::EngineError;
use crate::models::{Match, MatchKey, Role, Swipe, SwipeAction, TargetType};
use crate::services::{ActorDirectory, EngineStore, ReputationSink, ResolvedActor, ResolvedTarget, TargetDirectory};

/// Result of a swipe
#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    pub matched: Option<Match>,
    /// True when this swipe created the match
    pub created: bool,
}

/// Collaborators the engine resolves identities and targets through
#[derive(Clone)]
pub struct Directories {
    pub targets: Arc<dyn TargetDirectory>,
    pub actors: Arc<dyn ActorDirectory>,
    pub reputation_sink: Arc<dyn ReputationSink>,
}

impl Directories {
    /// Use one value for all three roles
    pub fn shared<D>(directory: Arc<D>) -> Self
    where
        D: TargetDirectory + ActorDirectory + ReputationSink + 'static,
    {
        Self {
            targets: directory.clone(),
            actors: directory.clone(),
            reputation_sink: directory,
        }
    }
}

/// Match lifecycle engine
///
/// Composes swipe recording with match creation and owns the lifecycle
/// components the HTTP layer calls into.
#[derive(Clone)]
pub struct MatchEngine {
    store: Arc<dyn EngineStore>,
    actors: Arc<dyn ActorDirectory>,
    swipes: SwipeStore,
    factory: MatchFactory,
    lifecycle: MatchStateMachine,
    ratings: ReputationAggregator,
}

impl MatchEngine {
    pub fn new(
        store: Arc<dyn EngineStore>,
        directories: Directories,
        scorer: CompatibilityScorer,
        match_ttl_days: i64,
    ) -> Self {
        let chat = ChatRoomProvisioner::new(store.clone());

        Self {
            swipes: SwipeStore::new(store.clone(), directories.targets),
            factory: MatchFactory::new(store.clone(), scorer, match_ttl_days),
            lifecycle: MatchStateMachine::new(store.clone(), chat),
            ratings: ReputationAggregator::new(store.clone(), directories.reputation_sink),
            actors: directories.actors,
            store,
        }
    }

    pub fn swipes(&self) -> &SwipeStore {
        &self.swipes
    }

    pub fn lifecycle(&self) -> &MatchStateMachine {
        &self.lifecycle
    }

    pub fn ratings(&self) -> &ReputationAggregator {
        &self.ratings
    }

    /// Record a swipe and, for a seeker's like or super-like, find or create the match
    ///
    /// The actor is resolved before anything is written so an unknown
    /// actor never leaves behind a swipe that can no longer produce a match.
    pub async fn swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        target_type: &str,
        action: &str,
    ) -> Result<SwipeOutcome, EngineError> {
        let target_type: TargetType = target_type.parse().map_err(EngineError::Validation)?;
        let action: SwipeAction = action.parse().map_err(EngineError::Validation)?;

        let actor_id = actor_id.trim();
        let target_id = target_id.trim();
        if actor_id.is_empty() || target_id.is_empty() {
            return Err(EngineError::Validation("actorId and targetId are required".to_string()));
        }

        let actor = if action.signals_interest() {
            Some(self.resolve_actor(actor_id).await?)
        } else {
            None
        };

        let recorded = match self.swipes.record(actor_id, target_id, target_type, action).await {
            Ok(recorded) => recorded,
            Err(duplicate @ EngineError::DuplicateSwipe { .. }) => {
                if let Some(seeker) = actor.as_ref().filter(|a| a.role == Role::Seeker) {
                    self.recover_match(seeker, target_id, target_type).await?;
                }
                return Err(duplicate);
            }
            Err(e) => return Err(e),
        };

        let outcome = match actor {
            Some(actor) if actor.role == Role::Seeker => self.match_for(&actor, &recorded.target).await?,
            Some(actor) => {
                tracing::debug!("Swipe by {} actor {} does not create matches", actor.role, actor.actor_id);
                None
            }
            None => None,
        };

        Ok(SwipeOutcome {
            swipe: recorded.swipe,
            created: outcome.as_ref().is_some_and(|o| o.created),
            matched: outcome.map(|o| o.matched),
        })
    }

    /// Find or create the match for a seeker's interest in a target
    async fn match_for(
        &self,
        seeker: &ResolvedActor,
        target: &ResolvedTarget,
    ) -> Result<Option<MatchOutcome>, EngineError> {
        if target.provider_id == seeker.actor_id {
            tracing::debug!("Actor {} swiped on own {}; no match", seeker.actor_id, target.target_type);
            return Ok(None);
        }

        let outcome = self
            .factory
            .get_or_create(
                &seeker.actor_id,
                &target.provider_id,
                service_id(target),
                &seeker.attributes,
                &target.attributes,
            )
            .await?;

        Ok(Some(outcome))
    }

    /// Create the match a stored interest swipe never got
    ///
    /// A swipe is written before its match, so a failed match insert leaves
    /// the slot taken with nothing behind it. Only keys that never had a
    /// match are repaired; archived or declined history stays closed.
    async fn recover_match(
        &self,
        seeker: &ResolvedActor,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<(), EngineError> {
        let Some(stored) = self.swipes.find(&seeker.actor_id, target_id, target_type).await? else {
            return Ok(());
        };
        if !stored.signals_interest() {
            return Ok(());
        }

        let key = MatchKey::new(&seeker.actor_id, &stored.target.provider_id, service_id(&stored.target));
        if self.store.match_exists(&key).await? {
            return Ok(());
        }

        if let Some(outcome) = self.match_for(seeker, &stored.target).await? {
            tracing::warn!(
                "Recovered match {} for earlier swipe {} -> {}:{}",
                outcome.matched.id,
                seeker.actor_id,
                target_type,
                target_id
            );
        }
        Ok(())
    }

    async fn resolve_actor(&self, actor_id: &str) -> Result<ResolvedActor, EngineError> {
        self.actors
            .resolve_actor(actor_id)
            .await?
            .ok_or_else(|| EngineError::Unauthorized(format!("unknown actor {}", actor_id)))
    }

    /// Flip overdue pending matches to expired; returns how many changed
    pub async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64, EngineError> {
        let expired = self.store.expire_pending(now).await?;
        if expired > 0 {
            tracing::info!("Expired {} pending match(es)", expired);
        }
        Ok(expired)
    }

    pub async fn health_check(&self) -> bool {
        match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Storage health check failed: {}", e);
                false
            }
        }
    }
}

/// Service targets key their own lineage; provider targets carry none
fn service_id(target: &ResolvedTarget) -> Option<&str> {
    match target.target_type {
        TargetType::Service => Some(target.target_id.as_str()),
        TargetType::Provider => None,
    }
}
