use std::sync::Arc;

use crate::error::EngineError;
use crate::models::{Swipe, SwipeAction, TargetType};
use crate::services::{EngineStore, ResolvedTarget, TargetDirectory};

/// A persisted swipe together with the target it resolved to
#[derive(Debug, Clone)]
pub struct RecordedSwipe {
    pub swipe: Swipe,
    pub target: ResolvedTarget,
}

impl RecordedSwipe {
    /// Whether the caller should evaluate a match for this swipe
    pub fn signals_interest(&self) -> bool {
        self.swipe.action.signals_interest()
    }
}

/// Durable, deduplicated record of one decision per (actor, target) pair
///
/// Recording never evaluates matches itself; callers compose it with
/// `MatchFactory` so both halves stay independently testable.
#[derive(Clone)]
pub struct SwipeStore {
    store: Arc<dyn EngineStore>,
    targets: Arc<dyn TargetDirectory>,
}

impl SwipeStore {
    pub fn new(store: Arc<dyn EngineStore>, targets: Arc<dyn TargetDirectory>) -> Self {
        Self { store, targets }
    }

    /// Record a swipe given wire-format enum values
    pub async fn record_raw(
        &self,
        actor_id: &str,
        target_id: &str,
        target_type: &str,
        action: &str,
    ) -> Result<RecordedSwipe, EngineError> {
        let target_type: TargetType = target_type.parse().map_err(EngineError::Validation)?;
        let action: SwipeAction = action.parse().map_err(EngineError::Validation)?;
        self.record(actor_id, target_id, target_type, action).await
    }

    /// Validate, resolve the target, and insert-if-absent
    ///
    /// # Errors
    /// * `Validation` - empty ids or a self-swipe
    /// * `UnknownTarget` - target missing or inactive in the catalog
    /// * `DuplicateSwipe` - the actor already swiped on this target, whatever the stored action
    pub async fn record(
        &self,
        actor_id: &str,
        target_id: &str,
        target_type: TargetType,
        action: SwipeAction,
    ) -> Result<RecordedSwipe, EngineError> {
        let actor_id = actor_id.trim();
        let target_id = target_id.trim();
        if actor_id.is_empty() || target_id.is_empty() {
            return Err(EngineError::Validation("actorId and targetId are required".to_string()));
        }
        if actor_id == target_id {
            return Err(EngineError::Validation("an actor cannot swipe on itself".to_string()));
        }

        let unknown = || EngineError::UnknownTarget {
            target_id: target_id.to_string(),
            target_type,
        };
        let target = self
            .targets
            .resolve_target(target_id, target_type)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(unknown)?;

        let swipe = Swipe::new(actor_id, target_id, target_type, action);
        if !self.store.insert_swipe(&swipe).await? {
            tracing::debug!("Duplicate swipe rejected: {} -> {}:{}", actor_id, target_type, target_id);
            return Err(EngineError::DuplicateSwipe {
                actor_id: actor_id.to_string(),
                target_id: target_id.to_string(),
                target_type,
            });
        }

        tracing::info!(
            "Recorded swipe: {} -> {}:{} ({})",
            actor_id,
            target_type,
            target_id,
            action.as_str()
        );

        Ok(RecordedSwipe { swipe, target })
    }

    /// The stored swipe for a slot together with its target, if both still exist
    ///
    /// Returns `None` when nothing was recorded or the target has since gone
    /// missing or inactive.
    pub async fn find(
        &self,
        actor_id: &str,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<RecordedSwipe>, EngineError> {
        let Some(swipe) = self.store.find_swipe(actor_id, target_id, target_type).await? else {
            return Ok(None);
        };

        let target = self
            .targets
            .resolve_target(target_id, target_type)
            .await?
            .filter(|t| t.is_active);

        Ok(target.map(|target| RecordedSwipe { swipe, target }))
    }

    /// Page through an actor's swipes, newest first; returns the page and the total count
    pub async fn history(&self, actor_id: &str, limit: u32, offset: u32) -> Result<(Vec<Swipe>, i64), EngineError> {
        if actor_id.trim().is_empty() {
            return Err(EngineError::Validation("actorId is required".to_string()));
        }
        let swipes = self.store.list_swipes(actor_id, limit, offset).await?;
        let total = self.store.count_swipes(actor_id).await?;
        Ok((swipes, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetAttributes;
    use crate::services::{MemoryStore, StaticDirectory};

    fn swipe_store() -> (SwipeStore, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let directory = StaticDirectory::new()
            .with_provider("p1", TargetAttributes::default())
            .with_target("p2", TargetType::Provider, "p2", false, TargetAttributes::default());
        (SwipeStore::new(store.clone(), Arc::new(directory)), store)
    }

    #[tokio::test]
    async fn test_second_swipe_is_duplicate_regardless_of_action() {
        let (swipes, store) = swipe_store();

        let first = swipes.record("s1", "p1", TargetType::Provider, SwipeAction::Pass).await.unwrap();
        assert!(!first.signals_interest());

        let second = swipes.record("s1", "p1", TargetType::Provider, SwipeAction::Like).await;
        assert!(matches!(second, Err(EngineError::DuplicateSwipe { .. })));
        assert_eq!(store.count_swipes("s1").await.unwrap(), 1);

        // The slot keeps the first decision
        let stored = swipes.find("s1", "p1", TargetType::Provider).await.unwrap().unwrap();
        assert_eq!(stored.swipe.action, SwipeAction::Pass);
        assert!(swipes.find("s2", "p1", TargetType::Provider).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inactive_or_missing_target_is_unknown() {
        let (swipes, _) = swipe_store();

        let inactive = swipes.record("s1", "p2", TargetType::Provider, SwipeAction::Like).await;
        assert!(matches!(inactive, Err(EngineError::UnknownTarget { .. })));

        let missing = swipes.record("s1", "p1", TargetType::Service, SwipeAction::Like).await;
        assert!(matches!(missing, Err(EngineError::UnknownTarget { .. })));
    }

    #[tokio::test]
    async fn test_invalid_enum_values_are_validation_errors() {
        let (swipes, _) = swipe_store();

        let bad_action = swipes.record_raw("s1", "p1", "provider", "love").await;
        assert!(matches!(bad_action, Err(EngineError::Validation(_))));

        let bad_type = swipes.record_raw("s1", "p1", "office", "like").await;
        assert!(matches!(bad_type, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_self_swipe_rejected() {
        let (swipes, _) = swipe_store();
        let result = swipes.record("p1", "p1", TargetType::Provider, SwipeAction::Like).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_history_pages_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let directory = StaticDirectory::new()
            .with_provider("p1", TargetAttributes::default())
            .with_provider("p2", TargetAttributes::default())
            .with_provider("p3", TargetAttributes::default());
        let swipes = SwipeStore::new(store, Arc::new(directory));

        for target in ["p1", "p2", "p3"] {
            swipes.record("s1", target, TargetType::Provider, SwipeAction::Like).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let (page, total) = swipes.history("s1", 2, 0).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].target_id, "p3");
    }
}
