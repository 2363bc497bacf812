use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Booking, ChatRoom, InteractionKind, Match, MatchKey, MatchStats, MatchStatus, ProviderReputation, Role,
    Swipe, TargetType,
};

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write; the caller decides whether to re-fetch
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Persistence used by the match lifecycle engine
///
/// Every mutating method is a single atomic storage operation: an
/// insert guarded by a unique index, or a conditional update that only
/// applies when the row is still in the expected state. Methods that
/// return `Option<Match>` yield `None` when no row was updated.
#[async_trait]
pub trait EngineStore: Send + Sync {
    /// Insert a swipe unless one already exists for (actor, target, target type)
    async fn insert_swipe(&self, swipe: &Swipe) -> Result<bool, StoreError>;

    /// The stored swipe for (actor, target, target type), if any
    async fn find_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<Swipe>, StoreError>;

    async fn list_swipes(&self, actor_id: &str, limit: u32, offset: u32) -> Result<Vec<Swipe>, StoreError>;

    async fn count_swipes(&self, actor_id: &str) -> Result<i64, StoreError>;

    /// Insert a match; fails with `StoreError::Conflict` when a non-archived
    /// match already exists for the same key
    async fn insert_match(&self, m: &Match) -> Result<(), StoreError>;

    /// The non-archived match for a key, if any
    async fn find_open_match(&self, key: &MatchKey) -> Result<Option<Match>, StoreError>;

    /// Whether any match, archived ones included, was ever created for a key
    async fn match_exists(&self, key: &MatchKey) -> Result<bool, StoreError>;

    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, StoreError>;

    async fn list_matches(&self, participant_id: &str, limit: u32, offset: u32) -> Result<Vec<Match>, StoreError>;

    async fn match_stats(&self, participant_id: &str) -> Result<MatchStats, StoreError>;

    /// Compare-and-swap `status` from `from` to `to`
    async fn transition(
        &self,
        id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Match>, StoreError>;

    /// Set `is_active = false` without touching status
    async fn archive(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Match>, StoreError>;

    /// Link a chat room; an already linked room is kept
    async fn link_chat_room(&self, id: Uuid, room_id: Uuid) -> Result<Option<Match>, StoreError>;

    async fn set_interaction(
        &self,
        id: Uuid,
        kind: InteractionKind,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<Option<Match>, StoreError>;

    async fn update_booking(&self, id: Uuid, booking: &Booking) -> Result<Option<Match>, StoreError>;

    /// Write a rating only if `role` has not rated yet and the match is active or completed
    async fn record_rating(
        &self,
        id: Uuid,
        role: Role,
        rating: u8,
        comment: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Option<Match>, StoreError>;

    /// Every seeker rating across all of a provider's matches, archived ones included
    async fn seeker_ratings_for_provider(&self, provider_id: &str) -> Result<Vec<u8>, StoreError>;

    /// Flip non-archived pending matches past `expires_at` to expired
    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Insert a chat room; fails with `StoreError::Conflict` if the match already has one
    async fn insert_chat_room(&self, room: &ChatRoom) -> Result<(), StoreError>;

    async fn find_chat_room(&self, match_id: Uuid) -> Result<Option<ChatRoom>, StoreError>;

    /// Upsert a reputation; ignored when the stored one covers more ratings
    async fn save_reputation(&self, reputation: &ProviderReputation) -> Result<(), StoreError>;

    async fn get_reputation(&self, provider_id: &str) -> Result<Option<ProviderReputation>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
