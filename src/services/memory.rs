use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    Booking, ChatRoom, InteractionKind, Match, MatchKey, MatchStats, MatchStatus, ProviderReputation, Role,
    Swipe, TargetType,
};
use crate::services::store::{EngineStore, StoreError};

#[derive(Default)]
struct MemoryState {
    swipes: HashMap<(String, String, TargetType), Swipe>,
    matches: HashMap<Uuid, Match>,
    chat_rooms: HashMap<Uuid, ChatRoom>,
    reputations: HashMap<String, ProviderReputation>,
}

impl MemoryState {
    fn update_match<F>(&mut self, id: Uuid, apply: F) -> Option<Match>
    where
        F: FnOnce(&mut Match) -> bool,
    {
        let m = self.matches.get_mut(&id)?;
        if apply(m) {
            Some(m.clone())
        } else {
            None
        }
    }
}

/// In-process engine storage
///
/// Each operation runs under a single lock and applies the same uniqueness
/// rules as the PostgreSQL schema. Used by tests and by the `memory`
/// database backend for local runs; state is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chat rooms provisioned for a match
    pub async fn chat_room_count(&self, match_id: Uuid) -> usize {
        let state = self.state.lock().await;
        state.chat_rooms.values().filter(|r| r.match_id == match_id).count()
    }

    /// Number of matches (archived included) for a seeker/provider pair
    pub async fn match_count(&self, seeker_id: &str, provider_id: &str) -> usize {
        let state = self.state.lock().await;
        state
            .matches
            .values()
            .filter(|m| m.seeker_id == seeker_id && m.provider_id == provider_id)
            .count()
    }

    /// Overwrite a stored match, for tests that need to age or corrupt rows
    pub async fn put_match(&self, m: Match) {
        let mut state = self.state.lock().await;
        state.matches.insert(m.id, m);
    }
}

#[async_trait]
impl EngineStore for MemoryStore {
    async fn insert_swipe(&self, swipe: &Swipe) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let key = (swipe.actor_id.clone(), swipe.target_id.clone(), swipe.target_type);
        if state.swipes.contains_key(&key) {
            return Ok(false);
        }
        state.swipes.insert(key, swipe.clone());
        Ok(true)
    }

    async fn find_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<Swipe>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .swipes
            .get(&(actor_id.to_string(), target_id.to_string(), target_type))
            .cloned())
    }

    async fn list_swipes(&self, actor_id: &str, limit: u32, offset: u32) -> Result<Vec<Swipe>, StoreError> {
        let state = self.state.lock().await;
        let mut swipes: Vec<Swipe> = state
            .swipes
            .values()
            .filter(|s| s.actor_id == actor_id)
            .cloned()
            .collect();
        swipes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(swipes
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_swipes(&self, actor_id: &str) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        Ok(state.swipes.values().filter(|s| s.actor_id == actor_id).count() as i64)
    }

    async fn insert_match(&self, m: &Match) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let key = m.key();
        let taken = m.is_active && state.matches.values().any(|existing| existing.is_active && existing.key() == key);
        if taken || state.matches.contains_key(&m.id) {
            return Err(StoreError::Conflict("open match for this seeker/provider/service".to_string()));
        }
        state.matches.insert(m.id, m.clone());
        Ok(())
    }

    async fn find_open_match(&self, key: &MatchKey) -> Result<Option<Match>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .matches
            .values()
            .find(|m| m.is_active && &m.key() == key)
            .cloned())
    }

    async fn match_exists(&self, key: &MatchKey) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(state.matches.values().any(|m| &m.key() == key))
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.matches.get(&id).cloned())
    }

    async fn list_matches(&self, participant_id: &str, limit: u32, offset: u32) -> Result<Vec<Match>, StoreError> {
        let state = self.state.lock().await;
        let mut matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.is_active && m.role_of(participant_id).is_some())
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

        Ok(matches
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn match_stats(&self, participant_id: &str) -> Result<MatchStats, StoreError> {
        let state = self.state.lock().await;
        let mut stats = MatchStats {
            participant_id: participant_id.to_string(),
            ..MatchStats::default()
        };
        for m in state.matches.values().filter(|m| m.role_of(participant_id).is_some()) {
            stats.add(m.status, m.is_active, 1);
        }
        Ok(stats)
    }

    async fn transition(
        &self,
        id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Match>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.update_match(id, |m| {
            if m.status != from {
                return false;
            }
            m.status = to;
            m.last_activity = at;
            true
        }))
    }

    async fn archive(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Match>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.update_match(id, |m| {
            m.is_active = false;
            m.last_activity = at;
            true
        }))
    }

    async fn link_chat_room(&self, id: Uuid, room_id: Uuid) -> Result<Option<Match>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.update_match(id, |m| {
            m.chat_room_id.get_or_insert(room_id);
            true
        }))
    }

    async fn set_interaction(
        &self,
        id: Uuid,
        kind: InteractionKind,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<Option<Match>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.update_match(id, |m| {
            m.interactions.set(kind, role);
            m.last_activity = at;
            true
        }))
    }

    async fn update_booking(&self, id: Uuid, booking: &Booking) -> Result<Option<Match>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.update_match(id, |m| {
            m.booking = Some(booking.clone());
            true
        }))
    }

    async fn record_rating(
        &self,
        id: Uuid,
        role: Role,
        rating: u8,
        comment: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Option<Match>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.update_match(id, |m| {
            if !m.status.accepts_ratings() || m.feedback.rating_by(role).is_some() {
                return false;
            }
            let comment = comment.map(str::to_string);
            match role {
                Role::Seeker => {
                    m.feedback.seeker_rating = Some(rating);
                    m.feedback.seeker_comment = comment;
                }
                Role::Provider => {
                    m.feedback.provider_rating = Some(rating);
                    m.feedback.provider_comment = comment;
                }
            }
            m.feedback.reviewed_at = Some(at);
            m.last_activity = at;
            true
        }))
    }

    async fn seeker_ratings_for_provider(&self, provider_id: &str) -> Result<Vec<u8>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.provider_id == provider_id)
            .filter_map(|m| m.feedback.seeker_rating)
            .collect())
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let mut expired = 0;
        for m in state.matches.values_mut() {
            if m.is_active && m.status == MatchStatus::Pending && m.expires_at <= now {
                m.status = MatchStatus::Expired;
                m.last_activity = now;
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn insert_chat_room(&self, room: &ChatRoom) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.chat_rooms.contains_key(&room.match_id) {
            return Err(StoreError::Conflict("chat room for this match".to_string()));
        }
        state.chat_rooms.insert(room.match_id, room.clone());
        Ok(())
    }

    async fn find_chat_room(&self, match_id: Uuid) -> Result<Option<ChatRoom>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.chat_rooms.get(&match_id).cloned())
    }

    async fn save_reputation(&self, reputation: &ProviderReputation) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        // Ratings are never removed, so a lower count is a stale recompute
        let stale = state
            .reputations
            .get(&reputation.provider_id)
            .is_some_and(|current| current.count > reputation.count);
        if !stale {
            state
                .reputations
                .insert(reputation.provider_id.clone(), reputation.clone());
        }
        Ok(())
    }

    async fn get_reputation(&self, provider_id: &str) -> Result<Option<ProviderReputation>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.reputations.get(provider_id).cloned())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
