use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::chat::ChatRoomProvisioner;
use crate::error::EngineError;
use crate::models::{Booking, InteractionKind, Match, MatchStats, MatchStatus, Role};
use crate::services::EngineStore;

/// Enforces legal match transitions and the side effects they trigger
///
/// # States
/// ```text
/// pending -> active -> completed
///                   -> cancelled
/// pending -> declined
/// pending -> expired        (housekeeping sweep)
/// ```
/// Archival (`is_active = false`) is orthogonal to all of them. Re-applying
/// the transition that produced the current state is a successful no-op;
/// any other move out of a state that does not allow it is rejected.
#[derive(Clone)]
pub struct MatchStateMachine {
    store: Arc<dyn EngineStore>,
    chat: ChatRoomProvisioner,
}

impl MatchStateMachine {
    pub fn new(store: Arc<dyn EngineStore>, chat: ChatRoomProvisioner) -> Self {
        Self { store, chat }
    }

    pub async fn get(&self, match_id: Uuid) -> Result<Match, EngineError> {
        self.store
            .get_match(match_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("match {}", match_id)))
    }

    /// Load a match and the caller's role in it
    async fn load_for(&self, match_id: Uuid, by_user_id: &str) -> Result<(Match, Role), EngineError> {
        let m = self.get(match_id).await?;
        match m.role_of(by_user_id) {
            Some(role) => Ok((m, role)),
            None => {
                tracing::info!("User {} is not a participant of match {}", by_user_id, match_id);
                Err(EngineError::Unauthorized(format!(
                    "{} is not a participant of match {}",
                    by_user_id, match_id
                )))
            }
        }
    }

    /// Compare-and-swap `from -> to`, treating an already-applied `to` as success
    async fn apply(
        &self,
        match_id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
        action: &'static str,
    ) -> Result<Match, EngineError> {
        if let Some(updated) = self.store.transition(match_id, from, to, Utc::now()).await? {
            tracing::info!("Match {} {} -> {}", match_id, from, to);
            return Ok(updated);
        }

        let current = self.get(match_id).await?;
        if current.status == to {
            tracing::debug!("Match {} already {}; {} is a no-op", match_id, to, action);
            return Ok(current);
        }

        Err(EngineError::InvalidStateTransition {
            match_id,
            from: current.status,
            action,
        })
    }

    /// `pending -> active`, then provision the chat room
    pub async fn accept(&self, match_id: Uuid, by_user_id: &str) -> Result<Match, EngineError> {
        let (current, _) = self.load_for(match_id, by_user_id).await?;

        let mut accepted = match current.status {
            // Re-accept: no transition, but make sure the room exists and is linked
            MatchStatus::Active => current,
            _ => self.apply(match_id, MatchStatus::Pending, MatchStatus::Active, "accept").await?,
        };

        if accepted.chat_room_id.is_none() {
            let room = self
                .chat
                .ensure_room(accepted.id, &accepted.seeker_id, &accepted.provider_id)
                .await?;
            accepted.chat_room_id = Some(room.id);
        }

        Ok(accepted)
    }

    /// `pending -> declined` (terminal)
    pub async fn decline(&self, match_id: Uuid, by_user_id: &str) -> Result<Match, EngineError> {
        self.load_for(match_id, by_user_id).await?;
        self.apply(match_id, MatchStatus::Pending, MatchStatus::Declined, "decline").await
    }

    /// `active -> completed`
    pub async fn complete(&self, match_id: Uuid) -> Result<Match, EngineError> {
        self.apply(match_id, MatchStatus::Active, MatchStatus::Completed, "complete").await
    }

    /// `active -> cancelled`
    pub async fn cancel(&self, match_id: Uuid) -> Result<Match, EngineError> {
        self.apply(match_id, MatchStatus::Active, MatchStatus::Cancelled, "cancel").await
    }

    /// Soft-delete for the caller's listings; status is left untouched
    pub async fn archive(&self, match_id: Uuid, by_user_id: &str) -> Result<Match, EngineError> {
        let (current, _) = self.load_for(match_id, by_user_id).await?;
        if !current.is_active {
            return Ok(current);
        }

        let archived = self
            .store
            .archive(match_id, Utc::now())
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("match {}", match_id)))?;

        tracing::info!("Match {} archived by {} (status {})", match_id, by_user_id, archived.status);
        Ok(archived)
    }

    pub async fn mark_viewed(&self, match_id: Uuid, by_user_id: &str) -> Result<Match, EngineError> {
        self.mark(match_id, by_user_id, InteractionKind::Viewed).await
    }

    /// Called on behalf of the message-transport service when a participant first writes
    pub async fn mark_messaged(&self, match_id: Uuid, by_user_id: &str) -> Result<Match, EngineError> {
        self.mark(match_id, by_user_id, InteractionKind::Messaged).await
    }

    async fn mark(&self, match_id: Uuid, by_user_id: &str, kind: InteractionKind) -> Result<Match, EngineError> {
        let (_, role) = self.load_for(match_id, by_user_id).await?;
        self.store
            .set_interaction(match_id, kind, role, Utc::now())
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("match {}", match_id)))
    }

    /// Store the booking record written by the payment collaborator
    pub async fn update_booking(&self, match_id: Uuid, booking: &Booking) -> Result<Match, EngineError> {
        if let Some(amount) = booking.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(EngineError::Validation("booking amount must be a non-negative number".to_string()));
            }
        }

        let updated = self
            .store
            .update_booking(match_id, booking)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("match {}", match_id)))?;

        tracing::info!("Booking updated for match {}: {:?}", match_id, booking.status);
        Ok(updated)
    }

    /// Non-archived matches a participant takes part in, most recent activity first
    pub async fn list_for_participant(
        &self,
        participant_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Match>, EngineError> {
        if participant_id.trim().is_empty() {
            return Err(EngineError::Validation("participantId is required".to_string()));
        }
        Ok(self.store.list_matches(participant_id, limit, offset).await?)
    }

    pub async fn stats(&self, participant_id: &str) -> Result<MatchStats, EngineError> {
        if participant_id.trim().is_empty() {
            return Err(EngineError::Validation("participantId is required".to_string()));
        }
        Ok(self.store.match_stats(participant_id).await?)
    }
}
