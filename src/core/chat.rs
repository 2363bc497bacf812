use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{ChatRoom, Participants};
use crate::services::{EngineStore, StoreError};

/// Idempotent 1:1 chat room creation keyed by match id
///
/// The room id is handed to the message-transport service; message
/// content never passes through here.
#[derive(Clone)]
pub struct ChatRoomProvisioner {
    store: Arc<dyn EngineStore>,
}

impl ChatRoomProvisioner {
    pub fn new(store: Arc<dyn EngineStore>) -> Self {
        Self { store }
    }

    /// Find or create the room for a match and link it to the match
    pub async fn ensure_room(
        &self,
        match_id: Uuid,
        seeker_id: &str,
        provider_id: &str,
    ) -> Result<ChatRoom, EngineError> {
        if self.store.get_match(match_id).await?.is_none() {
            return Err(EngineError::NotFound(format!("match {}", match_id)));
        }

        let room = match self.store.find_chat_room(match_id).await? {
            Some(room) => room,
            None => self.create(match_id, seeker_id, provider_id).await?,
        };

        if self.store.link_chat_room(match_id, room.id).await?.is_none() {
            return Err(EngineError::NotFound(format!("match {}", match_id)));
        }

        Ok(room)
    }

    async fn create(&self, match_id: Uuid, seeker_id: &str, provider_id: &str) -> Result<ChatRoom, EngineError> {
        let room = ChatRoom {
            id: Uuid::new_v4(),
            match_id,
            participants: Participants {
                seeker_id: seeker_id.to_string(),
                provider_id: provider_id.to_string(),
            },
            created_at: Utc::now(),
        };

        match self.store.insert_chat_room(&room).await {
            Ok(()) => {
                tracing::info!("Provisioned chat room {} for match {}", room.id, match_id);
                Ok(room)
            }
            Err(StoreError::Conflict(_)) => {
                tracing::debug!("Chat room for match {} created concurrently; re-fetching", match_id);
                self.store.find_chat_room(match_id).await?.ok_or_else(|| {
                    EngineError::StorageConflict(format!("chat room for match {} could not be re-fetched", match_id))
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
