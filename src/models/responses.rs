use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{Feedback, Match, MatchStatus, ProviderReputation, Swipe};

/// Compact view of a match returned by state-changing calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub id: Uuid,
    #[serde(rename = "seekerId")]
    pub seeker_id: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    #[serde(rename = "serviceId")]
    pub service_id: Option<String>,
    pub status: MatchStatus,
    pub score: f64,
    #[serde(rename = "chatRoomId")]
    pub chat_room_id: Option<Uuid>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "lastActivity")]
    pub last_activity: DateTime<Utc>,
}

impl From<&Match> for MatchSummary {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id,
            seeker_id: m.seeker_id.clone(),
            provider_id: m.provider_id.clone(),
            service_id: m.service_id.clone(),
            status: m.status,
            score: m.compatibility.score,
            chat_room_id: m.chat_room_id,
            is_active: m.is_active,
            last_activity: m.last_activity,
        }
    }
}

/// Response for a recorded swipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub swipe: Swipe,
    #[serde(rename = "match")]
    pub matched: Option<Match>,
    #[serde(rename = "matchCreated")]
    pub match_created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeHistoryResponse {
    pub swipes: Vec<Swipe>,
    pub total: i64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub matches: Vec<Match>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingResponse {
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    pub feedback: Feedback,
    pub reputation: Option<ProviderReputation>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
