use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to record a swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordSwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_id", rename = "targetId")]
    pub target_id: String,
    #[serde(alias = "target_type", rename = "targetType")]
    pub target_type: String,
    pub action: String,
}

/// Query parameters for swipe history
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeHistoryQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
    /// Page size; the server default applies when absent
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

/// Query parameters for participant-scoped match listings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParticipantQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "participant_id", rename = "participantId")]
    pub participant_id: String,
    /// Page size; the server default applies when absent
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

/// Body of accept/decline/archive/view calls
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParticipantActionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "by_user_id", rename = "byUserId")]
    pub by_user_id: String,
}

/// Request to rate a match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateMatchRequest {
    #[serde(alias = "by_role", rename = "byRole")]
    pub by_role: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub feedback: Option<String>,
}
