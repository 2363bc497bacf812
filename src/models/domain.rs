use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of entity a swipe points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "target_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Provider,
    Service,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Provider => "provider",
            TargetType::Service => "service",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "provider" => Ok(TargetType::Provider),
            "service" => Ok(TargetType::Service),
            other => Err(format!(
                "targetType must be one of: provider, service (got '{}')",
                other
            )),
        }
    }
}

/// Decision an actor records about a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swipe_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    Like,
    SuperLike,
    Dislike,
    Pass,
}

impl SwipeAction {
    /// Whether this action should be evaluated for a match
    pub fn signals_interest(&self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::SuperLike)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::SuperLike => "super_like",
            SwipeAction::Dislike => "dislike",
            SwipeAction::Pass => "pass",
        }
    }
}

impl FromStr for SwipeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(SwipeAction::Like),
            "super_like" | "superlike" => Ok(SwipeAction::SuperLike),
            "dislike" => Ok(SwipeAction::Dislike),
            "pass" => Ok(SwipeAction::Pass),
            other => Err(format!(
                "action must be one of: like, super_like, dislike, pass (got '{}')",
                other
            )),
        }
    }
}

/// Side of a match a participant is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Seeker,
    Provider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seeker => "seeker",
            Role::Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "seeker" | "client" => Ok(Role::Seeker),
            "provider" | "lawyer" => Ok(Role::Provider),
            other => Err(format!("role must be one of: seeker, provider (got '{}')", other)),
        }
    }
}

/// A single recorded decision. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    pub id: Uuid,
    #[serde(rename = "actorId")]
    pub actor_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "targetType")]
    pub target_type: TargetType,
    pub action: SwipeAction,
    pub timestamp: DateTime<Utc>,
}

impl Swipe {
    pub fn new(actor_id: &str, target_id: &str, target_type: TargetType, action: SwipeAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            target_type,
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Match lifecycle state. Archival is tracked separately by `Match::is_active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
    Declined,
    Expired,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 6] = [
        MatchStatus::Pending,
        MatchStatus::Active,
        MatchStatus::Completed,
        MatchStatus::Cancelled,
        MatchStatus::Declined,
        MatchStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Active => "active",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
            MatchStatus::Declined => "declined",
            MatchStatus::Expired => "expired",
        }
    }

    /// Whether a rating may be submitted in this state
    pub fn accepts_ratings(&self) -> bool {
        matches!(self, MatchStatus::Active | MatchStatus::Completed)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-factor breakdown of a compatibility score, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityFactors {
    pub location: f64,
    pub specialization: f64,
    pub price: f64,
    pub rating: f64,
    pub availability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    pub score: f64,
    pub factors: CompatibilityFactors,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interactions {
    #[serde(rename = "viewedBySeeker")]
    pub viewed_by_seeker: bool,
    #[serde(rename = "viewedByProvider")]
    pub viewed_by_provider: bool,
    #[serde(rename = "messagedBySeeker")]
    pub messaged_by_seeker: bool,
    #[serde(rename = "messagedByProvider")]
    pub messaged_by_provider: bool,
}

/// Interaction flag kinds tracked per role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Viewed,
    Messaged,
}

impl Interactions {
    pub fn set(&mut self, kind: InteractionKind, role: Role) {
        match (kind, role) {
            (InteractionKind::Viewed, Role::Seeker) => self.viewed_by_seeker = true,
            (InteractionKind::Viewed, Role::Provider) => self.viewed_by_provider = true,
            (InteractionKind::Messaged, Role::Seeker) => self.messaged_by_seeker = true,
            (InteractionKind::Messaged, Role::Provider) => self.messaged_by_provider = true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Requested,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Booking record; `payment_status` is written by the payment collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub status: BookingStatus,
    #[serde(rename = "scheduledAt", default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(rename = "paymentStatus", default)]
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(rename = "seekerRating")]
    pub seeker_rating: Option<u8>,
    #[serde(rename = "seekerComment")]
    pub seeker_comment: Option<String>,
    #[serde(rename = "providerRating")]
    pub provider_rating: Option<u8>,
    #[serde(rename = "providerComment")]
    pub provider_comment: Option<String>,
    #[serde(rename = "reviewedAt")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Feedback {
    pub fn rating_by(&self, role: Role) -> Option<u8> {
        match role {
            Role::Seeker => self.seeker_rating,
            Role::Provider => self.provider_rating,
        }
    }
}

/// Lookup key of a match lineage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub seeker_id: String,
    pub provider_id: String,
    pub service_id: Option<String>,
}

impl MatchKey {
    pub fn new(seeker_id: &str, provider_id: &str, service_id: Option<&str>) -> Self {
        Self {
            seeker_id: seeker_id.to_string(),
            provider_id: provider_id.to_string(),
            service_id: service_id.map(str::to_string),
        }
    }
}

/// Durable relationship between a seeker and a provider (optionally for one service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    #[serde(rename = "seekerId")]
    pub seeker_id: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    #[serde(rename = "serviceId")]
    pub service_id: Option<String>,
    pub status: MatchStatus,
    pub compatibility: Compatibility,
    pub interactions: Interactions,
    pub booking: Option<Booking>,
    pub feedback: Feedback,
    #[serde(rename = "chatRoomId")]
    pub chat_room_id: Option<Uuid>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "matchedAt")]
    pub matched_at: DateTime<Utc>,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    #[serde(rename = "lastActivity")]
    pub last_activity: DateTime<Utc>,
}

impl Match {
    pub fn key(&self) -> MatchKey {
        MatchKey::new(&self.seeker_id, &self.provider_id, self.service_id.as_deref())
    }

    /// Role of `user_id` in this match, if they take part in it
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        if self.seeker_id == user_id {
            Some(Role::Seeker)
        } else if self.provider_id == user_id {
            Some(Role::Provider)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    #[serde(rename = "seekerId")]
    pub seeker_id: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
}

/// 1:1 channel provisioned when a match is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: Uuid,
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    pub participants: Participants,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Aggregate of all seeker ratings a provider has received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderReputation {
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub average: f64,
    pub count: u32,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProviderReputation {
    pub fn unrated(provider_id: &str) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            average: 0.0,
            count: 0,
            updated_at: None,
        }
    }
}

/// Match counts by status for one participant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    #[serde(rename = "participantId")]
    pub participant_id: String,
    pub pending: i64,
    pub active: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub declined: i64,
    pub expired: i64,
    pub archived: i64,
    pub total: i64,
}

impl MatchStats {
    /// Fold `count` matches of one status into the totals; archived rows only count as archived
    pub fn add(&mut self, status: MatchStatus, is_active: bool, count: i64) {
        self.total += count;
        if !is_active {
            self.archived += count;
            return;
        }
        match status {
            MatchStatus::Pending => self.pending += count,
            MatchStatus::Active => self.active += count,
            MatchStatus::Completed => self.completed += count,
            MatchStatus::Cancelled => self.cancelled += count,
            MatchStatus::Declined => self.declined += count,
            MatchStatus::Expired => self.expired += count,
        }
    }
}

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Inclusive price band a seeker is willing to pay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

/// Attributes of a seeker used for compatibility scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeekerAttributes {
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(rename = "maxDistanceKm", default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default)]
    pub budget: Option<PriceBand>,
    #[serde(rename = "preferredSlots", default)]
    pub preferred_slots: Vec<String>,
}

/// Attributes of a provider or service used for compatibility scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetAttributes {
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "ratingAverage", default)]
    pub rating_average: Option<f64>,
    #[serde(rename = "ratingCount", default)]
    pub rating_count: Option<u32>,
    #[serde(rename = "availableSlots", default)]
    pub available_slots: Vec<String>,
}

/// Scoring weights; combined as a normalized weighted sum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub location: f64,
    pub specialization: f64,
    pub price: f64,
    pub rating: f64,
    pub availability: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.location + self.specialization + self.price + self.rating + self.availability
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            location: 0.25,
            specialization: 0.30,
            price: 0.20,
            rating: 0.15,
            availability: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing() {
        assert_eq!("LIKE".parse::<SwipeAction>().unwrap(), SwipeAction::Like);
        assert_eq!("super_like".parse::<SwipeAction>().unwrap(), SwipeAction::SuperLike);
        assert!("maybe".parse::<SwipeAction>().is_err());
        assert_eq!("service".parse::<TargetType>().unwrap(), TargetType::Service);
        assert!("lawyer_office".parse::<TargetType>().is_err());
        assert_eq!("client".parse::<Role>().unwrap(), Role::Seeker);
    }

    #[test]
    fn test_interest_actions() {
        assert!(SwipeAction::Like.signals_interest());
        assert!(SwipeAction::SuperLike.signals_interest());
        assert!(!SwipeAction::Dislike.signals_interest());
        assert!(!SwipeAction::Pass.signals_interest());
    }

    #[test]
    fn test_stats_count_archived_separately() {
        let mut stats = MatchStats::default();
        stats.add(MatchStatus::Pending, true, 1);
        stats.add(MatchStatus::Pending, false, 1);
        stats.add(MatchStatus::Active, true, 1);

        assert_eq!(stats.pending, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.archived, 1);
        assert_eq!(stats.total, 3);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoringWeights::default().total() - 1.0).abs() < 1e-9);
    }
}
