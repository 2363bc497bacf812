// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Booking, BookingStatus, ChatRoom, Compatibility, CompatibilityFactors, Feedback, GeoPoint,
    InteractionKind, Interactions, Match, MatchKey, MatchStats, MatchStatus, Participants,
    PaymentStatus, PriceBand, ProviderReputation, Role, ScoringWeights, SeekerAttributes, Swipe,
    SwipeAction, TargetAttributes, TargetType,
};
pub use requests::{ParticipantActionRequest, ParticipantQuery, RateMatchRequest, RecordSwipeRequest, SwipeHistoryQuery};
pub use responses::{
    ErrorResponse, HealthResponse, MatchListResponse, MatchSummary, RatingResponse, SwipeHistoryResponse,
    SwipeResponse,
};
