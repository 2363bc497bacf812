// Core engine exports
pub mod chat;
pub mod distance;
pub mod engine;
pub mod factory;
pub mod reputation;
pub mod scoring;
pub mod state_machine;
pub mod sweep;
pub mod swipes;

pub use chat::ChatRoomProvisioner;
pub use distance::{distance_between, haversine_distance};
pub use engine::{Directories, MatchEngine, SwipeOutcome};
pub use factory::{MatchFactory, MatchOutcome};
pub use reputation::{aggregate, ReputationAggregator};
pub use scoring::{CompatibilityScorer, NEUTRAL_FACTOR};
pub use state_machine::MatchStateMachine;
pub use sweep::spawn_expiry_sweep;
pub use swipes::{RecordedSwipe, SwipeStore};
