//! Swipe Match - match lifecycle engine for a two-sided service marketplace
//!
//! Seekers swipe on providers and their services. Interested swipes become
//! matches that move through acceptance, chat provisioning, completion and
//! rating, with provider reputations kept current from seeker ratings.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CompatibilityScorer, Directories, MatchEngine, SwipeOutcome};
pub use error::EngineError;
pub use models::{Match, MatchStatus, ProviderReputation, Role, Swipe, SwipeAction, TargetType};
pub use services::{EngineStore, MemoryStore, PostgresClient, StaticDirectory};
