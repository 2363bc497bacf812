use std::collections::HashSet;

use crate::core::distance::{distance_between, is_valid_point};
use crate::models::{Compatibility, CompatibilityFactors, ScoringWeights, SeekerAttributes, TargetAttributes};

/// Factor value used when either side lacks the attribute
pub const NEUTRAL_FACTOR: f64 = 50.0;

/// Deterministic compatibility scorer
///
/// Scoring formula:
/// score = (
///     location * w.location +              # Closer = higher, exponential decay within radius
///     specialization * w.specialization +  # Share of seeker needs the target covers
///     price * w.price +                    # Inside budget = 100, linear decay above it
///     rating * w.rating +                  # Target's average rating mapped from [1,5]
///     availability * w.availability        # Share of seeker slots the target offers
/// ) / sum(w)
///
/// Every factor is in [0, 100]; a missing attribute on either side yields
/// `NEUTRAL_FACTOR` for that factor.
#[derive(Debug, Clone)]
pub struct CompatibilityScorer {
    weights: ScoringWeights,
    default_radius_km: f64,
}

impl CompatibilityScorer {
    pub fn new(weights: ScoringWeights, default_radius_km: f64) -> Self {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };

        Self {
            weights: ScoringWeights {
                location: clean(weights.location),
                specialization: clean(weights.specialization),
                price: clean(weights.price),
                rating: clean(weights.rating),
                availability: clean(weights.availability),
            },
            default_radius_km: if default_radius_km.is_finite() && default_radius_km > 0.0 {
                default_radius_km
            } else {
                50.0
            },
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), 50.0)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a target for a seeker
    pub fn score(&self, seeker: &SeekerAttributes, target: &TargetAttributes) -> Compatibility {
        let factors = CompatibilityFactors {
            location: bounded(location_factor(seeker, target, self.default_radius_km)),
            specialization: bounded(overlap_factor(&seeker.needs, &target.specializations)),
            price: bounded(price_factor(seeker, target)),
            rating: bounded(rating_factor(target)),
            availability: bounded(overlap_factor(&seeker.preferred_slots, &target.available_slots)),
        };

        let w = &self.weights;
        let total = w.total();
        let score = if total > 0.0 {
            (factors.location * w.location
                + factors.specialization * w.specialization
                + factors.price * w.price
                + factors.rating * w.rating
                + factors.availability * w.availability)
                / total
        } else {
            NEUTRAL_FACTOR
        };

        Compatibility {
            score: bounded(score),
            factors,
        }
    }
}

impl Default for CompatibilityScorer {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Clamp to [0, 100]; non-finite values become neutral
#[inline]
fn bounded(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        NEUTRAL_FACTOR
    }
}

fn location_factor(seeker: &SeekerAttributes, target: &TargetAttributes, default_radius_km: f64) -> f64 {
    let (Some(from), Some(to)) = (seeker.location, target.location) else {
        return NEUTRAL_FACTOR;
    };
    if !is_valid_point(&from) || !is_valid_point(&to) {
        return NEUTRAL_FACTOR;
    }

    let radius = seeker
        .max_distance_km
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(default_radius_km);

    let distance_km = distance_between(&from, &to);
    if distance_km >= radius {
        return 0.0;
    }

    // Exponential decay: nearby targets score much higher
    100.0 * (-distance_km / (radius * 0.5)).exp()
}

fn normalized(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Share of `wanted` found in `offered`, as a percentage
fn overlap_factor(wanted: &[String], offered: &[String]) -> f64 {
    let wanted = normalized(wanted);
    let offered = normalized(offered);
    if wanted.is_empty() || offered.is_empty() {
        return NEUTRAL_FACTOR;
    }

    let covered = wanted.iter().filter(|w| offered.contains(*w)).count();
    100.0 * covered as f64 / wanted.len() as f64
}

fn price_factor(seeker: &SeekerAttributes, target: &TargetAttributes) -> f64 {
    let (Some(band), Some(price)) = (seeker.budget, target.price) else {
        return NEUTRAL_FACTOR;
    };
    if !band.min.is_finite() || !band.max.is_finite() || !price.is_finite() || band.min > band.max {
        return NEUTRAL_FACTOR;
    }

    if price <= band.max {
        return 100.0;
    }
    if band.max <= 0.0 {
        return 0.0;
    }

    // Linear decay: 0 once the price is double the top of the band
    100.0 * (1.0 - (price - band.max) / band.max).max(0.0)
}

fn rating_factor(target: &TargetAttributes) -> f64 {
    if target.rating_count == Some(0) {
        return NEUTRAL_FACTOR;
    }
    match target.rating_average {
        Some(avg) if avg.is_finite() => (avg.clamp(1.0, 5.0) - 1.0) / 4.0 * 100.0,
        _ => NEUTRAL_FACTOR,
    }
}
