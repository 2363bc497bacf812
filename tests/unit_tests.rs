// Unit tests for Swipe Match

use swipe_match::core::{
    distance::{distance_between, haversine_distance},
    reputation::aggregate,
    CompatibilityScorer, NEUTRAL_FACTOR,
};
use swipe_match::models::{GeoPoint, PriceBand, ScoringWeights, SeekerAttributes, TargetAttributes};

fn seeker(lat: f64, lon: f64) -> SeekerAttributes {
    SeekerAttributes {
        location: Some(GeoPoint { latitude: lat, longitude: lon }),
        max_distance_km: Some(30.0),
        needs: vec!["immigration".to_string(), "Family Law".to_string()],
        budget: Some(PriceBand { min: 50.0, max: 150.0 }),
        preferred_slots: vec!["mon-am".to_string(), "fri-pm".to_string()],
    }
}

fn target(i: usize) -> TargetAttributes {
    let f = i as f64;
    TargetAttributes {
        location: Some(GeoPoint {
            latitude: (f * 7.3) % 180.0 - 90.0,
            longitude: (f * 13.1) % 360.0 - 180.0,
        }),
        specializations: match i % 3 {
            0 => vec![],
            1 => vec!["family law".to_string()],
            _ => vec!["immigration".to_string(), "family law".to_string(), "tax".to_string()],
        },
        price: if i % 4 == 0 { None } else { Some(f * 11.0) },
        rating_average: Some(1.0 + (i % 5) as f64),
        rating_count: Some((i % 3) as u32),
        available_slots: if i % 2 == 0 { vec!["mon-am".to_string()] } else { vec![] },
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(40.7128, -74.0060, 40.7128, -74.0060);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_manhattan_to_brooklyn() {
    let manhattan = GeoPoint { latitude: 40.7580, longitude: -73.9855 };
    let brooklyn = GeoPoint { latitude: 40.6782, longitude: -73.9442 };

    let distance = distance_between(&manhattan, &brooklyn);
    assert!(distance > 5.0 && distance < 15.0);
}

#[test]
fn test_score_bounds_over_many_inputs() {
    let scorer = CompatibilityScorer::with_default_weights();
    let seekers = [seeker(40.7, -74.0), seeker(-33.9, 151.2), SeekerAttributes::default()];

    for s in &seekers {
        for i in 0..500 {
            let result = scorer.score(s, &target(i));
            assert!(
                (0.0..=100.0).contains(&result.score),
                "score {} out of bounds for target {}",
                result.score,
                i
            );
            for factor in [
                result.factors.location,
                result.factors.specialization,
                result.factors.price,
                result.factors.rating,
                result.factors.availability,
            ] {
                assert!((0.0..=100.0).contains(&factor));
            }
        }
    }
}

#[test]
fn test_score_bounds_with_extreme_weights() {
    let weights = [
        ScoringWeights { location: 10.0, specialization: 0.0, price: 0.0, rating: 0.0, availability: 0.0 },
        ScoringWeights { location: -1.0, specialization: f64::NAN, price: 3.0, rating: 0.5, availability: 0.0 },
        ScoringWeights { location: 0.0, specialization: 0.0, price: 0.0, rating: 0.0, availability: 0.0 },
    ];

    for w in weights {
        let scorer = CompatibilityScorer::new(w, 50.0);
        for i in 0..100 {
            let score = scorer.score(&seeker(51.5, -0.1), &target(i)).score;
            assert!(score.is_finite());
            assert!((0.0..=100.0).contains(&score));
        }
    }
}

#[test]
fn test_score_is_deterministic() {
    let scorer = CompatibilityScorer::with_default_weights();
    let s = seeker(40.7, -74.0);
    for i in 0..50 {
        assert_eq!(scorer.score(&s, &target(i)), scorer.score(&s, &target(i)));
    }
}

#[test]
fn test_closer_target_scores_higher_location() {
    let scorer = CompatibilityScorer::with_default_weights();
    let s = seeker(40.7128, -74.0060);

    let mut near = TargetAttributes::default();
    near.location = Some(GeoPoint { latitude: 40.72, longitude: -74.01 });
    let mut far = TargetAttributes::default();
    far.location = Some(GeoPoint { latitude: 40.85, longitude: -74.2 });

    let near_score = scorer.score(&s, &near);
    let far_score = scorer.score(&s, &far);
    assert!(near_score.factors.location > far_score.factors.location);
    assert_eq!(near_score.factors.specialization, NEUTRAL_FACTOR);
}

#[test]
fn test_aggregate_matches_mean() {
    let ratings = [5u8, 4, 4, 3, 1, 5, 2];
    let rep = aggregate("p1", &ratings);
    let expected = ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64;

    assert_eq!(rep.count, ratings.len() as u32);
    assert!((rep.average - expected).abs() < 1e-9);
    assert!(rep.average >= 1.0 && rep.average <= 5.0);
}
