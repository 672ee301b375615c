use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn vehicle_at(lat: f64, lng: f64, direction: f64) -> Vehicle {
    Vehicle {
        id: "UBER-001".to_string(),
        lat,
        lng,
        speed: 60.0,
        direction,
        status: VehicleStatus::Available,
    }
}

#[test]
fn test_new_vehicle_has_valid_ranges() {
    let mut rng = rng();
    for n in 1..=200 {
        let v = Vehicle::new(Vehicle::label(n), 25.1, 121.55, &mut rng);
        assert!(v.speed >= MIN_SPEED_KMH && v.speed <= MAX_SPEED_KMH);
        assert!(v.direction >= 0.0 && v.direction < 360.0);
        assert_eq!(v.lat, 25.1);
        assert_eq!(v.lng, 121.55);
    }
}

#[test]
fn test_label_is_zero_padded() {
    assert_eq!(Vehicle::label(1), "UBER-001");
    assert_eq!(Vehicle::label(42), "UBER-042");
    assert_eq!(Vehicle::label(1000), "UBER-1000");
}

#[test]
fn test_normalize_heading() {
    assert_eq!(normalize_heading(0.0), 0.0);
    assert_eq!(normalize_heading(360.0), 0.0);
    assert_eq!(normalize_heading(370.0), 10.0);
    assert_eq!(normalize_heading(-10.0), 350.0);
    assert_eq!(normalize_heading(-1e-17), 0.0);
    assert!(normalize_heading(-720.5) < 360.0);
}

#[test]
fn test_heading_stays_normalized_over_many_ticks() {
    let mut rng = rng();
    let reference = Location::default();
    let mut v = Vehicle::new("UBER-001", reference.lat, reference.lng, &mut rng);

    for _ in 0..10_000 {
        v.advance(reference, BoundaryPolicy::default(), &mut rng).unwrap();
        assert!(v.direction >= 0.0 && v.direction < 360.0, "heading {}", v.direction);
    }
}

#[test]
fn test_speed_stays_in_range_over_many_ticks() {
    let mut rng = rng();
    let reference = Location::default();
    let mut v = Vehicle::new("UBER-001", reference.lat, reference.lng, &mut rng);

    for _ in 0..2_000 {
        v.advance(reference, BoundaryPolicy::default(), &mut rng).unwrap();
        assert!(v.speed >= MIN_SPEED_KMH && v.speed <= MAX_SPEED_KMH);
    }
}

#[test]
fn test_step_length_matches_speed() {
    let mut rng = rng();
    let reference = Location::default();
    let mut v = vehicle_at(reference.lat, reference.lng, 90.0);

    v.advance(reference, BoundaryPolicy::default(), &mut rng).unwrap();

    // Speed is only re-rolled after the move, so the step uses 60 km/h
    let expected = 60.0 / 111.0 / 3600.0;
    let moved = reference.degree_distance(v.lat, v.lng);
    assert!((moved - expected).abs() < 1e-12, "moved {}", moved);
}

#[test]
fn test_reverse_policy_turns_around_without_moving() {
    let mut rng = rng();
    let reference = Location::new(0.0, 0.0);
    let policy = BoundaryPolicy::Reverse {
        max_distance_deg: 0.09,
    };
    // Sitting right on the cutoff, heading due north (away from reference)
    let mut v = vehicle_at(0.09, 0.0, 0.0);
    let before = v.direction;

    v.advance(reference, policy, &mut rng).unwrap();

    assert_eq!(v.lat, 0.09);
    assert_eq!(v.lng, 0.0);
    // Jitter is at most 30 degrees, so the reversed heading points back south
    let turned = (v.direction - before).rem_euclid(360.0);
    assert!(turned >= 150.0 && turned <= 210.0, "turned {}", turned);
}

#[test]
fn test_clamp_policy_keeps_vehicle_in_window() {
    let mut rng = rng();
    let reference = Location::new(10.0, 20.0);
    let policy = BoundaryPolicy::Clamp { window_deg: 0.1 };
    let mut v = vehicle_at(10.1, 20.1, 45.0);

    v.advance(reference, policy, &mut rng).unwrap();

    assert!(v.lat <= 10.1 + 1e-9);
    assert!(v.lng <= 20.1 + 1e-9);
    assert!(policy.contains(reference, v.lat, v.lng));
}

#[test]
fn test_position_stays_within_bound_for_both_policies() {
    let reference = Location::default();
    let policies = [
        BoundaryPolicy::default(),
        BoundaryPolicy::Clamp { window_deg: 0.1 },
    ];

    for policy in policies {
        let mut rng = rng();
        let mut v = Vehicle::new("UBER-001", reference.lat, reference.lng, &mut rng);
        // Force the vehicle into the boundary quickly
        v.speed = MAX_SPEED_KMH;
        for _ in 0..20_000 {
            v.advance(reference, policy, &mut rng).unwrap();
            assert!(
                policy.contains(reference, v.lat, v.lng),
                "{:?} escaped to ({}, {})",
                policy,
                v.lat,
                v.lng
            );
        }
    }
}

#[test]
fn test_non_finite_advance_leaves_vehicle_untouched() {
    let mut rng = rng();
    let mut v = vehicle_at(25.1, 121.55, 10.0);
    v.speed = f64::NAN;
    let before = v.clone();

    let result = v.advance(Location::default(), BoundaryPolicy::Clamp { window_deg: 0.1 }, &mut rng);

    assert_eq!(
        result,
        Err(MotionError::NonFinite {
            id: "UBER-001".to_string()
        })
    );
    // NaN never compares equal, so check the fields one by one
    assert!(v.speed.is_nan());
    assert_eq!(v.id, before.id);
    assert_eq!(v.lat, before.lat);
    assert_eq!(v.lng, before.lng);
    assert_eq!(v.direction, before.direction);
    assert_eq!(v.status, before.status);
}

#[test]
fn test_nan_reference_is_rejected() {
    let mut rng = rng();
    let mut v = vehicle_at(25.1, 121.55, 10.0);
    let before = v.clone();
    let reference = Location::new(f64::NAN, f64::NAN);

    let result = v.advance(reference, BoundaryPolicy::Clamp { window_deg: 0.1 }, &mut rng);

    assert!(matches!(result, Err(MotionError::NonFinite { .. })));
    assert_eq!(v, before);
}

#[test]
fn test_snapshot_rounding() {
    let v = Vehicle {
        id: "UBER-007".to_string(),
        lat: 25.123456789,
        lng: 121.987654321,
        speed: 55.55,
        direction: 123.456,
        status: VehicleStatus::Busy,
    };

    let snap = v.snapshot();
    assert_eq!(snap.id, "UBER-007");
    assert_eq!(snap.lat, 25.123457);
    assert_eq!(snap.lng, 121.987654);
    assert_eq!(snap.direction, 123.5);
    assert!(snap.speed == 55.5 || snap.speed == 55.6);
    assert_eq!(snap.status, VehicleStatus::Busy);
    assert!(snap.timestamp > 1_600_000_000.0);
}

#[test]
fn test_snapshot_json_shape() {
    let v = vehicle_at(1.0, 2.0, 90.0);
    let json = serde_json::to_value(v.snapshot()).unwrap();

    let obj = json.as_object().unwrap();
    for key in ["id", "lat", "lng", "speed", "direction", "status", "timestamp"] {
        assert!(obj.contains_key(key), "missing {}", key);
    }
    assert_eq!(obj["status"], "available");
    assert_eq!(obj.len(), 7);
}

#[test]
fn test_status_strings() {
    let names: Vec<&str> = VehicleStatus::ALL.iter().map(|s| s.as_str()).collect();
    assert_eq!(names, vec!["available", "busy", "offline"]);

    let json = serde_json::to_string(&VehicleStatus::Offline).unwrap();
    assert_eq!(json, "\"offline\"");
}

#[test]
fn test_boundary_policy_from_toml() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        boundary: BoundaryPolicy,
    }

    let w: Wrapper = toml::from_str(
        r#"
        [boundary]
        policy = "clamp"
        window_deg = 0.2
        "#,
    )
    .unwrap();
    assert_eq!(w.boundary, BoundaryPolicy::Clamp { window_deg: 0.2 });

    let w: Wrapper = toml::from_str(
        r#"
        [boundary]
        policy = "reverse"
        "#,
    )
    .unwrap();
    assert_eq!(w.boundary, BoundaryPolicy::default());
}
