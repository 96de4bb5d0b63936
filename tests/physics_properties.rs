//! Property tests for motion integration and collision resolution

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skirmish::core::types::Vec2;
use skirmish::physics::{Collidable, Collider, CollisionResolver, PhysicsBody, VELOCITY_EPSILON};

struct Disc {
    position: Vec2,
    collider: Collider,
    body: PhysicsBody,
}

impl Disc {
    fn new(position: Vec2, radius: f32, mass: f32) -> Self {
        Self {
            position,
            collider: Collider::new(radius, mass),
            body: PhysicsBody::new(mass, 5.0, 10.0, 0.9),
        }
    }
}

impl Collidable for Disc {
    fn position(&self) -> Vec2 {
        self.position
    }
    fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }
    fn collider(&self) -> Option<&Collider> {
        Some(&self.collider)
    }
    fn body(&self) -> Option<&PhysicsBody> {
        Some(&self.body)
    }
    fn body_mut(&mut self) -> Option<&mut PhysicsBody> {
        Some(&mut self.body)
    }
}

proptest! {
    #[test]
    fn test_speed_never_exceeds_max(
        vx in -50.0f32..50.0,
        vy in -50.0f32..50.0,
        ax in -1.0f32..1.0,
        ay in -1.0f32..1.0,
        max_speed in 0.5f32..20.0,
        friction in 0.5f32..1.0,
        dt in 0.001f32..0.1,
    ) {
        let mut body = PhysicsBody::new(1.0, max_speed, 60.0, friction);
        body.velocity = Vec2::new(vx, vy);
        body.apply_acceleration(Vec2::new(ax, ay));

        let velocity = body.update(dt);
        prop_assert!(velocity.length() <= max_speed + 1e-4);
        prop_assert_eq!(body.acceleration, Vec2::ZERO);
    }

    #[test]
    fn test_tiny_velocity_snaps_to_zero(
        vx in -0.006f32..0.006,
        vy in -0.006f32..0.006,
    ) {
        let mut body = PhysicsBody::new(1.0, 5.0, 10.0, 0.9);
        body.velocity = Vec2::new(vx, vy);

        let velocity = body.update(1.0 / 60.0);
        prop_assert!(Vec2::new(vx, vy).length() < VELOCITY_EPSILON);
        prop_assert_eq!(velocity, Vec2::ZERO);
        prop_assert_eq!(body.velocity.x, 0.0);
        prop_assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_collision_separates_to_touching(
        angle in 0.0f32..std::f32::consts::TAU,
        gap in 0.05f32..0.95,
        radius_a in 0.3f32..2.0,
        radius_b in 0.3f32..2.0,
        mass_a in 0.5f32..5.0,
        mass_b in 0.5f32..5.0,
    ) {
        let min_distance = radius_a + radius_b;
        let start_b = Vec2::from_angle(angle) * (min_distance * gap);
        let mut discs = vec![
            Disc::new(Vec2::ZERO, radius_a, mass_a),
            Disc::new(start_b, radius_b, mass_b),
        ];

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let contacts = CollisionResolver::default().resolve_all(&mut discs, &mut rng);
        prop_assert_eq!(contacts, 1);

        let distance = discs[0].position.distance(&discs[1].position);
        prop_assert!(distance >= min_distance - 1e-3, "distance {} < {}", distance, min_distance);

        // The lighter disc takes the larger share of the correction
        let moved_a = discs[0].position.length();
        let moved_b = discs[1].position.distance(&start_b);
        let overlap = min_distance - min_distance * gap;
        prop_assert!((moved_a - overlap * mass_b / (mass_a + mass_b)).abs() < 1e-3);
        prop_assert!((moved_b - overlap * mass_a / (mass_a + mass_b)).abs() < 1e-3);
    }

    #[test]
    fn test_separated_discs_untouched(
        angle in 0.0f32..std::f32::consts::TAU,
        extra in 0.01f32..5.0,
    ) {
        let start_b = Vec2::from_angle(angle) * (2.0 + extra);
        let mut discs = vec![
            Disc::new(Vec2::ZERO, 1.0, 1.0),
            Disc::new(start_b, 1.0, 1.0),
        ];

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let contacts = CollisionResolver::default().resolve_all(&mut discs, &mut rng);
        prop_assert_eq!(contacts, 0);
        prop_assert_eq!(discs[0].position, Vec2::ZERO);
        prop_assert_eq!(discs[1].position, start_b);
    }
}
