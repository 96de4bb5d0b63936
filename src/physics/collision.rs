//! All-pairs circle collision resolution
//!
//! Positional correction is split by mass; pairs closing along the contact
//! normal also get a velocity impulse so crowds bounce instead of snapping.

use std::f32::consts::TAU;

use rand::Rng;

use crate::core::types::Vec2;
use crate::physics::body::PhysicsBody;
use crate::physics::collider::Collider;
use crate::physics::COINCIDENT_EPSILON;

/// Anything the resolver can push around
pub trait Collidable {
    fn position(&self) -> Vec2;
    fn translate(&mut self, offset: Vec2);
    fn collider(&self) -> Option<&Collider>;
    fn body(&self) -> Option<&PhysicsBody>;
    fn body_mut(&mut self) -> Option<&mut PhysicsBody>;

    /// Inactive or collider-less entries are skipped entirely
    fn collides(&self) -> bool {
        self.collider().map(|c| c.enabled).unwrap_or(false)
    }
}

/// Result of a single pair test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from B to A
    pub normal: Vec2,
    pub overlap: f32,
}

#[derive(Debug, Clone)]
pub struct CollisionResolver {
    pub impulse_strength: f32,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            impulse_strength: 2.0,
        }
    }
}

impl CollisionResolver {
    pub fn new(impulse_strength: f32) -> Self {
        Self { impulse_strength }
    }

    /// Resolve every overlapping pair once. Returns the number of contacts.
    pub fn resolve_all<T: Collidable, R: Rng + ?Sized>(&self, items: &mut [T], rng: &mut R) -> usize {
        let mut contacts = 0;

        for i in 0..items.len() {
            let (head, tail) = items.split_at_mut(i + 1);
            let a = &mut head[i];
            if !a.collides() {
                continue;
            }
            for b in tail.iter_mut() {
                if !b.collides() {
                    continue;
                }
                if self.resolve_pair(a, b, rng).is_some() {
                    contacts += 1;
                }
            }
        }

        contacts
    }

    /// Separate one pair if it overlaps
    pub fn resolve_pair<A, B, R>(&self, a: &mut A, b: &mut B, rng: &mut R) -> Option<Contact>
    where
        A: Collidable + ?Sized,
        B: Collidable + ?Sized,
        R: Rng + ?Sized,
    {
        let (radius_a, mass_a) = a.collider().filter(|c| c.enabled).map(|c| (c.radius(), c.mass))?;
        let (radius_b, mass_b) = b.collider().filter(|c| c.enabled).map(|c| (c.radius(), c.mass))?;

        let delta = a.position() - b.position();
        let distance = delta.length();
        let min_distance = radius_a + radius_b;
        if distance >= min_distance {
            return None;
        }

        let overlap = min_distance - distance;
        let normal = if distance < COINCIDENT_EPSILON {
            Vec2::from_angle(rng.gen_range(0.0..TAU))
        } else {
            delta / distance
        };

        let (share_a, share_b) = mass_shares(mass_a, mass_b);
        a.translate(normal * (overlap * share_a));
        b.translate(-normal * (overlap * share_b));

        let velocities = a.body().map(|body| body.velocity).zip(b.body().map(|body| body.velocity));
        if let Some((velocity_a, velocity_b)) = velocities {
            let closing = (velocity_a - velocity_b).dot(&normal);
            if closing < 0.0 {
                let impulse = normal * (closing * self.impulse_strength);
                if let Some(body) = a.body_mut() {
                    body.apply_impulse(impulse * -share_a);
                }
                if let Some(body) = b.body_mut() {
                    body.apply_impulse(impulse * share_b);
                }
            }
        }

        Some(Contact { normal, overlap })
    }
}

/// Fraction of the correction each side takes: the lighter body moves more
fn mass_shares(mass_a: f32, mass_b: f32) -> (f32, f32) {
    let total = mass_a + mass_b;
    if total <= 0.0 {
        return (0.5, 0.5);
    }
    (mass_b / total, mass_a / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Disc {
        position: Vec2,
        collider: Collider,
        body: Option<PhysicsBody>,
    }

    impl Disc {
        fn new(x: f32, y: f32, radius: f32, mass: f32) -> Self {
            Self {
                position: Vec2::new(x, y),
                collider: Collider::new(radius, mass),
                body: Some(PhysicsBody::default()),
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
            self.body.as_ref()
        }
        fn body_mut(&mut self) -> Option<&mut PhysicsBody> {
            self.body.as_mut()
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_overlapping_pair_separated() {
        let mut discs = vec![Disc::new(0.0, 0.0, 1.0, 1.0), Disc::new(1.0, 0.0, 1.0, 1.0)];
        let contacts = CollisionResolver::default().resolve_all(&mut discs, &mut rng());
        assert_eq!(contacts, 1);
        let distance = discs[0].position.distance(&discs[1].position);
        assert!((distance - 2.0).abs() < 1e-5);
        assert!((discs[0].position.x + 0.5).abs() < 1e-5);
        assert!((discs[1].position.x - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_heavier_body_moves_less() {
        let mut discs = vec![Disc::new(0.0, 0.0, 1.0, 3.0), Disc::new(1.0, 0.0, 1.0, 1.0)];
        CollisionResolver::default().resolve_all(&mut discs, &mut rng());
        let moved_heavy = discs[0].position.x.abs();
        let moved_light = (discs[1].position.x - 1.0).abs();
        assert!((moved_heavy - 0.25).abs() < 1e-5);
        assert!((moved_light - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_centers_get_random_normal() {
        let mut discs = vec![Disc::new(5.0, 5.0, 1.0, 1.0), Disc::new(5.0, 5.0, 1.0, 1.0)];
        CollisionResolver::default().resolve_all(&mut discs, &mut rng());
        let distance = discs[0].position.distance(&discs[1].position);
        assert!(distance.is_finite());
        assert!((distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_disabled_collider_skipped() {
        let mut discs = vec![Disc::new(0.0, 0.0, 1.0, 1.0), Disc::new(0.5, 0.0, 1.0, 1.0)];
        discs[1].collider.enabled = false;
        let contacts = CollisionResolver::default().resolve_all(&mut discs, &mut rng());
        assert_eq!(contacts, 0);
        assert_eq!(discs[0].position, Vec2::ZERO);
    }

    #[test]
    fn test_closing_bodies_bounce_apart() {
        let mut discs = vec![Disc::new(0.0, 0.0, 1.0, 1.0), Disc::new(1.5, 0.0, 1.0, 1.0)];
        if let Some(body) = discs[0].body.as_mut() {
            body.velocity = Vec2::new(2.0, 0.0);
        }
        if let Some(body) = discs[1].body.as_mut() {
            body.velocity = Vec2::new(-2.0, 0.0);
        }
        CollisionResolver::default().resolve_all(&mut discs, &mut rng());
        let va = discs[0].body.as_ref().map(|b| b.velocity.x).unwrap_or_default();
        let vb = discs[1].body.as_ref().map(|b| b.velocity.x).unwrap_or_default();
        assert!(va < 0.0, "A should now move away from B, got {va}");
        assert!(vb > 0.0, "B should now move away from A, got {vb}");
    }

    #[test]
    fn test_separating_bodies_get_no_impulse() {
        let mut discs = vec![Disc::new(0.0, 0.0, 1.0, 1.0), Disc::new(1.5, 0.0, 1.0, 1.0)];
        if let Some(body) = discs[0].body.as_mut() {
            body.velocity = Vec2::new(-1.0, 0.0);
        }
        CollisionResolver::default().resolve_all(&mut discs, &mut rng());
        let va = discs[0].body.as_ref().map(|b| b.velocity).unwrap_or_default();
        assert_eq!(va, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_body_less_entries_only_separate() {
        let mut discs = vec![Disc::new(0.0, 0.0, 1.0, 1.0), Disc::new(1.0, 0.0, 1.0, 1.0)];
        discs[1].body = None;
        if let Some(body) = discs[0].body.as_mut() {
            body.velocity = Vec2::new(3.0, 0.0);
        }
        CollisionResolver::default().resolve_all(&mut discs, &mut rng());
        let va = discs[0].body.as_ref().map(|b| b.velocity).unwrap_or_default();
        assert_eq!(va, Vec2::new(3.0, 0.0));
        assert!(discs[0].position.distance(&discs[1].position) >= 2.0 - 1e-5);
    }
}
