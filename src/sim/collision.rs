//! Collision primitives between the horse and axis-aligned entities
//!
//! Discrete per-frame integration overshoots surfaces, so landing and wall
//! checks work with tolerance bands rather than exact contact.

use super::state::{Entity, Horse};
use crate::consts::*;

/// Box overlap between the horse and an entity.
///
/// Left, right and top edges are strict; the horse's bottom edge is
/// inclusive so a horse resting exactly on a hazard's top still touches it.
pub fn aabb_overlap(horse: &Horse, entity: &Entity) -> bool {
    horse.left() < entity.right()
        && horse.right() > entity.left()
        && horse.top() < entity.bottom()
        && horse.bottom() >= entity.top()
}

/// Floating platforms only interact with a horse at or near their top;
/// anything lower is walking underneath.
pub fn floating_gate(horse: &Horse, entity: &Entity) -> bool {
    !entity.is_floating() || horse.bottom() <= entity.top() + FLOATING_GATE
}

/// The horse comes down onto a platform's top surface this frame
pub fn platform_landing(horse: &Horse, platform: &Entity) -> bool {
    let horizontal = horse.right() > platform.left() && horse.left() < platform.right();
    let bottom = horse.bottom();
    let in_band =
        bottom >= platform.top() - LANDING_ABOVE && bottom <= platform.top() + LANDING_BELOW;
    horizontal && in_band && horse.velocity_y >= 0.0
}

/// The horse runs into the platform's leading edge from the side
pub fn platform_wall_collision(horse: &Horse, platform: &Entity) -> bool {
    if !floating_gate(horse, platform) {
        return false;
    }
    let at_front = horse.right() >= platform.left()
        && horse.right() <= platform.left() + WALL_FRONT_BAND;
    let below_top = horse.bottom() > platform.top() + WALL_BUFFER;
    let beside = horse.top() < platform.bottom();
    at_front && below_top && beside
}

/// Overlap as seen by the effect dispatcher (walk-under gate applied)
pub fn touches(horse: &Horse, entity: &Entity) -> bool {
    floating_gate(horse, entity) && aabb_overlap(horse, entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityKind;
    use glam::Vec2;

    fn platform_at(x: f32, top: f32, width: f32) -> Entity {
        Entity::platform(
            1,
            EntityKind::Platform,
            Vec2::new(x, top),
            Vec2::new(width, GROUND_Y - top),
            1,
        )
    }

    fn floating_at(x: f32, top: f32) -> Entity {
        Entity::platform(
            2,
            EntityKind::FloatingPlatform,
            Vec2::new(x, top),
            Vec2::new(180.0, 20.0),
            3,
        )
    }

    fn horse_with_bottom(bottom: f32, velocity_y: f32) -> Horse {
        let mut horse = Horse::default();
        horse.pos.y = bottom - horse.height();
        horse.velocity_y = velocity_y;
        horse
    }

    #[test]
    fn test_overlap_bottom_edge_inclusive() {
        let horse = Horse::default();
        // Pit whose top is exactly the horse's bottom
        let pit = Entity::new(
            1,
            EntityKind::WaterHole,
            Vec2::new(HORSE_X, GROUND_Y),
            Vec2::new(80.0, 40.0),
        );
        assert!(aabb_overlap(&horse, &pit));
    }

    #[test]
    fn test_overlap_side_edges_strict() {
        let horse = Horse::default();
        let touching_front = Entity::new(
            1,
            EntityKind::Star,
            Vec2::new(horse.right(), horse.top()),
            Vec2::new(30.0, 30.0),
        );
        assert!(!aabb_overlap(&horse, &touching_front));

        let touching_back = Entity::new(
            2,
            EntityKind::Star,
            Vec2::new(horse.left() - 30.0, horse.top()),
            Vec2::new(30.0, 30.0),
        );
        assert!(!aabb_overlap(&horse, &touching_back));
    }

    #[test]
    fn test_landing_requires_falling() {
        let platform = platform_at(HORSE_X - 20.0, GROUND_Y - 40.0, 300.0);
        let falling = horse_with_bottom(platform.top() + 2.0, 3.0);
        assert!(platform_landing(&falling, &platform));

        let rising = horse_with_bottom(platform.top() + 2.0, -3.0);
        assert!(!platform_landing(&rising, &platform));
    }

    #[test]
    fn test_landing_band_edges() {
        let platform = platform_at(HORSE_X - 20.0, GROUND_Y - 40.0, 300.0);
        assert!(platform_landing(
            &horse_with_bottom(platform.top() - LANDING_ABOVE, 1.0),
            &platform
        ));
        assert!(platform_landing(
            &horse_with_bottom(platform.top() + LANDING_BELOW, 1.0),
            &platform
        ));
        assert!(!platform_landing(
            &horse_with_bottom(platform.top() - LANDING_ABOVE - 1.0, 1.0),
            &platform
        ));
        assert!(!platform_landing(
            &horse_with_bottom(platform.top() + LANDING_BELOW + 1.0, 1.0),
            &platform
        ));
    }

    #[test]
    fn test_wall_hit_from_side() {
        let horse = Horse::default();
        // Leading edge just past the platform's front
        let platform = platform_at(horse.right() - 5.0, GROUND_Y - 40.0, 300.0);
        assert!(platform_wall_collision(&horse, &platform));

        // Horse already above the top: no wall
        let above = horse_with_bottom(platform.top(), 0.0);
        assert!(!platform_wall_collision(&above, &platform));

        // Platform still ahead
        let ahead = platform_at(horse.right() + 10.0, GROUND_Y - 40.0, 300.0);
        assert!(!platform_wall_collision(&horse, &ahead));
    }

    #[test]
    fn test_floating_platform_walk_under() {
        let horse = Horse::default();
        let slab = floating_at(horse.right() - 5.0, GROUND_Y - 120.0);
        assert!(!platform_wall_collision(&horse, &slab));
        assert!(!touches(&horse, &slab));

        // Jumping into the slab's side near its top
        let mut high = horse_with_bottom(slab.top() + 10.0, 2.0);
        high.pos.x = HORSE_X;
        assert!(platform_wall_collision(&high, &slab));
    }
}
