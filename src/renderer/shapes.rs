//! Shape generation for 2D primitives
//!
//! All shapes are emitted in world coordinates as triangle lists; the
//! pipeline maps them to NDC.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::{Vertex, colors};
use crate::sim::Horse;

/// Axis-aligned rectangle from its top-left corner
pub fn rect(pos: Vec2, size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let (l, t) = (pos.x, pos.y);
    let (r, b) = (pos.x + size.x, pos.y + size.y);
    [
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, b, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let point = |i: u32| {
        let theta = i as f32 / segments as f32 * TAU;
        Vertex::new(
            center.x + radius * theta.cos(),
            center.y + radius * theta.sin(),
            color,
        )
    };

    (0..segments)
        .flat_map(|i| [Vertex::new(center.x, center.y, color), point(i), point(i + 1)])
        .collect()
}

/// Five-pointed star inscribed in a box
pub fn star(pos: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let center = pos + size / 2.0;
    let outer = size.min_element() / 2.0;
    let inner = outer * 0.45;
    let point = |i: u32| {
        // Start at the top (y down)
        let theta = i as f32 / 10.0 * TAU - TAU / 4.0;
        let r = if i % 2 == 0 { outer } else { inner };
        Vertex::new(center.x + r * theta.cos(), center.y + r * theta.sin(), color)
    };

    (0..10)
        .flat_map(|i| [Vertex::new(center.x, center.y, color), point(i), point(i + 1)])
        .collect()
}

/// Blocky horse: body, neck, head, mane and legs within the hitbox
pub fn horse(horse: &Horse) -> Vec<Vertex> {
    let body_color = if horse.blocked {
        colors::HORSE_BLOCKED
    } else {
        colors::HORSE
    };
    let (w, h) = (horse.width(), horse.height());
    let origin = horse.pos;
    let leg_h = (h * 0.3).max(6.0);
    let body_h = h - leg_h;

    let mut vertices = Vec::with_capacity(6 * 8);
    let mut push = |offset: Vec2, size: Vec2, color| {
        vertices.extend_from_slice(&rect(origin + offset, size, color));
    };

    // Body
    push(Vec2::new(0.0, body_h * 0.35), Vec2::new(w * 0.75, body_h * 0.65), body_color);
    if horse.ducking {
        // Head low and forward
        push(Vec2::new(w * 0.7, body_h * 0.45), Vec2::new(w * 0.3, body_h * 0.4), body_color);
    } else {
        push(Vec2::new(w * 0.62, body_h * 0.15), Vec2::new(w * 0.16, body_h * 0.5), body_color);
        push(Vec2::new(w * 0.7, 0.0), Vec2::new(w * 0.3, body_h * 0.3), body_color);
        push(Vec2::new(w * 0.58, 0.0), Vec2::new(w * 0.08, body_h * 0.45), colors::MANE);
    }
    // Tail
    push(Vec2::new(-w * 0.08, body_h * 0.35), Vec2::new(w * 0.08, body_h * 0.45), colors::MANE);

    // Legs tuck while airborne
    let leg_len = if horse.jumping { leg_h * 0.6 } else { leg_h };
    for x in [0.05, 0.2, 0.5, 0.62] {
        push(Vec2::new(w * x, body_h), Vec2::new(w * 0.08, leg_len), body_color);
    }

    vertices
}
