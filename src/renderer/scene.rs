//! Frame composition
//!
//! Builds the vertex list for one frame in painter's order: sky and ground,
//! terrain, the horse, collectibles, then particles.

use std::ops::Range;

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors, entity_color};
use crate::consts::*;
use crate::particles::Particle;
use crate::sim::{DrawLayer, Entity, EntityKind, GameState};

/// Draw passes, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneLayer {
    Backdrop,
    Background,
    Horse,
    Foreground,
    Particles,
}

/// Vertices for one frame plus where each layer landed
#[derive(Debug, Default)]
pub struct Scene {
    pub vertices: Vec<Vertex>,
    pub layers: Vec<(SceneLayer, Range<usize>)>,
}

impl Scene {
    fn layer(&mut self, layer: SceneLayer, emit: impl FnOnce(&mut Vec<Vertex>)) {
        let start = self.vertices.len();
        emit(&mut self.vertices);
        self.layers.push((layer, start..self.vertices.len()));
    }
}

/// Compose the frame
pub fn build_scene(state: &GameState, particles: &[Particle]) -> Scene {
    let mut scene = Scene::default();
    let drawn = |layer: DrawLayer| {
        state
            .entities
            .iter()
            .filter(move |e| e.is_visible() && e.kind.draw_layer() == layer)
    };

    scene.layer(SceneLayer::Backdrop, backdrop);
    scene.layer(SceneLayer::Background, |out| {
        drawn(DrawLayer::Background).for_each(|e| entity(out, e));
    });
    scene.layer(SceneLayer::Horse, |out| {
        out.extend(shapes::horse(&state.horse));
    });
    scene.layer(SceneLayer::Foreground, |out| {
        drawn(DrawLayer::Foreground).for_each(|e| entity(out, e));
    });
    scene.layer(SceneLayer::Particles, |out| {
        for p in particles {
            let mut color = p.color;
            color[3] *= p.life.clamp(0.0, 1.0);
            let half = Vec2::splat(p.size / 2.0);
            out.extend_from_slice(&shapes::rect(p.pos - half, half * 2.0, color));
        }
    });

    scene
}

fn backdrop(out: &mut Vec<Vertex>) {
    let width = VISIBLE_WIDTH;
    out.extend_from_slice(&shapes::rect(
        Vec2::ZERO,
        Vec2::new(width, GROUND_Y),
        colors::SKY,
    ));
    out.extend_from_slice(&shapes::rect(
        Vec2::new(0.0, GROUND_Y),
        Vec2::new(width, 8.0),
        colors::GROUND,
    ));
    out.extend_from_slice(&shapes::rect(
        Vec2::new(0.0, GROUND_Y + 8.0),
        Vec2::new(width, VISIBLE_HEIGHT - GROUND_Y - 8.0),
        colors::DIRT,
    ));
}

fn entity(out: &mut Vec<Vertex>, e: &Entity) {
    let color = entity_color(e.kind);
    match e.kind {
        EntityKind::Fruit => out.extend(shapes::circle(
            e.pos + e.size / 2.0,
            e.size.min_element() / 2.0,
            color,
            12,
        )),
        EntityKind::Star => out.extend(shapes::star(e.pos, e.size, color)),
        EntityKind::Mushroom => {
            // Cap over a pale stem
            let cap = Vec2::new(e.size.x, e.size.y * 0.55);
            out.extend_from_slice(&shapes::rect(e.pos, cap, color));
            out.extend_from_slice(&shapes::rect(
                e.pos + Vec2::new(e.size.x * 0.3, cap.y),
                Vec2::new(e.size.x * 0.4, e.size.y - cap.y),
                [0.95, 0.92, 0.85, 1.0],
            ));
        }
        EntityKind::Platform | EntityKind::FloatingPlatform => {
            out.extend_from_slice(&shapes::rect(e.pos, e.size, color));
            out.extend_from_slice(&shapes::rect(
                e.pos,
                Vec2::new(e.size.x, e.size.y.min(6.0)),
                colors::PLATFORM_TOP,
            ));
        }
        _ => out.extend_from_slice(&shapes::rect(e.pos, e.size, color)),
    }
}
