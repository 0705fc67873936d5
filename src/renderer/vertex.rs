//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::EntityKind;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const SKY: [f32; 4] = [0.53, 0.81, 0.98, 1.0];
    pub const GROUND: [f32; 4] = [0.36, 0.6, 0.24, 1.0];
    pub const DIRT: [f32; 4] = [0.45, 0.32, 0.2, 1.0];
    pub const WATER: [f32; 4] = [0.15, 0.4, 0.85, 1.0];

    pub const HORSE: [f32; 4] = [0.55, 0.33, 0.17, 1.0];
    pub const MANE: [f32; 4] = [0.2, 0.12, 0.06, 1.0];
    /// Tint while blocked against a wall
    pub const HORSE_BLOCKED: [f32; 4] = [0.75, 0.35, 0.25, 1.0];

    pub const PLATFORM: [f32; 4] = [0.5, 0.42, 0.33, 1.0];
    pub const PLATFORM_TOP: [f32; 4] = [0.4, 0.7, 0.3, 1.0];
    pub const FLOATING: [f32; 4] = [0.62, 0.52, 0.4, 1.0];
    pub const OBSTACLE: [f32; 4] = [0.45, 0.45, 0.5, 1.0];
    pub const BARRIER: [f32; 4] = [0.85, 0.25, 0.2, 1.0];

    pub const FRUIT: [f32; 4] = [0.95, 0.2, 0.2, 1.0];
    pub const STAR: [f32; 4] = [1.0, 0.9, 0.2, 1.0];
    pub const KEY: [f32; 4] = [1.0, 0.78, 0.1, 1.0];
    pub const MUSHROOM: [f32; 4] = [0.7, 0.3, 0.75, 1.0];
}

/// Fill color for an entity
pub fn entity_color(kind: EntityKind) -> [f32; 4] {
    match kind {
        EntityKind::Fruit => colors::FRUIT,
        EntityKind::Star => colors::STAR,
        EntityKind::Key => colors::KEY,
        EntityKind::Mushroom => colors::MUSHROOM,
        EntityKind::Obstacle => colors::OBSTACLE,
        EntityKind::LowBarrier | EntityKind::HighBarrier => colors::BARRIER,
        EntityKind::WaterHole => colors::WATER,
        EntityKind::Platform => colors::PLATFORM,
        EntityKind::FloatingPlatform => colors::FLOATING,
    }
}
