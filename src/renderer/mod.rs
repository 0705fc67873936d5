//! WebGPU rendering module
//!
//! Flat-shaded quads and fans composed on the CPU each frame.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, world_to_ndc};
pub use scene::{Scene, SceneLayer, build_scene};
pub use vertex::Vertex;
