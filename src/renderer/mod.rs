//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into colored triangles in surface
//! pixels, then uploaded and drawn by a single flat-color pipeline.

mod font;
mod overlays;
pub mod painter;
pub mod pipeline;
pub mod scene;
pub mod vertex;
pub mod viewport;

pub use painter::{Align, Painter};
pub use pipeline::{RenderError, RenderState};
pub use scene::{Frame, RenderOptions, Renderer};
pub use vertex::{Rgba, Vertex};
pub use viewport::Viewport;
