//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Straight RGBA, 0-1
pub type Rgba = [f32; 4];

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Rgba,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Rgba) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// `0xRRGGBB` to an opaque color
pub const fn rgb(hex: u32) -> Rgba {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

pub const fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], alpha]
}

/// Component-wise blend, `t` in 0-1
pub fn mix(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

/// Colors for scene elements
pub mod colors {
    use super::{Rgba, rgb, with_alpha};

    pub const SKY: Rgba = rgb(0x87CEEB);
    pub const SKY_TOP: Rgba = rgb(0x6BB3D9);
    pub const HORIZON: Rgba = rgb(0xE8D5B7);
    pub const TREES: Rgba = rgb(0x2D5016);
    pub const SUN: Rgba = rgb(0xFFEB3B);
    pub const SUN_GLOW: Rgba = rgb(0xFFECB3);

    pub const WATER: Rgba = rgb(0x2E7D9E);
    pub const WATER_MID: Rgba = rgb(0x256B89);
    pub const WATER_NEAR: Rgba = rgb(0x1D5A75);
    pub const WATER_DEEP: Rgba = rgb(0x194D66);

    pub const ROD: Rgba = rgb(0x5D4037);
    pub const ROD_LIGHT: Rgba = rgb(0x795548);
    pub const ROD_DARK: Rgba = rgb(0x3E2723);
    pub const REEL: Rgba = rgb(0x78909C);
    pub const REEL_DARK: Rgba = rgb(0x546E7A);
    pub const HANDLE: Rgba = rgb(0x4E342E);

    pub const LINE: Rgba = rgb(0xE0E0E0);
    pub const BOBBER: Rgba = rgb(0xE53935);
    pub const BOBBER_WHITE: Rgba = rgb(0xFFFFFF);

    pub const TENSION_LOW: Rgba = rgb(0x4CAF50);
    pub const TENSION_MED: Rgba = rgb(0xFFC107);
    pub const TENSION_HIGH: Rgba = rgb(0xF44336);
    pub const PROGRESS_BAR: Rgba = rgb(0x64B5F6);
    pub const PROGRESS_BG: Rgba = rgb(0x1A1A2E);

    pub const TEXT: Rgba = rgb(0xFFFFFF);
    pub const BLACK: Rgba = rgb(0x000000);
    pub const GOLD: Rgba = rgb(0xFFD700);
    pub const ORANGE: Rgba = rgb(0xFF9800);
    pub const AMBER: Rgba = rgb(0xFCD34D);
    pub const MYSTERY: Rgba = rgb(0x4A5568);
    pub const MYSTERY_MARK: Rgba = rgb(0xA0AEC0);

    pub const WARNING_BOX: Rgba = with_alpha(rgb(0xB45309), 0.9);
    pub const WARNING_BORDER: Rgba = rgb(0xF59E0B);
    pub const WARNING_MARK: Rgba = rgb(0x78350F);
    pub const WARNING_TEXT: Rgba = rgb(0xFEF3C7);
    pub const WARNING_SUBTEXT: Rgba = rgb(0xFDE68A);

    pub const SHADE: Rgba = [0.0, 0.0, 0.0, 1.0];
    pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];
}

/// Per-rarity fish colors: body, back, optional glow
pub fn rarity_colors(rarity: crate::sim::Rarity) -> (Rgba, Rgba, Option<Rgba>) {
    use crate::sim::Rarity;
    match rarity {
        Rarity::Junk => (rgb(0x666666), rgb(0x444444), None),
        Rarity::Common => (rgb(0xFFB74D), rgb(0xF57C00), None),
        Rarity::Rare => (rgb(0xFFD700), rgb(0xFFA000), Some(rgb(0xFFD700))),
        Rarity::Legendary => (rgb(0xE040FB), rgb(0x9C27B0), Some(rgb(0xE040FB))),
    }
}
