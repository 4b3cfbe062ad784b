//! Letterboxed fit of the logical scene into the drawing surface

use glam::{Affine2, Vec2};

use crate::consts::{GAME_HEIGHT, GAME_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Surface size in pixels
    pub size: (u32, u32),
    pub scale: f32,
    /// Top-left of the logical scene in surface pixels
    pub offset: Vec2,
}

impl Viewport {
    pub fn fit(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let scale = if w / h < GAME_WIDTH / GAME_HEIGHT {
            // Narrower than the scene: bars top and bottom
            w / GAME_WIDTH
        } else {
            h / GAME_HEIGHT
        };
        let offset = Vec2::new(
            (w - GAME_WIDTH * scale) / 2.0,
            (h - GAME_HEIGHT * scale) / 2.0,
        );
        Self {
            size: (width, height),
            scale,
            offset,
        }
    }

    /// Logical scene units to surface pixels
    pub fn transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(Vec2::splat(self.scale), 0.0, self.offset)
    }

    /// Surface pixels (e.g. a pointer position) back to logical units
    pub fn to_logical(&self, pixel: Vec2) -> Vec2 {
        (pixel - self.offset) / self.scale
    }

    /// Surface pixels to normalized device coordinates (y up)
    pub fn to_ndc(&self, pixel: Vec2) -> Vec2 {
        let (w, h) = (self.size.0.max(1) as f32, self.size.1.max(1) as f32);
        Vec2::new(pixel.x / w * 2.0 - 1.0, 1.0 - pixel.y / h * 2.0)
    }
}
