//! Immediate-mode 2D painter
//!
//! Shapes are tessellated into triangles on the CPU. Coordinates go through
//! the current affine transform, so the scene can be drawn in logical units
//! and land in surface pixels.

use glam::{Affine2, Vec2};
use std::f32::consts::{PI, TAU};

use super::font;
use super::vertex::{Rgba, Vertex};

/// Segments used for a full circle
const CIRCLE_SEGMENTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

pub struct Painter {
    vertices: Vec<Vertex>,
    transform: Affine2,
    stack: Vec<Affine2>,
}

impl Painter {
    pub fn new(base: Affine2) -> Self {
        Self {
            vertices: Vec::with_capacity(4096),
            transform: base,
            stack: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<Vertex> {
        self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Transform stack ---

    pub fn save(&mut self) {
        self.stack.push(self.transform);
    }

    /// Unbalanced restores are ignored
    pub fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    pub fn scale(&mut self, factor: f32) {
        self.transform = self.transform * Affine2::from_scale(Vec2::splat(factor));
    }

    pub fn rotate(&mut self, angle: f32) {
        self.transform = self.transform * Affine2::from_angle(angle);
    }

    /// Run `draw` with a temporary transform
    pub fn scoped(&mut self, draw: impl FnOnce(&mut Self)) {
        self.save();
        draw(self);
        self.restore();
    }

    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    // --- Primitives ---

    fn push(&mut self, p: Vec2, color: Rgba) {
        let p = self.transform.transform_point2(p);
        self.vertices.push(Vertex::new(p.x, p.y, color));
    }

    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Rgba) {
        self.push(a, color);
        self.push(b, color);
        self.push(c, color);
    }

    /// Quad with one color per corner (a, b, c, d in winding order)
    fn quad_colored(&mut self, corners: [(Vec2, Rgba); 4]) {
        let [a, b, c, d] = corners;
        self.push(a.0, a.1);
        self.push(b.0, b.1);
        self.push(c.0, c.1);
        self.push(a.0, a.1);
        self.push(c.0, c.1);
        self.push(d.0, d.1);
    }

    pub fn quad(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: Rgba) {
        self.quad_colored([(a, color), (b, color), (c, color), (d, color)]);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        self.quad(
            Vec2::new(x, y),
            Vec2::new(x + w, y),
            Vec2::new(x + w, y + h),
            Vec2::new(x, y + h),
            color,
        );
    }

    /// Vertical gradient; `stops` are (offset 0-1, color), sorted by offset
    pub fn fill_rect_gradient(&mut self, x: f32, y: f32, w: f32, h: f32, stops: &[(f32, Rgba)]) {
        for pair in stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            let y0 = y + h * t0;
            let y1 = y + h * t1;
            self.quad_colored([
                (Vec2::new(x, y0), c0),
                (Vec2::new(x + w, y0), c0),
                (Vec2::new(x + w, y1), c1),
                (Vec2::new(x, y1), c1),
            ]);
        }
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, width: f32, color: Rgba) {
        let half = width / 2.0;
        self.fill_rect(x - half, y - half, w + width, width, color);
        self.fill_rect(x - half, y + h - half, w + width, width, color);
        self.fill_rect(x - half, y + half, width, h - width, color);
        self.fill_rect(x + w - half, y + half, width, h - width, color);
    }

    /// Filled convex polygon (fan from the first point)
    pub fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        for pair in points[1..].windows(2) {
            self.triangle(points[0], pair[0], pair[1], color);
        }
    }

    /// Filled elliptical sector between two angles
    pub fn fill_ellipse_arc(
        &mut self,
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        start: f32,
        end: f32,
        color: Rgba,
    ) {
        let span = end - start;
        let segments = ((span.abs() / TAU) * CIRCLE_SEGMENTS as f32).ceil().max(3.0) as usize;
        let rot = Vec2::from_angle(rotation);
        let point = |theta: f32| center + rot.rotate(Vec2::new(radii.x * theta.cos(), radii.y * theta.sin()));
        for i in 0..segments {
            let t0 = start + span * i as f32 / segments as f32;
            let t1 = start + span * (i + 1) as f32 / segments as f32;
            self.triangle(center, point(t0), point(t1), color);
        }
    }

    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Rgba) {
        self.fill_ellipse_arc(center, radii, rotation, 0.0, TAU, color);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.fill_ellipse(center, Vec2::splat(radius), 0.0, color);
    }

    /// Disc fading from `inner` at the center to `outer` at the rim
    pub fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, stops: &[(f32, Rgba)]) {
        for pair in stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            let (r0, r1) = (radius * t0, radius * t1);
            for i in 0..CIRCLE_SEGMENTS {
                let a0 = Vec2::from_angle(TAU * i as f32 / CIRCLE_SEGMENTS as f32);
                let a1 = Vec2::from_angle(TAU * (i + 1) as f32 / CIRCLE_SEGMENTS as f32);
                self.quad_colored([
                    (center + a0 * r0, c0),
                    (center + a0 * r1, c1),
                    (center + a1 * r1, c1),
                    (center + a1 * r0, c0),
                ]);
            }
        }
    }

    /// Thick line segment with optional round caps
    pub fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Rgba, round: bool) {
        let dir = (b - a).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let perp = dir.perp() * (width / 2.0);
        self.quad(a + perp, b + perp, b - perp, a - perp, color);
        if round {
            self.fill_circle(a, width / 2.0, color);
            self.fill_circle(b, width / 2.0, color);
        }
    }

    pub fn polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color, false);
        }
    }

    /// Dashed straight line: `dash` on, `gap` off
    pub fn dashed_line(&mut self, a: Vec2, b: Vec2, dash: f32, gap: f32, width: f32, color: Rgba) {
        if dash <= 0.0 {
            return;
        }
        let length = a.distance(b);
        let dir = (b - a).normalize_or_zero();
        let mut t = 0.0;
        while t < length {
            let end = (t + dash).min(length);
            self.line(a + dir * t, a + dir * end, width, color, false);
            t += dash + gap;
        }
    }

    pub fn quad_curve(&mut self, from: Vec2, control: Vec2, to: Vec2, width: f32, color: Rgba) {
        const STEPS: usize = 24;
        let points: Vec<Vec2> = (0..=STEPS)
            .map(|i| {
                let t = i as f32 / STEPS as f32;
                let u = 1.0 - t;
                from * (u * u) + control * (2.0 * u * t) + to * (t * t)
            })
            .collect();
        self.polyline(&points, width, color);
    }

    pub fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, width: f32, color: Rgba) {
        self.stroke_ellipse_arc(center, Vec2::splat(radius), start, end, width, color);
    }

    pub fn stroke_ellipse_arc(
        &mut self,
        center: Vec2,
        radii: Vec2,
        start: f32,
        end: f32,
        width: f32,
        color: Rgba,
    ) {
        let span = end - start;
        let segments = ((span.abs() / TAU) * CIRCLE_SEGMENTS as f32).ceil().max(2.0) as usize;
        let points: Vec<Vec2> = (0..=segments)
            .map(|i| {
                let theta = start + span * i as f32 / segments as f32;
                center + Vec2::new(radii.x * theta.cos(), radii.y * theta.sin())
            })
            .collect();
        self.polyline(&points, width, color);
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.stroke_arc(center, radius, 0.0, TAU, width, color);
    }

    pub fn fill_round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgba) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        self.fill_rect(x + r, y, w - 2.0 * r, h, color);
        self.fill_rect(x, y + r, r, h - 2.0 * r, color);
        self.fill_rect(x + w - r, y + r, r, h - 2.0 * r, color);
        if r > 0.0 {
            let corners = [
                (Vec2::new(x + w - r, y + r), -PI / 2.0),
                (Vec2::new(x + w - r, y + h - r), 0.0),
                (Vec2::new(x + r, y + h - r), PI / 2.0),
                (Vec2::new(x + r, y + r), PI),
            ];
            for (center, start) in corners {
                self.fill_ellipse_arc(center, Vec2::splat(r), 0.0, start, start + PI / 2.0, color);
            }
        }
    }

    /// Round rect with a border of `width` drawn outside the fill
    pub fn bordered_round_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Rgba,
        border: Rgba,
        width: f32,
    ) {
        let half = width / 2.0;
        self.fill_round_rect(x - half, y - half, w + width, h + width, radius + half, border);
        self.fill_round_rect(x + half, y + half, w - width, h - width, (radius - half).max(0.0), fill);
    }

    /// Text centered vertically on `pos.y`; `size` is the glyph height
    pub fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Rgba, align: Align) {
        let cell = size / font::GLYPH_ROWS as f32;
        let width = font::text_width(text, size);
        let left = match align {
            Align::Left => pos.x,
            Align::Center => pos.x - width / 2.0,
            Align::Right => pos.x - width,
        };
        let top = pos.y - size / 2.0;
        for (i, c) in text.chars().enumerate() {
            let origin = Vec2::new(left + (i * font::ADVANCE_COLS) as f32 * cell, top);
            let glyph = font::glyph(c);
            for (row, col, len) in font::runs(&glyph) {
                self.fill_rect(
                    origin.x + col as f32 * cell,
                    origin.y + row as f32 * cell,
                    len as f32 * cell,
                    cell,
                    color,
                );
            }
        }
    }

    /// Text with a one-cell drop shadow
    pub fn text_shadowed(&mut self, text: &str, pos: Vec2, size: f32, color: Rgba, align: Align) {
        let cell = size / font::GLYPH_ROWS as f32;
        let shadow = [0.0, 0.0, 0.0, color[3] * 0.6];
        self.text(text, pos + Vec2::splat(cell * 0.6), size, shadow, align);
        self.text(text, pos, size, color, align);
    }
}
