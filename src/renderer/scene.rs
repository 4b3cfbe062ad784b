//! Scene renderer
//!
//! Read-only observer of the simulation snapshot. Owns only ambient time, the
//! tree line generated once at construction, and the viewport fit. Each call
//! to `render` paints one complete frame into a vertex list.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::overlays;
use super::painter::Painter;
use super::vertex::{Rgba, Vertex, colors, with_alpha};
use super::viewport::Viewport;
use crate::consts::*;
use crate::sim::{GameState, Phase};
use crate::tuning::Tuning;

/// Per-frame switches supplied by the embedding layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Block the scene with the funding prompt
    pub insufficient_balance: bool,
}

/// One painted frame, in surface pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub vertices: Vec<Vertex>,
    pub clear: Rgba,
    pub size: (u32, u32),
}

/// Tuning values the HUD needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct HudLimits {
    pub tension_low: f32,
    pub tension_high: f32,
    pub zone_min: f32,
    pub zone_max: f32,
    pub bite_window_ms: f32,
}

impl HudLimits {
    pub(super) fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            tension_low: tuning.reeling.tension_low_threshold,
            tension_high: tuning.reeling.tension_high_threshold,
            zone_min: tuning.reeling.fight_zone_min,
            zone_max: tuning.reeling.fight_zone_max,
            bite_window_ms: tuning.timing.bite_window_ms,
        }
    }

    /// Line and bar color for a tension level
    pub fn tension_color(&self, tension: f32) -> Rgba {
        if tension > self.tension_high {
            colors::TENSION_HIGH
        } else if tension > self.tension_low {
            colors::TENSION_MED
        } else {
            colors::TENSION_LOW
        }
    }

    pub fn in_zone(&self, tension: f32) -> bool {
        tension >= self.zone_min && tension <= self.zone_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeKind {
    Pine,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tree {
    x: f32,
    height: f32,
    width: f32,
    kind: TreeKind,
}

fn generate_trees(seed: u64) -> Vec<Tree> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut trees = Vec::new();
    let mut x = 0.0;
    while x < GAME_WIDTH + 20.0 {
        let height = 25.0 + rng.random::<f32>() * 20.0;
        let width = 12.0 + rng.random::<f32>() * 10.0;
        let kind = if rng.random::<f32>() > 0.3 {
            TreeKind::Pine
        } else {
            TreeKind::Round
        };
        trees.push(Tree {
            x,
            height,
            width,
            kind,
        });
        x += 8.0 + rng.random::<f32>() * 12.0;
    }
    trees
}

/// Screen position of the rod tip
pub(super) fn rod_tip(state: &GameState) -> Vec2 {
    let angle = state.rod_angle - FRAC_PI_2;
    Vec2::new(ROD_PIVOT_X, ROD_PIVOT_Y) + Vec2::from_angle(angle) * ROD_LENGTH
}

/// Bobber screen position and perspective scale
pub(super) fn bobber_position(state: &GameState) -> (Vec2, f32) {
    // 0 = far, 1 = near
    let t = 1.0 - state.bobber_distance / 100.0;
    let y = HORIZON_Y + (NEAR_Y - HORIZON_Y) * t * t;
    let x = GAME_WIDTH / 2.0 + state.bobber_x;
    (Vec2::new(x, y), 0.5 + t * 0.8)
}

/// `sin(time / period)` on the ambient clock
pub(super) fn wave(time_ms: f64, period: f64) -> f32 {
    (time_ms / period).sin() as f32
}

pub struct Renderer {
    viewport: Viewport,
    time_ms: f64,
    trees: Vec<Tree>,
}

impl Renderer {
    pub fn new(seed: u64, width: u32, height: u32) -> Self {
        let trees = generate_trees(seed);
        log::debug!("Generated {} tree silhouettes", trees.len());
        Self {
            viewport: Viewport::fit(width, height),
            time_ms: 0.0,
            trees,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::fit(width, height);
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// Advance ambient time by `dt_ms` and paint the snapshot. HUD limits
    /// are read from `tuning` on every call.
    pub fn render(
        &mut self,
        state: &GameState,
        tuning: &Tuning,
        dt_ms: f32,
        options: &RenderOptions,
    ) -> Frame {
        self.time_ms += dt_ms.max(0.0) as f64;
        let hud = HudLimits::from_tuning(tuning);

        let mut p = Painter::new(self.viewport.transform());
        self.draw_sky(&mut p);
        self.draw_water(&mut p);

        if options.insufficient_balance {
            overlays::insufficient_balance(&mut p, self.time_ms);
            return self.frame(p);
        }

        if state.phase.line_out() {
            self.draw_line(&mut p, state, &hud);
            self.draw_bobber(&mut p, state);
        }
        draw_particles(&mut p, state);
        self.draw_rod(&mut p, state);

        overlays::draw(&mut p, state, self.time_ms, &hud);
        self.frame(p)
    }

    fn frame(&self, painter: Painter) -> Frame {
        Frame {
            vertices: painter.finish(),
            clear: colors::SKY,
            size: self.viewport.size,
        }
    }

    fn draw_sky(&self, p: &mut Painter) {
        p.fill_rect_gradient(
            0.0,
            0.0,
            GAME_WIDTH,
            HORIZON_Y,
            &[(0.0, colors::SKY_TOP), (1.0, colors::SKY)],
        );

        let sun = Vec2::new(GAME_WIDTH * 0.75, GAME_HEIGHT * 0.1);
        let sun_radius = 25.0;
        p.fill_radial_gradient(
            sun,
            sun_radius * 3.0,
            &[
                (0.0, with_alpha(colors::SUN_GLOW, 0.6)),
                (0.5, with_alpha(colors::SUN_GLOW, 0.2)),
                (1.0, with_alpha(colors::SUN_GLOW, 0.0)),
            ],
        );
        p.fill_circle(sun, sun_radius, colors::SUN);

        p.fill_rect(0.0, HORIZON_Y - 3.0, GAME_WIDTH, 6.0, colors::HORIZON);

        for tree in &self.trees {
            let base = HORIZON_Y;
            let mid = tree.x + tree.width / 2.0;
            match tree.kind {
                TreeKind::Pine => {
                    p.fill_rect(tree.x + tree.width * 0.35, base - 5.0, tree.width * 0.3, 5.0, colors::TREES);
                    for layer in 0..3 {
                        let layer_y = base - 5.0 - layer as f32 * tree.height * 0.3;
                        let layer_w = tree.width * (1.0 - layer as f32 * 0.15);
                        let layer_h = tree.height * 0.45;
                        p.triangle(
                            Vec2::new(mid, layer_y - layer_h),
                            Vec2::new(mid - layer_w / 2.0, layer_y),
                            Vec2::new(mid + layer_w / 2.0, layer_y),
                            colors::TREES,
                        );
                    }
                }
                TreeKind::Round => {
                    p.fill_rect(
                        tree.x + tree.width * 0.35,
                        base - tree.height * 0.4,
                        tree.width * 0.3,
                        tree.height * 0.4,
                        colors::TREES,
                    );
                    p.fill_ellipse(
                        Vec2::new(mid, base - tree.height * 0.6),
                        Vec2::new(tree.width * 0.6, tree.height * 0.5),
                        0.0,
                        colors::TREES,
                    );
                }
            }
        }
    }

    fn draw_water(&self, p: &mut Painter) {
        let water_h = GAME_HEIGHT - HORIZON_Y;
        p.fill_rect_gradient(
            0.0,
            HORIZON_Y,
            GAME_WIDTH,
            water_h,
            &[
                (0.0, colors::WATER),
                (0.3, colors::WATER_MID),
                (0.6, colors::WATER_NEAR),
                (1.0, colors::WATER_DEEP),
            ],
        );

        let offset = (self.time_ms / 500.0) as f32;
        let wave_color = with_alpha(colors::WHITE, 0.15);
        for i in 0..8 {
            let fi = i as f32;
            let y = HORIZON_Y + 20.0 + fi * 25.0;
            let points: Vec<Vec2> = (0..=(GAME_WIDTH as usize / 5))
                .map(|step| {
                    let x = step as f32 * 5.0;
                    let dy = (x / 40.0 + offset + fi * 0.5).sin() * (3.0 + fi * 0.5);
                    Vec2::new(x, y + dy)
                })
                .collect();
            p.polyline(&points, 1.0, wave_color);
        }

        let sparkle = with_alpha(colors::WHITE, 0.6);
        for i in 0..6 {
            let fi = i as f64;
            let x = ((self.time_ms / 20.0 + fi * 60.0) % GAME_WIDTH as f64) as f32;
            let y = HORIZON_Y + 40.0 + (i as f32 * 50.0) % (water_h - 80.0);
            let size = 2.0 + wave(self.time_ms + fi * 400.0, 200.0) * 1.5;
            p.fill_rect(x - size / 2.0, y - size / 2.0, size, size, sparkle);
        }
    }

    fn draw_line(&self, p: &mut Painter, state: &GameState, hud: &HudLimits) {
        let tip = rod_tip(state);
        let (bobber, _) = bobber_position(state);
        let color = if state.phase == Phase::Reeling {
            hud.tension_color(state.tension)
        } else {
            colors::LINE
        };
        let sag = 30.0 - (state.tension / 100.0) * 20.0;
        let control = Vec2::new((tip.x + bobber.x) / 2.0, tip.y.max(bobber.y) / 2.0 + sag);
        p.quad_curve(tip, control, bobber, 2.0, color);
    }

    fn draw_bobber(&self, p: &mut Painter, state: &GameState) {
        let (pos, s) = bobber_position(state);
        let bob = wave(self.time_ms, 400.0) * 3.0 * s;
        let time = self.time_ms;

        p.scoped(|p| {
            p.translate(pos + Vec2::new(0.0, bob));
            p.fill_ellipse(Vec2::new(0.0, 8.0 * s), Vec2::new(10.0 * s, 4.0 * s), 0.0, with_alpha(colors::SHADE, 0.2));
            p.fill_ellipse_arc(Vec2::new(0.0, 5.0 * s), Vec2::new(8.0 * s, 10.0 * s), 0.0, 0.0, PI, colors::BOBBER_WHITE);
            p.fill_ellipse_arc(Vec2::new(0.0, -5.0 * s), Vec2::new(8.0 * s, 10.0 * s), 0.0, PI, TAU, colors::BOBBER);
            p.fill_ellipse(Vec2::new(-3.0 * s, -8.0 * s), Vec2::new(2.0 * s, 3.0 * s), -0.3, with_alpha(colors::WHITE, 0.4));

            if matches!(state.phase, Phase::Waiting | Phase::Bite) {
                let ripple = ((time / 500.0) % 1.0) as f32;
                let radii = Vec2::new(15.0 + ripple * 20.0, 5.0 + ripple * 8.0) * s;
                p.stroke_ellipse_arc(Vec2::new(0.0, 5.0 * s), radii, 0.0, TAU, 2.0, with_alpha(colors::WHITE, (1.0 - ripple) * 0.5));
            }
        });
    }

    fn draw_rod(&self, p: &mut Painter, state: &GameState) {
        let pivot = Vec2::new(ROD_PIVOT_X, ROD_PIVOT_Y);
        let dir = Vec2::from_angle(state.rod_angle - FRAC_PI_2);
        let along = |f: f32| pivot + dir * ROD_LENGTH * f;
        let tip = along(1.0);

        p.line(pivot + Vec2::splat(3.0), tip + Vec2::splat(3.0), 12.0, with_alpha(colors::SHADE, 0.3), true);
        p.line(pivot, along(0.25), 10.0, colors::ROD, true);
        p.line(along(0.25), along(0.6), 7.0, colors::ROD_LIGHT, true);
        p.line(along(0.6), tip, 3.0, colors::ROD_DARK, true);

        let reel = pivot + dir * 40.0;
        p.fill_circle(reel, 15.0, colors::REEL_DARK);
        p.fill_circle(reel, 14.0, colors::REEL);
        p.fill_circle(reel, 8.0, colors::REEL_DARK);

        let handle = reel + Vec2::from_angle((self.time_ms / 100.0 % std::f64::consts::TAU) as f32) * 16.0;
        p.line(reel, handle, 3.0, colors::REEL_DARK, false);
        p.fill_circle(handle, 5.0, colors::HANDLE);

        for i in 1..=4 {
            p.fill_circle(along(i as f32 * 0.2), 2.0, colors::REEL_DARK);
        }
    }
}

fn draw_particles(p: &mut Painter, state: &GameState) {
    for particle in &state.splash_particles {
        p.fill_rect(
            particle.pos.x - 3.0,
            particle.pos.y - 3.0,
            6.0,
            6.0,
            with_alpha(colors::WHITE, particle.life.clamp(0.0, 1.0)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CaughtFish, Rarity};

    fn renderer() -> Renderer {
        Renderer::new(1, 720, 1280)
    }

    fn paint(r: &mut Renderer, phase: Phase) -> Frame {
        r.render(
            &state_in(phase),
            &Tuning::default(),
            0.0,
            &RenderOptions::default(),
        )
    }

    fn state_in(phase: Phase) -> GameState {
        let mut state = GameState::new(1);
        state.phase = phase;
        state.bobber_distance = 70.0;
        state.tension = 50.0;
        state.progress = 40.0;
        if phase == Phase::Caught {
            state.last_catch = Some(CaughtFish {
                name: "Bass".into(),
                rarity: Rarity::Common,
                size: 30,
                timestamp_ms: 0.0,
                sequence: None,
                is_practice: true,
            });
        }
        state
    }

    #[test]
    fn test_trees_are_stable_for_a_seed() {
        let a = generate_trees(9);
        assert_eq!(a, generate_trees(9));
        assert!(a.last().unwrap().x >= GAME_WIDTH - 20.0);
        for tree in &a {
            assert!((25.0..=45.0).contains(&tree.height));
            assert!((12.0..=22.0).contains(&tree.width));
        }
        for pair in a.windows(2) {
            let step = pair[1].x - pair[0].x;
            assert!((7.99..=20.01).contains(&step));
        }
    }

    #[test]
    fn test_render_does_not_touch_state() {
        let mut r = renderer();
        let tuning = Tuning::default();
        for phase in Phase::ALL {
            let state = state_in(phase);
            let before = state.clone();
            let frame = r.render(&state, &tuning, 16.0, &RenderOptions::default());
            assert_eq!(state, before);
            assert!(!frame.vertices.is_empty());
            assert_eq!(frame.vertices.len() % 3, 0);
        }
        assert_eq!(r.time_ms(), 16.0 * Phase::ALL.len() as f64);
    }

    #[test]
    fn test_insufficient_balance_short_circuits() {
        let mut a = renderer();
        let mut b = renderer();
        let blocked = RenderOptions {
            insufficient_balance: true,
        };
        // Same frame regardless of phase
        let tuning = Tuning::default();
        let idle = a.render(&state_in(Phase::Idle), &tuning, 16.0, &blocked);
        let reeling = b.render(&state_in(Phase::Reeling), &tuning, 16.0, &blocked);
        assert_eq!(idle, reeling);
    }

    #[test]
    fn test_hud_follows_current_tuning() {
        let state = state_in(Phase::Reeling);
        let options = RenderOptions::default();
        let has_high = |frame: &Frame| {
            frame
                .vertices
                .iter()
                .any(|v| v.color == colors::TENSION_HIGH)
        };

        let mut r = renderer();
        let calm = r.render(&state, &Tuning::default(), 0.0, &options);
        assert!(!has_high(&calm));

        // Same renderer, retuned between frames
        let mut tuning = Tuning::default();
        tuning.reeling.tension_high_threshold = 40.0;
        tuning.reeling.fight_zone_min = 10.0;
        let mut r = renderer();
        let hot = r.render(&state, &tuning, 0.0, &options);
        assert!(has_high(&hot));
        assert_ne!(calm, hot);
    }

    #[test]
    fn test_line_only_when_out() {
        let mut r = renderer();
        let idle = paint(&mut r, Phase::Idle);
        let mut r = renderer();
        let cast = paint(&mut r, Phase::Casting);
        let mut r = renderer();
        let waiting = paint(&mut r, Phase::Waiting);
        // Idle adds a prompt overlay, casting adds nothing
        assert!(waiting.vertices.len() > cast.vertices.len());
        assert_ne!(idle.vertices.len(), cast.vertices.len());
    }

    #[test]
    fn test_frame_fills_surface_scene() {
        let mut r = renderer();
        let frame = paint(&mut r, Phase::Casting);
        assert_eq!(frame.size, (720, 1280));
        assert_eq!(frame.clear, colors::SKY);
        // Sky starts at the surface origin for an exact fit
        assert_eq!(frame.vertices[0].position, [0.0, 0.0]);
    }

    #[test]
    fn test_bobber_perspective() {
        let mut state = GameState::new(1);
        state.bobber_distance = 100.0;
        let (far, far_scale) = bobber_position(&state);
        assert_eq!(far.y, HORIZON_Y);
        assert_eq!(far_scale, 0.5);
        state.bobber_distance = 0.0;
        let (near, near_scale) = bobber_position(&state);
        assert_eq!(near.y, NEAR_Y);
        assert!((near_scale - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_rod_tip_upright() {
        let state = GameState::new(1);
        let tip = rod_tip(&state);
        assert!((tip.x - ROD_PIVOT_X).abs() < 1e-3);
        assert!((tip.y - (ROD_PIVOT_Y - ROD_LENGTH)).abs() < 1e-3);
    }

    #[test]
    fn test_tension_colors() {
        let hud = HudLimits::from_tuning(&Tuning::default());
        assert_eq!(hud.tension_color(10.0), colors::TENSION_LOW);
        assert_eq!(hud.tension_color(50.0), colors::TENSION_MED);
        assert_eq!(hud.tension_color(90.0), colors::TENSION_HIGH);
    }
}
