//! Phase overlays
//!
//! Exactly one overlay is drawn per frame, picked by the snapshot's phase.
//! Everything here is in logical scene units.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::painter::{Align, Painter};
use super::scene::{HudLimits, bobber_position, wave};
use super::vertex::{colors, rarity_colors, with_alpha};
use crate::consts::{GAME_HEIGHT, GAME_WIDTH};
use crate::sim::{GameState, Phase};

// HUD layout
const TENSION_BAR_X: f32 = GAME_WIDTH - 50.0;
const TENSION_BAR_Y: f32 = 80.0;
const TENSION_BAR_W: f32 = 24.0;
const TENSION_BAR_H: f32 = 180.0;
const PROGRESS_BAR_X: f32 = 40.0;
const PROGRESS_BAR_Y: f32 = GAME_HEIGHT - 70.0;
const PROGRESS_BAR_W: f32 = GAME_WIDTH - 80.0;
const PROGRESS_BAR_H: f32 = 20.0;

const TITLE: f32 = 24.0;
const HEADING: f32 = 16.0;
const BODY: f32 = 12.0;
const SMALL: f32 = 9.0;

pub(super) fn draw(p: &mut Painter, state: &GameState, time: f64, hud: &HudLimits) {
    match state.phase {
        Phase::Idle => start_prompt(p, time),
        Phase::Casting => {}
        Phase::Waiting => waiting(p, time),
        Phase::Bite => bite(p, state, time, hud),
        Phase::Reeling => reeling(p, state, time, hud),
        Phase::Revealing => revealing(p, time),
        Phase::Caught => caught(p, state, time),
        Phase::Escaped => escaped(p, state, time),
    }
}

fn dim(p: &mut Painter, alpha: f32) {
    p.fill_rect(0.0, 0.0, GAME_WIDTH, GAME_HEIGHT, with_alpha(colors::SHADE, alpha));
}

fn dots(time: f64, period: f64) -> String {
    ".".repeat(((time / period) % 4.0) as usize)
}

/// Blinking "tap" hint shown once the result can be dismissed
fn dismiss_hint(p: &mut Painter, state: &GameState, time: f64, text: &str) {
    if state.can_dismiss() {
        let alpha = 0.5 + wave(time, 300.0) * 0.3;
        p.text(
            text,
            Vec2::new(GAME_WIDTH / 2.0, GAME_HEIGHT - 50.0),
            BODY,
            with_alpha(colors::WHITE, alpha),
            Align::Center,
        );
    }
}

pub(super) fn insufficient_balance(p: &mut Painter, time: f64) {
    dim(p, 0.7);
    let pulse = 1.0 + wave(time, 200.0) * 0.03;
    p.scoped(|p| {
        p.translate(Vec2::new(GAME_WIDTH / 2.0, GAME_HEIGHT * 0.45));
        p.scale(pulse);
        p.bordered_round_rect(-120.0, -70.0, 240.0, 140.0, 12.0, colors::WARNING_BOX, colors::WARNING_BORDER, 3.0);

        p.triangle(Vec2::new(0.0, -45.0), Vec2::new(-20.0, -15.0), Vec2::new(20.0, -15.0), colors::AMBER);
        p.text("!", Vec2::new(0.0, -24.0), BODY, colors::WARNING_MARK, Align::Center);

        p.text("INSUFFICIENT", Vec2::new(0.0, 10.0), HEADING, colors::WARNING_TEXT, Align::Center);
        p.text("BALANCE", Vec2::new(0.0, 32.0), HEADING, colors::WARNING_TEXT, Align::Center);
        p.text("Fund wallet to play", Vec2::new(0.0, 55.0), SMALL, colors::WARNING_SUBTEXT, Align::Center);
    });
}

fn start_prompt(p: &mut Painter, time: f64) {
    dim(p, 0.4);
    let pulse = 1.0 + wave(time, 300.0) * 0.05;
    p.scoped(|p| {
        p.translate(Vec2::new(GAME_WIDTH / 2.0, GAME_HEIGHT * 0.55));
        p.scale(pulse);
        p.text_shadowed("TAP TO CAST", Vec2::ZERO, TITLE, colors::TEXT, Align::Center);
        p.text(
            "Hold to reel in your catch",
            Vec2::new(0.0, 35.0),
            SMALL,
            with_alpha(colors::WHITE, 0.7),
            Align::Center,
        );
    });
}

fn waiting(p: &mut Painter, time: f64) {
    p.fill_round_rect(GAME_WIDTH / 2.0 - 60.0, 20.0, 120.0, 30.0, 8.0, with_alpha(colors::SHADE, 0.5));
    // Fixed left edge so the dots don't shift the word
    let label = format!("Waiting{}", dots(time, 500.0));
    p.text(&label, Vec2::new(GAME_WIDTH / 2.0 - 40.0, 35.0), BODY, colors::TEXT, Align::Left);
}

fn bite(p: &mut Painter, state: &GameState, time: f64, hud: &HudLimits) {
    let (bobber, _) = bobber_position(state);
    let pulse = 1.0 + wave(time, 80.0) * 0.15;
    p.scoped(|p| {
        p.translate(bobber - Vec2::new(0.0, 60.0));
        p.scale(pulse);
        p.fill_circle(Vec2::ZERO, 22.0, colors::GOLD);
        p.text("TAP!", Vec2::ZERO, BODY, colors::BLACK, Align::Center);
    });

    let (w, h) = (100.0, 8.0);
    let x = GAME_WIDTH / 2.0 - w / 2.0;
    let y = GAME_HEIGHT * 0.85;
    let remaining = if hud.bite_window_ms > 0.0 {
        (state.bite_timer / hud.bite_window_ms).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.fill_round_rect(x - 5.0, y - 5.0, w + 10.0, h + 10.0, 5.0, with_alpha(colors::SHADE, 0.5));
    p.fill_round_rect(x, y, w * remaining, h, 3.0, colors::GOLD);
}

fn reeling(p: &mut Painter, state: &GameState, time: f64, hud: &HudLimits) {
    let (x, y, w, h) = (TENSION_BAR_X, TENSION_BAR_Y, TENSION_BAR_W, TENSION_BAR_H);
    let in_zone = hud.in_zone(state.tension);

    p.fill_round_rect(x - 3.0, y - 3.0, w + 6.0, h + 6.0, 4.0, colors::PROGRESS_BG);
    // Danger band
    p.fill_rect(x, y, w, h * 0.3, with_alpha(colors::TENSION_HIGH, 0.3));

    if state.fish_is_fighting {
        let zone_bottom = y + h - (hud.zone_min / 100.0) * h;
        let zone_top = y + h - (hud.zone_max / 100.0) * h;
        let glow = 0.3 + wave(time, 150.0) * 0.15;
        let tint = if in_zone { colors::TENSION_LOW } else { colors::ORANGE };
        p.fill_rect(x, zone_top, w, zone_bottom - zone_top, with_alpha(tint, glow));
        for edge in [zone_top, zone_bottom] {
            p.dashed_line(Vec2::new(x - 5.0, edge), Vec2::new(x + w + 5.0, edge), 4.0, 4.0, 2.0, tint);
        }
        p.text("ZONE", Vec2::new(x - 8.0, (zone_top + zone_bottom) / 2.0), 6.0, tint, Align::Right);
    }

    let fill = (state.tension / 100.0) * h;
    p.fill_rect(x, y + h - fill, w, fill, hud.tension_color(state.tension));

    let border = if state.fish_is_fighting && wave(time, 60.0) > 0.0 {
        colors::ORANGE
    } else {
        colors::WHITE
    };
    p.stroke_rect(x, y, w, h, 2.0, border);

    p.scoped(|p| {
        p.translate(Vec2::new(x - 8.0, y + h / 2.0));
        p.rotate(-PI / 2.0);
        p.text("TENSION", Vec2::ZERO, 7.0, colors::TEXT, Align::Center);
    });

    let (px, py, pw, ph) = (PROGRESS_BAR_X, PROGRESS_BAR_Y, PROGRESS_BAR_W, PROGRESS_BAR_H);
    p.fill_round_rect(px - 3.0, py - 3.0, pw + 6.0, ph + 6.0, 4.0, colors::PROGRESS_BG);
    let progress = (state.progress / 100.0) * pw;
    p.fill_rect(px, py, progress, ph, colors::PROGRESS_BAR);
    p.stroke_rect(px, py, pw, ph, 2.0, colors::WHITE);

    // The catch stays a mystery until the reveal
    let fish = Vec2::new(px + progress + 20.0, py + ph / 2.0);
    p.fill_ellipse(fish, Vec2::new(12.0, 8.0), 0.0, colors::MYSTERY);
    p.triangle(
        fish + Vec2::new(10.0, 0.0),
        fish + Vec2::new(18.0, -6.0),
        fish + Vec2::new(18.0, 6.0),
        colors::MYSTERY,
    );
    p.text("?", fish - Vec2::new(2.0, 0.0), 7.0, colors::MYSTERY_MARK, Align::Center);

    if state.fish_is_fighting {
        let pulse = 1.0 + wave(time, 80.0) * 0.1;
        p.scoped(|p| {
            p.translate(Vec2::new(GAME_WIDTH / 2.0, 50.0));
            p.scale(pulse);
            p.fill_round_rect(-50.0, -15.0, 100.0, 30.0, 8.0, colors::ORANGE);
            p.text("FIGHTING!", Vec2::ZERO, BODY, colors::BLACK, Align::Center);
        });
    }

    let (hint, color) = if !state.fish_is_fighting {
        ("HOLD to reel • RELEASE to ease", with_alpha(colors::WHITE, 0.8))
    } else if in_zone {
        ("Keep it steady!", colors::TENSION_LOW)
    } else {
        ("Get tension in the ZONE!", colors::ORANGE)
    };
    p.text(hint, Vec2::new(GAME_WIDTH / 2.0, GAME_HEIGHT - 30.0), SMALL, color, Align::Center);
}

fn revealing(p: &mut Painter, time: f64) {
    dim(p, 0.7);
    let center = Vec2::new(GAME_WIDTH / 2.0, GAME_HEIGHT * 0.4);
    let pulse = 1.0 + wave(time, 150.0) * 0.05;
    p.scoped(|p| {
        p.translate(center);
        p.scale(pulse);
        p.text_shadowed("STOP CLICKING!", Vec2::new(0.0, -40.0), TITLE * 0.9, colors::AMBER, Align::Center);

        // Raised palm
        p.stroke_circle(Vec2::new(0.0, 20.0), 30.0, 3.0, colors::AMBER);
        p.fill_round_rect(-10.0, 16.0, 20.0, 18.0, 5.0, colors::AMBER);
        for (i, height) in [14.0, 18.0, 17.0, 13.0].into_iter().enumerate() {
            let fx = -10.0 + i as f32 * 5.5;
            p.fill_round_rect(fx, 18.0 - height, 4.0, height, 2.0, colors::AMBER);
        }
        p.fill_ellipse(Vec2::new(-13.0, 24.0), Vec2::new(3.0, 7.0), -0.6, colors::AMBER);
    });

    let label = format!("Wallet prompt incoming{}", dots(time, 400.0));
    p.text(&label, center + Vec2::new(0.0, 80.0), BODY, with_alpha(colors::WHITE, 0.8), Align::Center);
    p.text(
        "Sign to reveal your catch",
        center + Vec2::new(0.0, 105.0),
        SMALL,
        with_alpha(colors::WHITE, 0.5),
        Align::Center,
    );
}

fn caught(p: &mut Painter, state: &GameState, time: f64) {
    let Some(fish) = &state.last_catch else {
        return;
    };
    dim(p, 0.6);

    let cx = GAME_WIDTH / 2.0;
    let fy = state.caught_fish_y;
    let (body, back, glow) = rarity_colors(fish.rarity);
    let size = fish.size.min(80) as f32;

    p.scoped(|p| {
        p.translate(Vec2::new(cx, fy));
        if let Some(glow) = glow {
            let pulse = 1.0 + wave(time, 200.0) * 0.2;
            p.fill_ellipse(Vec2::ZERO, Vec2::new(size * 1.5, size) * pulse, 0.0, with_alpha(glow, 0.25));
        }
        p.fill_ellipse(Vec2::ZERO, Vec2::new(size, size * 0.6), 0.0, body);
        p.fill_ellipse_arc(Vec2::ZERO, Vec2::new(size, size * 0.6), 0.0, PI, TAU, back);
        p.triangle(
            Vec2::new(size * 0.8, 0.0),
            Vec2::new(size * 1.4, -size * 0.5),
            Vec2::new(size * 1.4, size * 0.5),
            body,
        );
        p.triangle(
            Vec2::new(-size * 0.2, -size * 0.55),
            Vec2::new(size * 0.3, -size * 0.55),
            Vec2::new(size * 0.1, -size * 0.9),
            back,
        );
        for i in 0..3 {
            let sx = -size * 0.3 + i as f32 * size * 0.3;
            p.stroke_arc(Vec2::new(sx, 0.0), size * 0.25, -0.5, 0.5, 1.0, with_alpha(back, 0.5));
        }
        let eye = Vec2::new(-size * 0.55, -size * 0.1);
        p.fill_circle(eye, size * 0.15, colors::WHITE);
        p.fill_circle(eye, size * 0.08, colors::BLACK);
    });

    p.text_shadowed("NICE CATCH!", Vec2::new(cx, fy - 100.0), TITLE, colors::TENSION_LOW, Align::Center);

    p.fill_round_rect(cx - 50.0, fy + 70.0, 100.0, 25.0, 5.0, body);
    p.text(fish.rarity.as_str(), Vec2::new(cx, fy + 82.5), BODY, colors::BLACK, Align::Center);
    p.text(&fish.name, Vec2::new(cx, fy + 115.0), HEADING, colors::TEXT, Align::Center);
    p.text(
        &format!("{} cm", fish.size),
        Vec2::new(cx, fy + 140.0),
        BODY,
        with_alpha(colors::WHITE, 0.7),
        Align::Center,
    );

    if let Some(payout) = state.last_payout {
        let (label, color) = if payout > 0 {
            (format!("+{payout}"), colors::TENSION_LOW)
        } else {
            (format!("-{}", state.session.stake), colors::TENSION_HIGH)
        };
        p.text(&label, Vec2::new(cx, fy + 175.0), TITLE * 0.8, color, Align::Center);
    }

    dismiss_hint(p, state, time, "Tap to continue");
}

fn escaped(p: &mut Painter, state: &GameState, time: f64) {
    dim(p, 0.6);
    let center = Vec2::new(GAME_WIDTH / 2.0, GAME_HEIGHT * 0.4);
    p.text_shadowed("IT GOT AWAY!", center, TITLE, colors::TENSION_HIGH, Align::Center);
    p.text(
        "Watch your tension!",
        center + Vec2::new(0.0, 40.0),
        BODY,
        with_alpha(colors::WHITE, 0.7),
        Align::Center,
    );
    if !state.session.practice_mode && state.session.stake > 0 {
        p.text(
            &format!("-{}", state.session.stake),
            center + Vec2::new(0.0, 80.0),
            TITLE * 0.8,
            colors::TENSION_HIGH,
            Align::Center,
        );
    }
    dismiss_hint(p, state, time, "Tap to try again");
}
