use crate::config::Color;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, Blend};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Paints an opaque background for the frame at time `t` (seconds).
pub trait BackgroundPainter: Send {
    fn name(&self) -> &str;
    fn paint(&self, frame: &mut RgbaImage, t: f64);
}

pub struct Solid {
    pub color: Color,
}

impl BackgroundPainter for Solid {
    fn name(&self) -> &str {
        "solid"
    }

    fn paint(&self, frame: &mut RgbaImage, _t: f64) {
        let [r, g, b, _] = self.color.0;
        for px in frame.pixels_mut() {
            *px = Rgba([r, g, b, 255]);
        }
    }
}

/// Vertical two-color gradient whose midpoint drifts slowly up and down.
pub struct Gradient {
    pub top: Color,
    pub bottom: Color,
    /// Drift cycles per second.
    pub speed: f64,
}

impl BackgroundPainter for Gradient {
    fn name(&self) -> &str {
        "gradient"
    }

    fn paint(&self, frame: &mut RgbaImage, t: f64) {
        let height = f64::from(frame.height().max(1));
        let phase = TAU * self.speed * t;
        for (y, row) in frame.rows_mut().enumerate() {
            let pos = y as f64 / height;
            let mix = (pos + 0.12 * (phase + pos * std::f64::consts::PI).sin()).clamp(0.0, 1.0);
            let px = Rgba(lerp(self.top, self.bottom, mix));
            for dst in row {
                *dst = px;
            }
        }
    }
}

struct Orb {
    x: f64,
    y: f64,
    radius: f64,
    speed: f64,
    sway: f64,
    phase: f64,
    alpha: u8,
}

/// Soft translucent circles rising over a flat base color.
pub struct Orbs {
    base: Solid,
    color: Color,
    orbs: Vec<Orb>,
}

impl Orbs {
    pub fn new(width: u32, height: u32, base: Color, color: Color, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let (w, h) = (f64::from(width), f64::from(height));
        let orbs = (0..count)
            .map(|_| Orb {
                x: rng.gen_range(0.0..w.max(1.0)),
                y: rng.gen_range(0.0..h.max(1.0)),
                radius: rng.gen_range(h * 0.02..h * 0.08 + 1.0),
                speed: rng.gen_range(h * 0.01..h * 0.06 + 1.0),
                sway: rng.gen_range(0.0..w * 0.04 + 1.0),
                phase: rng.gen_range(0.0..TAU),
                alpha: rng.gen_range(30..110),
            })
            .collect();

        Self {
            base: Solid { color: base },
            color,
            orbs,
        }
    }
}

impl BackgroundPainter for Orbs {
    fn name(&self) -> &str {
        "orbs"
    }

    fn paint(&self, frame: &mut RgbaImage, t: f64) {
        self.base.paint(frame, t);

        let h = f64::from(frame.height());
        let [r, g, b, _] = self.color.0;
        let mut canvas = Blend(std::mem::take(frame));
        for orb in &self.orbs {
            let span = h + orb.radius * 2.0;
            let y = (orb.y - orb.speed * t).rem_euclid(span) - orb.radius;
            let x = orb.x + orb.sway * (t * 0.7 + orb.phase).sin();
            draw_filled_circle_mut(
                &mut canvas,
                (x.round() as i32, y.round() as i32),
                orb.radius.round() as i32,
                Rgba([r, g, b, orb.alpha]),
            );
        }
        *frame = canvas.0;
    }
}

fn lerp(a: Color, b: Color, t: f64) -> [u8; 4] {
    let mut out = [255u8; 4];
    for c in 0..3 {
        let v = f64::from(a.0[c]) + (f64::from(b.0[c]) - f64::from(a.0[c])) * t;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_fills_every_pixel_opaque() {
        let mut frame = RgbaImage::new(4, 3);
        Solid {
            color: Color::rgb(15, 15, 15),
        }
        .paint(&mut frame, 0.0);
        assert!(frame.pixels().all(|px| px.0 == [15, 15, 15, 255]));
    }

    #[test]
    fn gradient_runs_from_top_to_bottom() {
        let mut frame = RgbaImage::new(2, 100);
        Gradient {
            top: Color::rgb(0, 0, 0),
            bottom: Color::rgb(200, 200, 200),
            speed: 0.0,
        }
        .paint(&mut frame, 0.0);
        let top = frame.get_pixel(0, 0).0[0];
        let bottom = frame.get_pixel(0, 99).0[0];
        assert!(top < bottom);
        assert!(frame.pixels().all(|px| px.0[3] == 255));
    }

    #[test]
    fn orbs_are_deterministic_for_a_seed() {
        let painter_a = Orbs::new(64, 64, Color::rgb(0, 0, 0), Color::white(), 5, 7);
        let painter_b = Orbs::new(64, 64, Color::rgb(0, 0, 0), Color::white(), 5, 7);
        let mut a = RgbaImage::new(64, 64);
        let mut b = RgbaImage::new(64, 64);
        painter_a.paint(&mut a, 1.5);
        painter_b.paint(&mut b, 1.5);
        assert_eq!(a, b);
        assert!(a.pixels().all(|px| px.0[3] == 255));
    }
}
