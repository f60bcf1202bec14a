use std::f32::consts::TAU;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use ledscope_engine::coords::Vec2;
use ledscope_engine::events::StripEvent;
use ledscope_engine::frame::Rgb;

use crate::cli::DemoLayout;

/// Geometry events for a built-in layout.
pub fn layout_events(layout: DemoLayout) -> Vec<StripEvent> {
    match layout {
        DemoLayout::Grid => (0..8)
            .map(|row| {
                let y = row as f32;
                let map = (0..32)
                    .map(|col| {
                        // serpentine wiring
                        let x = if row % 2 == 0 { col } else { 31 - col };
                        Vec2::new(x as f32, y)
                    })
                    .collect();
                StripEvent::SetCanvasMap {
                    strip_id: row,
                    map,
                    diameter: None,
                }
            })
            .collect(),
        DemoLayout::Ring => [(24, 8.0), (36, 12.0), (48, 16.0)]
            .into_iter()
            .enumerate()
            .map(|(id, (count, radius))| StripEvent::SetCanvasMap {
                strip_id: id as i32,
                map: ring(count, radius, Vec2::new(16.0, 16.0)),
                diameter: Some(0.8),
            })
            .collect(),
        DemoLayout::Strip => vec![StripEvent::SetCanvasMap {
            strip_id: 0,
            map: (0..60).map(|i| Vec2::new(i as f32, 0.0)).collect(),
            diameter: None,
        }],
    }
}

fn ring(count: usize, radius: f32, center: Vec2) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let a = TAU * i as f32 / count as f32;
            center + Vec2::new(a.cos(), a.sin()) * radius
        })
        .collect()
}

/// Reads geometry events from a JSON-lines file.
pub fn load_events(path: &Path) -> anyhow::Result<Vec<StripEvent>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    StripEvent::read_lines(BufReader::new(file))
        .with_context(|| format!("failed to read strip events from {}", path.display()))
}

/// Moving rainbow: hue advances along each strip and over time.
#[derive(Debug, Clone)]
pub struct Rainbow {
    /// Hue cycles per second.
    pub speed: f32,
    /// Strip offset in hue turns.
    pub strip_phase: f32,
}

impl Default for Rainbow {
    fn default() -> Self {
        Self {
            speed: 0.2,
            strip_phase: 0.07,
        }
    }
}

impl Rainbow {
    /// RGB bytes for `len` pixels of `strip_id` at `t` seconds.
    pub fn fill(&self, strip_id: i32, len: usize, t: f32, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(len * 3);
        for i in 0..len {
            let hue = i as f32 / len.max(1) as f32 + t * self.speed + strip_id as f32 * self.strip_phase;
            let c = hsv_to_rgb(hue.rem_euclid(1.0), 1.0, 1.0);
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
    }
}

/// `h`, `s`, `v` in `[0, 1]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h6 = h * 6.0;
    let sector = h6.floor() as i32 % 6;
    let f = h6 - h6.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let byte = |x: f32| (x * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(byte(r), byte(g), byte(b))
}
