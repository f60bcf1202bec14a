//! Geometry events from the device stream.
//!
//! The firmware side reports strip layout as JSON objects such as
//!
//! ```json
//! {"event": "set_canvas_map", "strip_id": 0, "map": [[0, 0], [1, 0]], "diameter": 0.2}
//! ```
//!
//! `map` may also be given column-wise as `{"x": [...], "y": [...]}`.

use std::io::BufRead;

use serde::Deserialize;

use crate::coords::Vec2;
use crate::error::{CompositeError, CompositeResult};
use crate::screen_map::StripId;

/// Decoded strip event.
#[derive(Debug, Clone, PartialEq)]
pub enum StripEvent {
    /// Declares (or replaces) the geometry of one strip.
    SetCanvasMap {
        strip_id: StripId,
        map: Vec<Vec2>,
        diameter: Option<f32>,
    },
    /// Any other event name; hosts log and ignore it.
    Unsupported(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    strip_id: Option<StripId>,
    #[serde(default)]
    map: Option<RawMap>,
    #[serde(default)]
    diameter: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMap {
    Points(Vec<[f32; 2]>),
    Columns { x: Vec<f32>, y: Vec<f32> },
}

impl RawMap {
    fn into_points(self) -> CompositeResult<Vec<Vec2>> {
        match self {
            RawMap::Points(points) => Ok(points.into_iter().map(Vec2::from).collect()),
            RawMap::Columns { x, y } => {
                if x.len() != y.len() {
                    return Err(CompositeError::invalid_event(format!(
                        "map columns differ in length ({} x values, {} y values)",
                        x.len(),
                        y.len()
                    )));
                }
                Ok(x.into_iter().zip(y).map(|(x, y)| Vec2::new(x, y)).collect())
            }
        }
    }
}

impl StripEvent {
    pub const SET_CANVAS_MAP: &'static str = "set_canvas_map";

    /// Parses one JSON event.
    pub fn from_json(json: &str) -> CompositeResult<Self> {
        let raw: RawEvent = serde_json::from_str(json)
            .map_err(|e| CompositeError::invalid_event(e.to_string()))?;

        if raw.event != Self::SET_CANVAS_MAP {
            return Ok(StripEvent::Unsupported(raw.event));
        }

        let strip_id = raw.strip_id.ok_or_else(|| {
            CompositeError::invalid_event("strip_id is required for set_canvas_map event")
        })?;
        let map = raw
            .map
            .ok_or_else(|| CompositeError::invalid_event("map is required for set_canvas_map event"))?
            .into_points()?;

        Ok(StripEvent::SetCanvasMap {
            strip_id,
            map,
            diameter: raw.diameter,
        })
    }

    /// Reads one event per line. Blank lines and lines starting with `#` are skipped.
    pub fn read_lines(reader: impl BufRead) -> anyhow::Result<Vec<StripEvent>> {
        let mut events = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let event = StripEvent::from_json(trimmed)
                .map_err(|e| anyhow::anyhow!("line {}: {e}", lineno + 1))?;
            events.push(event);
        }
        Ok(events)
    }
}
