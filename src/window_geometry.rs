use serde::Serialize;
use serde_json::Value;

use crate::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

/// Position and size of a surface, in logical pixels.
///
/// A missing `x`/`y` lets the host pick the placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowGeometry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    pub width: u32,
    pub height: u32,
}

impl WindowGeometry {
    pub fn new(x: Option<i32>, y: Option<i32>, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn default_size(width: u32, height: u32) -> Self {
        Self::new(None, None, width, height)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.x.is_some() == self.y.is_some()
    }

    pub fn to_value(&self) -> Result<Value, String> {
        serde_json::to_value(self)
            .map_err(|error| format!("Failed to serialize window geometry: {error}"))
    }
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self::default_size(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT)
    }
}

/// Parses a persisted geometry value; anything malformed is treated as absent.
///
/// Read field by field rather than through serde so fractional values written
/// by other tools are rounded instead of rejected.
pub fn parse_persisted_geometry(value: &Value) -> Option<WindowGeometry> {
    let object = value.as_object()?;
    let width = positive_dimension(object.get("width")?)?;
    let height = positive_dimension(object.get("height")?)?;
    let x = optional_coordinate(object.get("x"))?;
    let y = optional_coordinate(object.get("y"))?;

    let geometry = WindowGeometry::new(x, y, width, height);
    geometry.is_valid().then_some(geometry)
}

fn positive_dimension(value: &Value) -> Option<u32> {
    let raw = value.as_f64()?;
    if !raw.is_finite() || raw < 1.0 || raw > u32::MAX as f64 {
        return None;
    }
    Some(raw.round() as u32)
}

// Outer `None` means malformed, inner `None` means absent.
fn optional_coordinate(value: Option<&Value>) -> Option<Option<i32>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(value) => {
            let raw = value.as_f64()?;
            if !raw.is_finite() || raw < i32::MIN as f64 || raw > i32::MAX as f64 {
                return None;
            }
            Some(Some(raw.round() as i32))
        }
    }
}

/// Merges geometry layers: persisted values win over defaults, an explicit
/// override wins over both.
pub fn resolve_window_geometry(
    defaults: WindowGeometry,
    persisted: Option<WindowGeometry>,
    geometry_override: Option<WindowGeometry>,
) -> WindowGeometry {
    geometry_override.or(persisted).unwrap_or(defaults)
}
