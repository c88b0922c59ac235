//! Raw attribute value semantics shared by the tabular and GraphML encoders.

use crate::config::ExportOptions;
use serde_json::Value;

/// Whether a captured value counts as set: not null, `false`, zero, NaN or empty text.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a value: strings verbatim, null empty, everything else JSON-rendered.
///
/// Floats go through `f64`'s own formatting so that integral values such as
/// `2.0` render as `2`, matching the `int` key inferred for them.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Whether a categorical selection (a list, or a single value) includes `option`.
pub fn selection_includes(selection: &Value, option: &Value) -> bool {
    match selection {
        Value::Null => false,
        Value::Array(values) => values.iter().any(|v| v == option),
        single => single == option,
    }
}

/// A 2-D layout coordinate.
///
/// Captured coordinates are normalized to the unit square with the origin at
/// the bottom left; screen space has its origin at the top left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    /// Read `{ "x": .., "y": .. }`; anything else has no position.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            x: object.get("x")?.as_f64()?,
            y: object.get("y")?.as_f64()?,
        })
    }

    pub fn to_screen(self, width: f64, height: f64) -> Self {
        Self {
            x: self.x * width,
            y: (1.0 - self.y) * height,
        }
    }

    /// Denormalize into pixel space when the options ask for it.
    pub fn project(self, options: &ExportOptions) -> Self {
        if options.use_screen_layout_coordinates {
            self.to_screen(options.screen_layout_width, options.screen_layout_height)
        } else {
            self
        }
    }
}
