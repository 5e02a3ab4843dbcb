//! Style resolution from simplestyle feature properties
//!
//! Only a fixed subset of the simplestyle properties is recognized:
//! `marker-color`, `marker-size`, `stroke`, `stroke-opacity`, `stroke-width`,
//! `fill` and `fill-opacity`. Anything missing or unparsable falls back to a
//! [`StyleDefaults`] profile. Resolution never fails.

use crate::Properties;
use crate::color::{Color, resolve_color};
use serde_json::Value;
use std::borrow::Cow;

/// Marker size in pixels for `marker-size: small`
pub const MARKER_SIZE_SMALL: f64 = 20.0;
/// Marker size in pixels for `marker-size: medium`
pub const MARKER_SIZE_MEDIUM: f64 = 36.0;
/// Marker size in pixels for `marker-size: large`
pub const MARKER_SIZE_LARGE: f64 = 48.0;

/// Baseline values used when a feature does not style itself
#[derive(Clone, Debug, PartialEq)]
pub struct StyleDefaults {
    pub marker_color: Color,
    /// One of `small`, `medium` or `large`
    pub marker_size: Cow<'static, str>,
    pub stroke_color: Color,
    pub stroke_opacity: f64,
    pub stroke_width: f64,
    pub fill_color: Color,
    pub fill_opacity: f64,
}

impl StyleDefaults {
    /// Defaults published with simplestyle 1.1
    pub const INITIAL: StyleDefaults = StyleDefaults {
        marker_color: Color::from_rgb(0x7e, 0x7e, 0x7e),
        marker_size: Cow::Borrowed("medium"),
        stroke_color: Color::from_rgb(0x55, 0x55, 0x55),
        stroke_opacity: 1.0,
        stroke_width: 2.0,
        fill_color: Color::from_rgb(0x55, 0x55, 0x55),
        fill_opacity: 0.6,
    };

    /// Defaults matching the Leaflet vector layer look
    pub const LEAFLET: StyleDefaults = StyleDefaults {
        marker_color: Color::from_rgb(0x33, 0x88, 0xff),
        marker_size: Cow::Borrowed("medium"),
        stroke_color: Color::from_rgb(0x33, 0x88, 0xff),
        stroke_opacity: 1.0,
        stroke_width: 3.0,
        fill_color: Color::from_rgb(0x33, 0x88, 0xff),
        fill_opacity: 0.2,
    };

    /// Look up a built-in profile by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "initial" | "simplestyle" => Some(Self::INITIAL),
            "leaflet" => Some(Self::LEAFLET),
            _ => None,
        }
    }
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Resolved style of a marker
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarkerStyle {
    pub color: Color,
    /// Size in pixels
    pub size: f64,
}

/// Resolved style of a line or polygon border
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StrokeStyle {
    /// Color with the resolved opacity in its alpha channel
    pub color: Color,
    pub width: f64,
}

/// Resolved style of a polygon
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PolygonStyle {
    /// `None` when the polygon has no fill (`fill-opacity: 0`)
    pub fill: Option<Color>,
    pub stroke: StrokeStyle,
}

/// Map a `marker-size` category to pixels
pub fn marker_size_pixels(category: &str) -> Option<f64> {
    match category {
        "small" => Some(MARKER_SIZE_SMALL),
        "medium" => Some(MARKER_SIZE_MEDIUM),
        "large" => Some(MARKER_SIZE_LARGE),
        _ => None,
    }
}

/// Coerce a raw property value to a number
///
/// Numbers are taken as is, strings are parsed as floats independently of the
/// locale. Everything else means "use the default".
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Read a numeric property
pub fn number_property(properties: &Properties, key: &str) -> Option<f64> {
    properties.get(key).and_then(coerce_number)
}

/// Read a color property
pub fn color_property(properties: &Properties, key: &str) -> Option<Color> {
    properties
        .get(key)
        .and_then(Value::as_str)
        .and_then(resolve_color)
}

/// Read an opacity property, only accepting values in `[0, 1]`
fn opacity_property(properties: &Properties, key: &str) -> Option<f64> {
    number_property(properties, key).filter(|o| (0.0..=1.0).contains(o))
}

/// Apply an opacity to a resolved color
///
/// An explicit opacity always wins. Without one, the default opacity is only
/// applied to opaque colors so a translucent color token keeps its own alpha.
fn apply_opacity(color: Color, opacity: Option<f64>, default_opacity: f64) -> Color {
    match opacity {
        Some(opacity) => color.with_opacity(opacity),
        None if color.is_opaque() => color.with_opacity(default_opacity),
        None => color,
    }
}

/// Resolve the style of a point feature
pub fn resolve_marker_style(properties: &Properties, defaults: &StyleDefaults) -> MarkerStyle {
    let color = color_property(properties, "marker-color").unwrap_or(defaults.marker_color);
    let size = properties
        .get("marker-size")
        .and_then(Value::as_str)
        .and_then(marker_size_pixels)
        .or_else(|| marker_size_pixels(&defaults.marker_size))
        .unwrap_or(MARKER_SIZE_MEDIUM);

    MarkerStyle { color, size }
}

/// Resolve the style of a line feature, also used for polygon borders
pub fn resolve_stroke_style(properties: &Properties, defaults: &StyleDefaults) -> StrokeStyle {
    let color = color_property(properties, "stroke").unwrap_or(defaults.stroke_color);
    let opacity = opacity_property(properties, "stroke-opacity");
    let width = number_property(properties, "stroke-width").unwrap_or(defaults.stroke_width);

    StrokeStyle {
        color: apply_opacity(color, opacity, defaults.stroke_opacity),
        width,
    }
}

/// Resolve the style of a polygon feature
pub fn resolve_polygon_style(properties: &Properties, defaults: &StyleDefaults) -> PolygonStyle {
    let stroke = resolve_stroke_style(properties, defaults);

    let opacity = opacity_property(properties, "fill-opacity");
    if opacity == Some(0.0) {
        return PolygonStyle { fill: None, stroke };
    }

    let color = color_property(properties, "fill").unwrap_or(defaults.fill_color);
    PolygonStyle {
        fill: Some(apply_opacity(color, opacity, defaults.fill_opacity)),
        stroke,
    }
}
