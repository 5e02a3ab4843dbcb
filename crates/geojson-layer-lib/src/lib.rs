//! GeoJSON Layer Library - GeoJSON to styled map primitives
//!
//! This library turns GeoJSON documents (a `Feature` or a `FeatureCollection`)
//! into markers, polylines and polygons with holes, each carrying a style
//! resolved from the simplestyle properties of its feature. Individual features
//! that are malformed are skipped; only a root that is not GeoJSON at all is
//! reported as an error.
//!
//! # Architecture
//!
//! - **[`color`]**: Color tokens (hex and named colors)
//! - **[`style`]**: Style defaults profiles and the simplestyle resolver
//! - **[`geometry`]**: Lenient decoding of coordinate arrays into [`Geometry`]
//! - **[`FeatureBuilder`]**: Per-feature primitive construction, overridable
//! - **[`parse_document`]**: Root validation and feature iteration
//! - **[`LayerLoader`]**: Async (re)loading from a [`DataSource`] with
//!   last-write-wins snapshots
//!
//! # Example
//!
//! ```rust
//! use geojson_layer_lib::{LayerOptions, StyleDefaults, parse_str};
//!
//! let options = LayerOptions::new(StyleDefaults::LEAFLET)
//!     .with_filter(|geometry_type, _properties| geometry_type != "Point");
//!
//! let primitives = parse_str(
//!     r##"{"type": "Feature",
//!         "geometry": {"type": "LineString", "coordinates": [[24.7, 59.4], [24.8, 59.401]]},
//!         "properties": {"stroke": "#22e", "stroke-width": 11}}"##,
//!     &options,
//! )?;
//!
//! assert_eq!(primitives.polylines.len(), 1);
//! assert_eq!(primitives.polylines[0].style.width, 11.0);
//! # Ok::<(), geojson_layer_lib::LayerError>(())
//! ```

pub mod color;
mod document;
mod feature;
pub mod geometry;
mod loader;
mod primitives;
mod source;
pub mod style;

// Public API exports
pub use color::{Color, resolve_color};
pub use document::{parse_document, parse_str};
pub use feature::{
    FeatureBuilder, FeatureFilter, LayerOptions, SimpleStyleBuilder, process_feature,
    process_feature_into,
};
pub use geometry::{Geometry, GeometryKind, PolygonRings};
pub use loader::{LayerLoader, LayerSnapshot, LoadOutcome};
pub use primitives::{LatLng, Marker, PolygonShape, Polyline, PrimitiveSink, Primitives};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{DataSource, FileSource, MemorySource, SourceError};
pub use style::{MarkerStyle, PolygonStyle, StrokeStyle, StyleDefaults};

/// Feature properties, a JSON object
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Error types for loading a layer
///
/// Problems inside individual features are never errors; they only cause the
/// feature to be skipped.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a GeoJSON document: root is not an object")]
    NotAnObject,

    #[error("Not a GeoJSON document: root has no type")]
    MissingType,

    #[error("Unsupported GeoJSON root type: {0}")]
    UnsupportedType(String),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub type Result<T> = std::result::Result<T, LayerError>;
