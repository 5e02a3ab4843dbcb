//! Feature processing: filter, decode, style, emit
//!
//! A feature passes a series of gates (object with `type: "Feature"`, geometry
//! object with a string `type`, array `coordinates`, caller filter, known
//! geometry type, decodable coordinates). Failing any gate drops the feature
//! without touching its siblings and without reporting anything.

use crate::Properties;
use crate::geometry::{Geometry, GeometryKind, PolygonRings};
use crate::primitives::{LatLng, Marker, PolygonShape, Polyline, Primitives};
use crate::style::{
    StyleDefaults, resolve_marker_style, resolve_polygon_style, resolve_stroke_style,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Builds primitives out of decoded geometry and the raw feature properties
///
/// Every method has a default body applying the simplestyle resolver with the
/// layer defaults. Implementors override the families they want to style
/// themselves and become fully responsible for those.
pub trait FeatureBuilder: Send + Sync {
    fn build_marker(
        &self,
        point: LatLng,
        properties: &Properties,
        defaults: &StyleDefaults,
    ) -> Marker {
        Marker {
            point,
            style: resolve_marker_style(properties, defaults),
        }
    }

    fn build_polyline(
        &self,
        points: Vec<LatLng>,
        properties: &Properties,
        defaults: &StyleDefaults,
    ) -> Polyline {
        Polyline {
            points,
            style: resolve_stroke_style(properties, defaults),
        }
    }

    fn build_polygon(
        &self,
        rings: PolygonRings,
        properties: &Properties,
        defaults: &StyleDefaults,
    ) -> PolygonShape {
        PolygonShape::new(rings, resolve_polygon_style(properties, defaults))
    }
}

/// The builder used when the caller does not supply one
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleStyleBuilder;

impl FeatureBuilder for SimpleStyleBuilder {}

/// Feature filter, called with the geometry `type` and the feature properties
pub type FeatureFilter = dyn Fn(&str, &Properties) -> bool + Send + Sync;

/// Configuration of how features turn into primitives
#[derive(Clone)]
pub struct LayerOptions {
    /// Style fallbacks
    pub defaults: StyleDefaults,
    /// Primitive construction
    pub builder: Arc<dyn FeatureBuilder>,
    /// Optional inclusion filter, applied before any geometry is decoded
    pub filter: Option<Arc<FeatureFilter>>,
}

impl LayerOptions {
    pub fn new(defaults: StyleDefaults) -> Self {
        Self {
            defaults,
            builder: Arc::new(SimpleStyleBuilder),
            filter: None,
        }
    }

    /// Replace the style defaults
    pub fn with_defaults(mut self, defaults: StyleDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Use a custom primitive builder
    pub fn with_builder(mut self, builder: impl FeatureBuilder + 'static) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// Only keep features for which `filter` returns `true`
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, &Properties) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self::new(StyleDefaults::default())
    }
}

impl fmt::Debug for LayerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerOptions")
            .field("defaults", &self.defaults)
            .field("filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

/// Turn one feature object into primitives
pub fn process_feature(feature: &Value, options: &LayerOptions) -> Primitives {
    let mut primitives = Primitives::default();
    process_feature_into(feature, options, &mut primitives);
    primitives
}

/// Like [`process_feature`], appending to an existing set of primitives
pub fn process_feature_into(feature: &Value, options: &LayerOptions, out: &mut Primitives) {
    let Some(feature) = feature.as_object() else {
        return;
    };
    if feature.get("type").and_then(Value::as_str) != Some("Feature") {
        return;
    }
    let Some(geometry) = feature.get("geometry").and_then(Value::as_object) else {
        return;
    };
    let Some(type_name) = geometry.get("type").and_then(Value::as_str) else {
        return;
    };
    let Some(coordinates) = geometry.get("coordinates").and_then(Value::as_array) else {
        return;
    };

    let no_properties = Properties::new();
    let properties = feature
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&no_properties);

    if options
        .filter
        .as_ref()
        .is_some_and(|filter| !filter(type_name, properties))
    {
        return;
    }

    let Some(geometry) =
        GeometryKind::from_type_name(type_name).and_then(|kind| Geometry::decode(kind, coordinates))
    else {
        return;
    };

    emit(geometry, properties, options, out);
}

fn emit(geometry: Geometry, properties: &Properties, options: &LayerOptions, out: &mut Primitives) {
    let builder = options.builder.as_ref();
    let defaults = &options.defaults;

    match geometry {
        Geometry::Point(point) => {
            out.markers
                .push(builder.build_marker(point, properties, defaults));
        }
        Geometry::MultiPoint(points) => out.markers.extend(
            points
                .into_iter()
                .map(|point| builder.build_marker(point, properties, defaults)),
        ),
        Geometry::LineString(points) => {
            out.polylines
                .push(builder.build_polyline(points, properties, defaults));
        }
        Geometry::MultiLineString(lines) => out.polylines.extend(
            lines
                .into_iter()
                .map(|points| builder.build_polyline(points, properties, defaults)),
        ),
        Geometry::Polygon(rings) => {
            out.polygons
                .push(builder.build_polygon(rings, properties, defaults));
        }
        Geometry::MultiPolygon(polygons) => out.polygons.extend(
            polygons
                .into_iter()
                .map(|rings| builder.build_polygon(rings, properties, defaults)),
        ),
    }
}
