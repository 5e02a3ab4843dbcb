//! Geometry decoding from raw GeoJSON coordinate arrays
//!
//! Decoding is lenient: malformed coordinates inside a line or ring are dropped,
//! malformed elements of a multi-geometry are dropped, and only when what is
//! left cannot form the geometry does the decode yield `None`.

use crate::primitives::LatLng;
use serde_json::Value;

/// Minimum number of valid points of a line string
pub const MIN_LINE_POINTS: usize = 2;
/// Minimum number of valid points of a polygon ring
pub const MIN_RING_POINTS: usize = 3;

/// Rings of a decoded polygon
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonRings {
    pub outer: Vec<LatLng>,
    pub holes: Vec<Vec<LatLng>>,
}

/// The geometry types this crate knows how to draw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(Self::Point),
            "MultiPoint" => Some(Self::MultiPoint),
            "LineString" => Some(Self::LineString),
            "MultiLineString" => Some(Self::MultiLineString),
            "Polygon" => Some(Self::Polygon),
            "MultiPolygon" => Some(Self::MultiPolygon),
            _ => None,
        }
    }

    /// The GeoJSON `type` string
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::MultiPoint => "MultiPoint",
            Self::LineString => "LineString",
            Self::MultiLineString => "MultiLineString",
            Self::Polygon => "Polygon",
            Self::MultiPolygon => "MultiPolygon",
        }
    }
}

/// A decoded geometry with validated coordinates
///
/// Multi-geometries only hold the elements that decoded successfully and may
/// therefore be empty.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(LatLng),
    MultiPoint(Vec<LatLng>),
    LineString(Vec<LatLng>),
    MultiLineString(Vec<Vec<LatLng>>),
    Polygon(PolygonRings),
    MultiPolygon(Vec<PolygonRings>),
}

impl Geometry {
    /// Decode the `coordinates` member of a geometry of the given kind
    pub fn decode(kind: GeometryKind, coordinates: &[Value]) -> Option<Self> {
        match kind {
            GeometryKind::Point => decode_position(coordinates).map(Self::Point),
            GeometryKind::MultiPoint => Some(Self::MultiPoint(
                coordinates.iter().filter_map(decode_coordinate).collect(),
            )),
            GeometryKind::LineString => decode_positions(coordinates, MIN_LINE_POINTS)
                .map(Self::LineString),
            GeometryKind::MultiLineString => Some(Self::MultiLineString(
                coordinates.iter().filter_map(decode_line_string).collect(),
            )),
            GeometryKind::Polygon => decode_rings(coordinates).map(Self::Polygon),
            GeometryKind::MultiPolygon => Some(Self::MultiPolygon(
                coordinates.iter().filter_map(decode_polygon_rings).collect(),
            )),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::MultiPoint(_) => GeometryKind::MultiPoint,
            Self::LineString(_) => GeometryKind::LineString,
            Self::MultiLineString(_) => GeometryKind::MultiLineString,
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }
}

/// Decode a `[longitude, latitude, ...]` position
///
/// Requires at least two numbers; further entries such as elevation are ignored.
pub fn decode_coordinate(raw: &Value) -> Option<LatLng> {
    decode_position(raw.as_array()?)
}

fn decode_position(position: &[Value]) -> Option<LatLng> {
    match position {
        [lng, lat, ..] => Some(LatLng::new(lat.as_f64()?, lng.as_f64()?)),
        _ => None,
    }
}

fn decode_positions(positions: &[Value], min_points: usize) -> Option<Vec<LatLng>> {
    let points: Vec<LatLng> = positions.iter().filter_map(decode_coordinate).collect();
    (points.len() >= min_points).then_some(points)
}

/// Decode a line string, requiring at least two valid points
pub fn decode_line_string(raw: &Value) -> Option<Vec<LatLng>> {
    decode_positions(raw.as_array()?, MIN_LINE_POINTS)
}

/// Decode a polygon ring, requiring at least three valid points
pub fn decode_ring(raw: &Value) -> Option<Vec<LatLng>> {
    decode_positions(raw.as_array()?, MIN_RING_POINTS)
}

/// Decode the rings of a polygon
///
/// The first ring is the outer boundary and must decode, otherwise the whole
/// polygon is rejected. Every following ring is a hole; holes that fail to
/// decode are left out.
pub fn decode_polygon_rings(raw: &Value) -> Option<PolygonRings> {
    decode_rings(raw.as_array()?)
}

fn decode_rings(rings: &[Value]) -> Option<PolygonRings> {
    let (outer, holes) = rings.split_first()?;
    Some(PolygonRings {
        outer: decode_ring(outer)?,
        holes: holes.iter().filter_map(decode_ring).collect(),
    })
}
