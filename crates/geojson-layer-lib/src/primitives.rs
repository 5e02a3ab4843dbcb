//! Drawable primitives produced from GeoJSON features
//!
//! Primitives carry geographic positions in (latitude, longitude) order and an
//! already resolved style. Nothing here knows about screen space; drawing is
//! the job of a [`PrimitiveSink`].

use crate::geometry::PolygonRings;
use crate::style::{MarkerStyle, PolygonStyle, StrokeStyle};
use geo::ChamberlainDuquetteArea;

/// A WGS84 position in (latitude, longitude) order
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for geo::Coord<f64> {
    /// `x` is the longitude and `y` the latitude, as in GeoJSON
    #[inline]
    fn from(p: LatLng) -> Self {
        geo::Coord { x: p.lng, y: p.lat }
    }
}

/// A point feature drawn as a marker
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Marker {
    pub point: LatLng,
    pub style: MarkerStyle,
}

/// A line feature
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Polyline {
    /// At least two points
    pub points: Vec<LatLng>,
    pub style: StrokeStyle,
}

impl Polyline {
    pub fn to_geo(&self) -> geo::LineString<f64> {
        geo::LineString::new(self.points.iter().copied().map(Into::into).collect())
    }

    /// Length along the surface of the earth in meters
    pub fn length_meters(&self) -> f64 {
        self.to_geo()
            .lines()
            .map(|segment| haversine_distance(segment.start, segment.end))
            .sum()
    }
}

/// Haversine distance between two (lng, lat) coordinates in meters
#[inline]
fn haversine_distance(p1: geo::Coord<f64>, p2: geo::Coord<f64>) -> f64 {
    let lat1 = p1.y.to_radians();
    let lat2 = p2.y.to_radians();
    let delta_lat = (p2.y - p1.y).to_radians();
    let delta_lon = (p2.x - p1.x).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    const EARTH_RADIUS_M: f64 = 6371000.0;
    EARTH_RADIUS_M * c
}

/// A polygon feature with optional holes
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PolygonShape {
    /// Outer ring, at least three points
    pub outer: Vec<LatLng>,
    /// Hole rings, each at least three points
    pub holes: Vec<Vec<LatLng>>,
    pub style: PolygonStyle,
}

impl PolygonShape {
    pub fn new(rings: PolygonRings, style: PolygonStyle) -> Self {
        Self {
            outer: rings.outer,
            holes: rings.holes,
            style,
        }
    }

    /// Convert to a `geo::Polygon` in (lng, lat) space
    ///
    /// Rings are closed by `geo` if the source left them open.
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let ring = |points: &[LatLng]| {
            geo::LineString::new(points.iter().copied().map(Into::into).collect())
        };
        geo::Polygon::new(
            ring(&self.outer),
            self.holes.iter().map(|hole| ring(hole)).collect(),
        )
    }

    /// Area on the earth's surface in square meters, holes excluded
    pub fn area_square_meters(&self) -> f64 {
        self.to_geo().chamberlain_duquette_unsigned_area()
    }
}

/// Rendering capability consuming the primitives of a layer
pub trait PrimitiveSink {
    fn draw_marker(&mut self, marker: &Marker);

    fn draw_polyline(&mut self, polyline: &Polyline);

    fn draw_polygon(&mut self, polygon: &PolygonShape);
}

/// The three primitive sequences produced from a document, in document order
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Primitives {
    pub markers: Vec<Marker>,
    pub polylines: Vec<Polyline>,
    pub polygons: Vec<PolygonShape>,
}

impl Primitives {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.polylines.is_empty() && self.polygons.is_empty()
    }

    /// Total number of primitives
    #[inline]
    pub fn len(&self) -> usize {
        self.markers.len() + self.polylines.len() + self.polygons.len()
    }

    /// Hand every primitive to a sink, bottom layer first: polygons, then
    /// polylines, then markers
    pub fn render_into<S: PrimitiveSink + ?Sized>(&self, sink: &mut S) {
        for polygon in &self.polygons {
            sink.draw_polygon(polygon);
        }
        for polyline in &self.polylines {
            sink.draw_polyline(polyline);
        }
        for marker in &self.markers {
            sink.draw_marker(marker);
        }
    }

    fn points(&self) -> impl Iterator<Item = LatLng> + '_ {
        let markers = self.markers.iter().map(|m| m.point);
        let polylines = self.polylines.iter().flat_map(|l| l.points.iter().copied());
        // Holes lie inside the outer ring, so the outer ring bounds the polygon
        let polygons = self.polygons.iter().flat_map(|p| p.outer.iter().copied());
        markers.chain(polylines).chain(polygons)
    }

    /// Bounding box of every primitive, in (lng, lat) space
    ///
    /// Returns `None` when there are no primitives.
    pub fn bounding_box(&self) -> Option<geo::Rect<f64>> {
        let mut points = self.points();
        let first = points.next()?;

        let (mut min_lat, mut max_lat) = (first.lat, first.lat);
        let (mut min_lng, mut max_lng) = (first.lng, first.lng);
        for point in points {
            min_lat = min_lat.min(point.lat);
            max_lat = max_lat.max(point.lat);
            min_lng = min_lng.min(point.lng);
            max_lng = max_lng.max(point.lng);
        }

        Some(geo::Rect::new(
            geo::Coord {
                x: min_lng,
                y: min_lat,
            },
            geo::Coord {
                x: max_lng,
                y: max_lat,
            },
        ))
    }

    /// Center of the bounding box
    pub fn center(&self) -> Option<LatLng> {
        let center = self.bounding_box()?.center();
        Some(LatLng::new(center.y, center.x))
    }
}
