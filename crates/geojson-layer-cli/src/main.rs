mod settings;

use clap::Parser;
use geojson_layer_lib::{
    DataSource, FileSource, LayerLoader, LayerSnapshot, Marker, PolygonShape, Polyline,
    PrimitiveSink, Result,
};
use settings::Settings;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::parse();
    setup_logging();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start the async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(&settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", settings.source, e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by RUST_LOG and defaulting to `info`
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(settings: &Settings) -> Result<()> {
    let loader = LayerLoader::new(settings.layer_options());
    tracing::debug!("Layer options: {:?}", loader.options());

    if settings.is_remote() {
        #[cfg(feature = "http")]
        return load_and_report(
            &loader,
            &geojson_layer_lib::HttpSource::new(settings.source.as_str()),
            settings.json,
        )
        .await;

        #[cfg(not(feature = "http"))]
        return Err(geojson_layer_lib::SourceError::Network(
            "this build has no HTTP support".to_string(),
        )
        .into());
    }

    load_and_report(
        &loader,
        &FileSource::new(settings.source.as_str()),
        settings.json,
    )
    .await
}

async fn load_and_report<S: DataSource>(
    loader: &LayerLoader,
    source: &S,
    json: bool,
) -> Result<()> {
    loader.load(source).await?;
    let snapshot = loader.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        print_summary(&snapshot);
    }
    Ok(())
}

/// Tallies primitives in paint order
#[derive(Debug, Default)]
struct Summary {
    markers: usize,
    polylines: usize,
    polyline_points: usize,
    length_meters: f64,
    polygons: usize,
    holes: usize,
    filled: usize,
    area_square_meters: f64,
}

impl PrimitiveSink for Summary {
    fn draw_marker(&mut self, _marker: &Marker) {
        self.markers += 1;
    }

    fn draw_polyline(&mut self, polyline: &Polyline) {
        self.polylines += 1;
        self.polyline_points += polyline.points.len();
        self.length_meters += polyline.length_meters();
    }

    fn draw_polygon(&mut self, polygon: &PolygonShape) {
        self.polygons += 1;
        self.holes += polygon.holes.len();
        self.area_square_meters += polygon.area_square_meters();
        if polygon.style.fill.is_some() {
            self.filled += 1;
        }
    }
}

fn print_summary(snapshot: &LayerSnapshot) {
    let mut summary = Summary::default();
    snapshot.primitives.render_into(&mut summary);

    println!("Markers:   {}", summary.markers);
    println!(
        "Polylines: {} ({} points, {:.3} km)",
        summary.polylines,
        summary.polyline_points,
        summary.length_meters / 1000.0
    );
    println!(
        "Polygons:  {} ({} holes, {} filled, {:.3} km²)",
        summary.polygons,
        summary.holes,
        summary.filled,
        summary.area_square_meters / 1_000_000.0
    );

    match (snapshot.primitives.bounding_box(), snapshot.primitives.center()) {
        (Some(bounds), Some(center)) => {
            let (min, max) = (bounds.min(), bounds.max());
            println!(
                "Bounds:    [{:.6}, {:.6}] - [{:.6}, {:.6}] (lat, lng)",
                min.y, min.x, max.y, max.x
            );
            println!("Center:    {:.6}, {:.6}", center.lat, center.lng);
        }
        _ => println!("Bounds:    none (empty layer)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson_layer_lib::{LayerOptions, parse_document};
    use serde_json::json;

    #[test]
    fn test_summary_counts() {
        let document = json!({"type": "FeatureCollection", "features": [
            {
                "type": "Feature",
                "geometry": {"type": "MultiPoint", "coordinates": [[1, 1], [2, 2]]},
            },
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 0]]},
            },
            {
                "type": "Feature",
                "properties": {"fill-opacity": 0},
                "geometry": {"type": "Polygon", "coordinates": [
                    [[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]],
                    [[1, 1], [2, 1], [2, 2], [1, 2], [1, 1]],
                ]},
            },
        ]});
        let primitives = parse_document(&document, &LayerOptions::default()).unwrap();

        let mut summary = Summary::default();
        primitives.render_into(&mut summary);
        assert_eq!(summary.markers, 2);
        assert_eq!(summary.polylines, 1);
        assert_eq!(summary.polyline_points, 2);
        assert!((summary.length_meters - 111_195.0).abs() < 1.0);
        assert_eq!(summary.polygons, 1);
        assert_eq!(summary.holes, 1);
        assert_eq!(summary.filled, 0);

        // 16 square degrees minus a one degree hole, close to the equator
        let km2 = summary.area_square_meters / 1_000_000.0;
        assert!(km2 > 180_000.0 && km2 < 190_000.0, "area = {km2} km²");
    }

    #[tokio::test]
    async fn test_load_and_report_missing_file() {
        let loader = LayerLoader::default();
        let source = FileSource::new("/no/such/file.geojson");
        let result = load_and_report(&loader, &source, false).await;
        assert!(result.is_err());
        assert_eq!(loader.snapshot().revision, 0);
    }
}
