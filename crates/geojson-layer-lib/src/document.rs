//! Document walking: root validation and feature iteration

use crate::feature::{LayerOptions, process_feature_into};
use crate::primitives::Primitives;
use crate::{LayerError, Result};
use serde_json::Value;

/// Turn a decoded GeoJSON root into primitives
///
/// The root must be an object of type `FeatureCollection` or `Feature`; anything
/// else is rejected as not being GeoJSON at all. Below the root nothing is an
/// error: invalid features are skipped and the rest of the document is kept.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse_document(root: &Value, options: &LayerOptions) -> Result<Primitives> {
    let object = root.as_object().ok_or(LayerError::NotAnObject)?;
    let root_type = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(LayerError::MissingType)?;
    if root_type != "FeatureCollection" && root_type != "Feature" {
        return Err(LayerError::UnsupportedType(root_type.to_string()));
    }

    let mut primitives = Primitives::default();
    let features = object.get("features").and_then(Value::as_array);

    match features {
        Some(features) => {
            for feature in features.iter().filter(|f| f.is_object()) {
                process_feature_into(feature, options, &mut primitives);
            }
        }
        // A collection without a features array is simply empty
        None if root_type == "FeatureCollection" => {}
        None => process_feature_into(root, options, &mut primitives),
    }

    tracing::debug!(
        "Parsed {} document: {} markers, {} polylines, {} polygons",
        root_type,
        primitives.markers.len(),
        primitives.polylines.len(),
        primitives.polygons.len()
    );

    Ok(primitives)
}

/// Decode JSON text and turn it into primitives
pub fn parse_str(text: &str, options: &LayerOptions) -> Result<Primitives> {
    let root: Value = serde_json::from_str(text)?;
    parse_document(&root, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::LatLng;
    use serde_json::json;

    fn parse(root: Value) -> Result<Primitives> {
        parse_document(&root, &LayerOptions::default())
    }

    #[test]
    fn test_empty_object_is_rejected() {
        assert!(matches!(parse(json!({})), Err(LayerError::MissingType)));
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        assert!(matches!(parse(json!([])), Err(LayerError::NotAnObject)));
        assert!(matches!(parse(json!("Feature")), Err(LayerError::NotAnObject)));
    }

    #[test]
    fn test_unsupported_root_type() {
        let result = parse(json!({"type": "Point", "coordinates": [1, 2]}));
        match result {
            Err(LayerError::UnsupportedType(t)) => assert_eq!(t, "Point"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_collection() {
        let primitives = parse(json!({"type": "FeatureCollection", "features": []})).unwrap();
        assert!(primitives.is_empty());

        let primitives = parse(json!({"type": "FeatureCollection"})).unwrap();
        assert!(primitives.is_empty());
    }

    #[test]
    fn test_single_feature_root() {
        let primitives = parse(json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[24.7, 59.4], [24.8, 59.401]]},
        }))
        .unwrap();
        assert_eq!(primitives.polylines.len(), 1);
        assert_eq!(
            primitives.polylines[0].points,
            vec![LatLng::new(59.4, 24.7), LatLng::new(59.401, 24.8)]
        );
    }

    #[test]
    fn test_bad_features_are_skipped() {
        let primitives = parse(json!({
            "type": "FeatureCollection",
            "features": [
                42,
                null,
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": "nope"}},
                {"type": "Feature", "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 1]], [[0, 0], [1, 0], [1, 1]]],
                }},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}},
                {"type": "Feature", "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                }},
            ],
        }))
        .unwrap();
        assert_eq!(primitives.markers.len(), 1);
        assert_eq!(primitives.polylines.len(), 0);
        assert_eq!(primitives.polygons.len(), 1);
    }

    #[test]
    fn test_features_keep_document_order() {
        let primitives = parse(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 1]}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2, 2]}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [3, 3]}},
            ],
        }))
        .unwrap();
        let lats: Vec<f64> = primitives.markers.iter().map(|m| m.point.lat).collect();
        assert_eq!(lats, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_str_reports_json_errors() {
        let options = LayerOptions::default();
        assert!(matches!(
            parse_str("{not json", &options),
            Err(LayerError::Json(_))
        ));
        let primitives = parse_str(r#"{"type":"FeatureCollection","features":[]}"#, &options);
        assert!(primitives.unwrap().is_empty());
    }
}
