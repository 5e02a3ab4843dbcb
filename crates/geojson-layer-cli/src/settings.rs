use clap::Parser;
use geojson_layer_lib::style::marker_size_pixels;
use geojson_layer_lib::{Color, GeometryKind, LayerOptions, StyleDefaults, resolve_color};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// GeoJSON Layer - Load a GeoJSON document and report the styled primitives it produces
pub struct Settings {
    /// GeoJSON file path, or an http(s) URL
    #[clap(value_name = "SOURCE")]
    pub source: String,

    /// Style defaults profile (initial, leaflet)
    #[clap(short, long, default_value = "initial", value_parser = parse_profile)]
    pub profile: StyleDefaults,

    /// Default marker color (hex or color name)
    #[clap(long, value_name = "COLOR", value_parser = parse_color)]
    pub marker_color: Option<Color>,

    /// Default marker size (small, medium, large)
    #[clap(long, value_name = "SIZE", value_parser = parse_marker_size)]
    pub marker_size: Option<String>,

    /// Default line and border color (hex or color name)
    #[clap(long, value_name = "COLOR", value_parser = parse_color)]
    pub stroke_color: Option<Color>,

    /// Default line and border opacity (0-1)
    #[clap(long, value_name = "OPACITY", value_parser = parse_opacity)]
    pub stroke_opacity: Option<f64>,

    /// Default line and border width in pixels
    #[clap(long, value_name = "PIXELS", value_parser = parse_width)]
    pub stroke_width: Option<f64>,

    /// Default polygon fill color (hex or color name)
    #[clap(long, value_name = "COLOR", value_parser = parse_color)]
    pub fill_color: Option<Color>,

    /// Default polygon fill opacity (0-1)
    #[clap(long, value_name = "OPACITY", value_parser = parse_opacity)]
    pub fill_opacity: Option<f64>,

    /// Skip features with this geometry type (can be repeated)
    #[clap(short, long, value_name = "GEOMETRY_TYPE", value_parser = parse_geometry_type)]
    pub exclude: Vec<GeometryKind>,

    /// Print the loaded primitives as JSON instead of a summary
    #[clap(long, default_value = "false")]
    pub json: bool,
}

impl Settings {
    /// The selected profile with every command line override applied
    pub fn style_defaults(&self) -> StyleDefaults {
        let mut defaults = self.profile.clone();
        if let Some(color) = self.marker_color {
            defaults.marker_color = color;
        }
        if let Some(size) = &self.marker_size {
            defaults.marker_size = size.clone().into();
        }
        if let Some(color) = self.stroke_color {
            defaults.stroke_color = color;
        }
        if let Some(opacity) = self.stroke_opacity {
            defaults.stroke_opacity = opacity;
        }
        if let Some(width) = self.stroke_width {
            defaults.stroke_width = width;
        }
        if let Some(color) = self.fill_color {
            defaults.fill_color = color;
        }
        if let Some(opacity) = self.fill_opacity {
            defaults.fill_opacity = opacity;
        }
        defaults
    }

    pub fn layer_options(&self) -> LayerOptions {
        let options = LayerOptions::new(self.style_defaults());
        if self.exclude.is_empty() {
            return options;
        }

        let excluded = self.exclude.clone();
        options.with_filter(move |geometry_type, _properties| {
            !excluded.iter().any(|kind| kind.type_name() == geometry_type)
        })
    }

    /// Whether the source should be fetched over HTTP
    pub fn is_remote(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }
}

fn parse_profile(name: &str) -> Result<StyleDefaults, String> {
    StyleDefaults::by_name(name).ok_or_else(|| format!("unknown profile '{name}'"))
}

fn parse_color(token: &str) -> Result<Color, String> {
    resolve_color(token).ok_or_else(|| format!("invalid color '{token}'"))
}

fn parse_marker_size(size: &str) -> Result<String, String> {
    match marker_size_pixels(size) {
        Some(_) => Ok(size.to_string()),
        None => Err(format!("marker size must be small, medium or large, got '{size}'")),
    }
}

fn parse_opacity(value: &str) -> Result<f64, String> {
    let opacity: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid opacity '{value}': {e}"))?;
    if (0.0..=1.0).contains(&opacity) {
        Ok(opacity)
    } else {
        Err(format!("opacity must be between 0 and 1, got {opacity}"))
    }
}

fn parse_width(value: &str) -> Result<f64, String> {
    let width: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid width '{value}': {e}"))?;
    if width.is_finite() && width >= 0.0 {
        Ok(width)
    } else {
        Err(format!("width must be a finite, non-negative number, got {width}"))
    }
}

fn parse_geometry_type(name: &str) -> Result<GeometryKind, String> {
    GeometryKind::from_type_name(name).ok_or_else(|| format!("unknown geometry type '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson_layer_lib::parse_str;

    fn settings(args: &[&str]) -> Settings {
        let mut argv = vec!["geojson-layer"];
        argv.extend_from_slice(args);
        Settings::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&["layer.geojson"]);
        assert_eq!(settings.style_defaults(), StyleDefaults::INITIAL);
        assert!(settings.exclude.is_empty());
        assert!(!settings.json);
        assert!(!settings.is_remote());
    }

    #[test]
    fn test_profile_and_overrides() {
        let settings = settings(&[
            "https://example.com/layer.geojson",
            "--profile",
            "Leaflet",
            "--stroke-color",
            "deep-orange",
            "--stroke-width",
            "5",
            "--fill-opacity",
            "0.5",
            "--marker-size",
            "large",
        ]);
        assert!(settings.is_remote());

        let defaults = settings.style_defaults();
        assert_eq!(defaults.stroke_color, Color::from_argb_u32(0xFFFF5722));
        assert_eq!(defaults.stroke_width, 5.0);
        assert_eq!(defaults.fill_opacity, 0.5);
        assert_eq!(defaults.marker_size, "large");
        assert_eq!(defaults.marker_color, StyleDefaults::LEAFLET.marker_color);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let parse = |args: &[&str]| {
            let mut argv = vec!["geojson-layer", "layer.geojson"];
            argv.extend_from_slice(args);
            Settings::try_parse_from(argv)
        };
        assert!(parse(&["--profile", "mapbox"]).is_err());
        assert!(parse(&["--marker-color", "not-a-color"]).is_err());
        assert!(parse(&["--marker-size", "huge"]).is_err());
        assert!(parse(&["--stroke-opacity", "1.5"]).is_err());
        assert!(parse(&["--stroke-width", "NaN"]).is_err());
        assert!(parse(&["--stroke-width", "inf"]).is_err());
        assert!(parse(&["--stroke-width=-2"]).is_err());
        assert!(parse(&["--stroke-width", "0"]).is_ok());
        assert!(parse(&["--exclude", "GeometryCollection"]).is_err());
    }

    #[test]
    fn test_exclude_filter() {
        let settings = settings(&["layer.geojson", "--exclude", "Point", "-e", "Polygon"]);
        let document = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 1]}},
            {"type": "Feature", "geometry": {"type": "MultiPoint", "coordinates": [[1, 1]]}},
            {"type": "Feature", "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [1, 0], [1, 1]]]
            }}
        ]}"#;

        let primitives = parse_str(document, &settings.layer_options()).unwrap();
        assert_eq!(primitives.markers.len(), 1);
        assert!(primitives.polygons.is_empty());
    }
}
