//! Color values and color token parsing
//!
//! Style properties carry colors as free-form strings. [`resolve_color`] accepts
//! hex notation (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, the `#` being optional)
//! and a small table of named colors taken from the material primary palette.

use std::fmt;

/// An 8-bit RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);

    /// Create an opaque color
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from a packed `0xAARRGGBB` value
    #[inline]
    pub const fn from_argb_u32(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Alpha channel as a value in `[0, 1]`
    #[inline]
    pub fn opacity(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Return the same color with its alpha channel replaced by `opacity`
    ///
    /// The opacity is clamped to `[0, 1]`.
    #[inline]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// Hex representation, `#rrggbb` for opaque colors and `#rrggbbaa` otherwise
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse hex notation with 3, 4, 6 or 8 digits and an optional leading `#`
    ///
    /// Alpha comes last (`rrggbbaa`) and defaults to opaque.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let nibbles: Vec<u8> = digits
            .bytes()
            .map(|b| (b as char).to_digit(16).unwrap_or(0) as u8)
            .collect();

        let channels: Vec<u8> = match nibbles.len() {
            // Short form: every digit is doubled, #2e8 -> #22ee88
            3 | 4 => nibbles.iter().map(|n| n << 4 | n).collect(),
            6 | 8 => nibbles.chunks(2).map(|pair| pair[0] << 4 | pair[1]).collect(),
            _ => return None,
        };

        let a = channels.get(3).copied().unwrap_or(255);
        Some(Self::from_rgba(channels[0], channels[1], channels[2], a))
    }

    /// Look up a named color, ignoring case and `-`, `_` or space separators
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let argb = match key.as_str() {
            "red" => 0xFFF44336,
            "pink" => 0xFFE91E63,
            "purple" => 0xFF9C27B0,
            "deeppurple" => 0xFF673AB7,
            "indigo" => 0xFF3F51B5,
            "blue" => 0xFF2196F3,
            "lightblue" => 0xFF03A9F4,
            "cyan" => 0xFF00BCD4,
            "teal" => 0xFF009688,
            "green" => 0xFF4CAF50,
            "lightgreen" => 0xFF8BC34A,
            "lime" => 0xFFCDDC39,
            "yellow" => 0xFFFFEB3B,
            "amber" => 0xFFFFC107,
            "orange" => 0xFFFF9800,
            "deeporange" => 0xFFFF5722,
            "brown" => 0xFF795548,
            "grey" | "gray" => 0xFF9E9E9E,
            "bluegrey" | "bluegray" => 0xFF607D8B,
            "black" => 0xFF000000,
            "white" => 0xFFFFFFFF,
            "transparent" => 0x00000000,
            _ => return None,
        };
        Some(Self::from_argb_u32(argb))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Resolve a color token to a color
///
/// Named colors are looked up first, then hex notation. Returns `None` for empty,
/// unknown or malformed tokens and the caller falls back to its defaults.
pub fn resolve_color(token: &str) -> Option<Color> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Color::from_name(token).or_else(|| Color::from_hex(token))
}
