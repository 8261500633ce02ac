use serde::{Deserialize, Serialize};

use crate::error::{GlowError, GlowResult};

pub use kurbo::{BezPath, Point, Rect};

/// Opaque 8-bit sRGB color.
///
/// Border colors are always drawn fully opaque, so there is no alpha channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a packed `0xAARRGGBB` value. Alpha is ignored.
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack as `0xFFRRGGBB`.
    pub const fn to_argb(self) -> u32 {
        0xFF00_0000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Parse `#RRGGBB` (leading `#` optional). An `#RRGGBBAA` alpha byte is accepted and dropped.
    pub fn parse_hex(s: &str) -> GlowResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> GlowResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| GlowError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        match s.len() {
            6 | 8 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
            }),
            _ => Err(GlowError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Rgb8 {
    type Err = GlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl std::fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            // Signed ARGB ints, as stored by the settings screen.
            Packed(i64),
            Arr(Vec<i64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Packed(v) => {
                if v < i64::from(i32::MIN) || v > i64::from(u32::MAX) {
                    return Err(serde::de::Error::custom(format!(
                        "packed color {v} does not fit in 32 bits"
                    )));
                }
                Ok(Self::from_argb(v as u32))
            }
            Repr::Arr(v) => {
                let [r, g, b] = v.as_slice() else {
                    return Err(serde::de::Error::custom(
                        "rgb array must have len 3 ([r,g,b])",
                    ));
                };
                let byte = |c: i64| -> Result<u8, D::Error> {
                    u8::try_from(c).map_err(|_| {
                        serde::de::Error::custom(format!("rgb channel {c} is outside 0..=255"))
                    })
                };
                Ok(Self::new(byte(*r)?, byte(*g)?, byte(*b)?))
            }
        }
    }
}

/// Pixel dimensions of a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Full surface bounds with the origin at the top-left corner.
    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_hex_with_and_without_alpha() {
        assert_eq!(Rgb8::parse_hex("#ff0000").unwrap(), Rgb8::new(255, 0, 0));
        assert_eq!(Rgb8::parse_hex("8A2BE2").unwrap(), Rgb8::new(138, 43, 226));
        assert_eq!(Rgb8::parse_hex("#00ff0080").unwrap(), Rgb8::new(0, 255, 0));
        assert!(Rgb8::parse_hex("#fff").is_err());
        assert!(Rgb8::parse_hex("#gg0000").is_err());
    }

    #[test]
    fn deserializes_packed_argb_ints() {
        // 0xFFFF0000 as a signed 32-bit int.
        let c: Rgb8 = serde_json::from_value(json!(-65536)).unwrap();
        assert_eq!(c, Rgb8::new(255, 0, 0));

        let c: Rgb8 = serde_json::from_value(json!(0xFF8A2BE2u32)).unwrap();
        assert_eq!(c, Rgb8::new(138, 43, 226));

        assert!(serde_json::from_value::<Rgb8>(json!(1i64 << 40)).is_err());
    }

    #[test]
    fn deserializes_arrays_and_serializes_hex() {
        let c: Rgb8 = serde_json::from_value(json!([255, 255, 0])).unwrap();
        assert_eq!(c, Rgb8::new(255, 255, 0));
        assert!(serde_json::from_value::<Rgb8>(json!([1, 2])).is_err());
        assert!(serde_json::from_value::<Rgb8>(json!([1, 2, 300])).is_err());

        assert_eq!(serde_json::to_value(c).unwrap(), json!("#ffff00"));
    }

    #[test]
    fn argb_packing_is_opaque() {
        let c = Rgb8::new(0x12, 0x34, 0x56);
        assert_eq!(c.to_argb(), 0xFF12_3456);
        assert_eq!(Rgb8::from_argb(c.to_argb()), c);
    }

    #[test]
    fn surface_bounds_match_size() {
        let s = SurfaceSize::new(320, 240);
        assert_eq!(s.bounds(), Rect::new(0.0, 0.0, 320.0, 240.0));
        assert!(!s.is_empty());
        assert!(SurfaceSize::new(0, 10).is_empty());
    }
}
