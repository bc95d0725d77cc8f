//! Ink colors and the color classifier
//!
//! Colors arrive in whatever space the drawing surface produced them in.
//! Every comparison goes through [`Color::to_srgb`], which normalizes to
//! canonical sRGB RGBA in [0, 1].

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default tolerance for [`is_essentially_black`]
pub const DEFAULT_BLACK_TOLERANCE: f32 = 0.05;

/// Default tolerance for [`is_visually_equal`]
pub const DEFAULT_EQUALITY_TOLERANCE: f32 = 0.001;

/// A device-dependent ink color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "space", rename_all = "snake_case")]
pub enum Color {
    /// sRGB components in [0, 1]
    Srgb { r: f32, g: f32, b: f32, a: f32 },
    /// Extended gray: a single white level plus alpha
    Gray { white: f32, alpha: f32 },
    /// Display P3 components in [0, 1]
    DisplayP3 { r: f32, g: f32, b: f32, a: f32 },
    /// Hue, saturation, brightness, all in [0, 1]
    Hsb {
        hue: f32,
        saturation: f32,
        brightness: f32,
        alpha: f32,
    },
    /// Image or pattern fill; has no canonical RGB value
    Pattern { name: String },
}

/// Canonical sRGB color with every channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Srgba {
    /// Quantize to 8-bit RGBA
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Color {
    pub const BLACK: Color = Color::Gray {
        white: 0.0,
        alpha: 1.0,
    };

    pub const WHITE: Color = Color::Gray {
        white: 1.0,
        alpha: 1.0,
    };

    pub fn srgb(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color::Srgb { r, g, b, a }
    }

    pub fn gray(white: f32, alpha: f32) -> Self {
        Color::Gray { white, alpha }
    }

    /// Build from 8-bit sRGB channels
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        let f = |v: u8| v as f32 / 255.0;
        Color::Srgb {
            r: f(rgba[0]),
            g: f(rgba[1]),
            b: f(rgba[2]),
            a: f(rgba[3]),
        }
    }

    /// Normalize to canonical sRGB
    ///
    /// Returns `None` for pattern colors and for colors with non-finite
    /// components.
    pub fn to_srgb(&self) -> Option<Srgba> {
        let converted = match *self {
            Color::Srgb { r, g, b, a } => Srgba { r, g, b, a },
            Color::Gray { white, alpha } => Srgba {
                r: white,
                g: white,
                b: white,
                a: alpha,
            },
            Color::DisplayP3 { r, g, b, a } => display_p3_to_srgb(r, g, b, a),
            Color::Hsb {
                hue,
                saturation,
                brightness,
                alpha,
            } => hsb_to_srgb(hue, saturation, brightness, alpha),
            Color::Pattern { .. } => return None,
        };

        let channels = [converted.r, converted.g, converted.b, converted.a];
        if channels.iter().any(|c| !c.is_finite()) {
            return None;
        }

        Some(Srgba {
            r: converted.r.clamp(0.0, 1.0),
            g: converted.g.clamp(0.0, 1.0),
            b: converted.b.clamp(0.0, 1.0),
            a: converted.a.clamp(0.0, 1.0),
        })
    }

    /// Exact representation equality (bitwise on float components)
    ///
    /// Unlike `==`, this is reflexive for colors carrying NaN.
    pub fn same_representation(&self, other: &Color) -> bool {
        use Color::*;
        let bits = |v: &[f32]| v.iter().map(|c| c.to_bits()).collect::<Vec<_>>();
        match (self, other) {
            (Srgb { r, g, b, a }, Srgb { r: r2, g: g2, b: b2, a: a2 })
            | (DisplayP3 { r, g, b, a }, DisplayP3 { r: r2, g: g2, b: b2, a: a2 }) => {
                bits(&[*r, *g, *b, *a]) == bits(&[*r2, *g2, *b2, *a2])
            }
            (Gray { white, alpha }, Gray { white: w2, alpha: a2 }) => {
                bits(&[*white, *alpha]) == bits(&[*w2, *a2])
            }
            (
                Hsb { hue, saturation, brightness, alpha },
                Hsb { hue: h2, saturation: s2, brightness: b2, alpha: a2 },
            ) => bits(&[*hue, *saturation, *brightness, *alpha]) == bits(&[*h2, *s2, *b2, *a2]),
            (Pattern { name }, Pattern { name: n2 }) => name == n2,
            _ => false,
        }
    }

    pub fn is_essentially_black(&self, tolerance: f32) -> bool {
        is_essentially_black(self, tolerance)
    }

    pub fn is_visually_equal(&self, other: &Color, tolerance: f32) -> bool {
        is_visually_equal(self, other, tolerance)
    }
}

/// True when the normalized r, g and b channels are all within `tolerance`
/// of zero. Alpha is ignored. Colors that cannot be normalized are never
/// black.
pub fn is_essentially_black(color: &Color, tolerance: f32) -> bool {
    let Some(c) = color.to_srgb() else {
        debug!("Could not normalize {:?}; treating as not black", color);
        return false;
    };
    c.r <= tolerance && c.g <= tolerance && c.b <= tolerance
}

/// True when every normalized channel, alpha included, differs by at most
/// `tolerance`. Falls back to exact representation equality when either
/// color cannot be normalized.
pub fn is_visually_equal(a: &Color, b: &Color, tolerance: f32) -> bool {
    match (a.to_srgb(), b.to_srgb()) {
        (Some(x), Some(y)) => {
            (x.r - y.r).abs() <= tolerance
                && (x.g - y.g).abs() <= tolerance
                && (x.b - y.b).abs() <= tolerance
                && (x.a - y.a).abs() <= tolerance
        }
        _ => a.same_representation(b),
    }
}

fn srgb_decode(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn srgb_encode(l: f32) -> f32 {
    let l = l.clamp(0.0, 1.0);
    if l <= 0.003_130_8 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// Display P3 and sRGB share a transfer curve and white point; only the
/// primaries differ.
fn display_p3_to_srgb(r: f32, g: f32, b: f32, a: f32) -> Srgba {
    let (lr, lg, lb) = (srgb_decode(r), srgb_decode(g), srgb_decode(b));
    let sr = 1.224_940_2 * lr - 0.224_940_4 * lg;
    let sg = -0.042_056_9 * lr + 1.042_057_1 * lg;
    let sb = -0.019_637_6 * lr - 0.078_636_1 * lg + 1.098_273_5 * lb;
    Srgba {
        r: srgb_encode(sr),
        g: srgb_encode(sg),
        b: srgb_encode(sb),
        a,
    }
}

fn hsb_to_srgb(hue: f32, saturation: f32, brightness: f32, alpha: f32) -> Srgba {
    let h = hue.rem_euclid(1.0) * 6.0;
    let c = brightness * saturation;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = brightness - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Srgba {
        r: r + m,
        g: g + m,
        b: b + m,
        a: alpha,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_normalizes_to_equal_channels() {
        let c = Color::gray(0.15, 1.0).to_srgb().unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (0.15, 0.15, 0.15, 1.0));
    }

    #[test]
    fn test_black_threshold_inclusive() {
        assert!(Color::BLACK.is_essentially_black(DEFAULT_BLACK_TOLERANCE));
        assert!(Color::srgb(0.05, 0.05, 0.05, 1.0).is_essentially_black(0.05));
        assert!(!Color::srgb(0.05, 0.051, 0.0, 1.0).is_essentially_black(0.05));
        assert!(!Color::srgb(0.9, 0.0, 0.0, 1.0).is_essentially_black(0.05));
    }

    #[test]
    fn test_black_ignores_alpha() {
        assert!(Color::srgb(0.0, 0.0, 0.0, 0.0).is_essentially_black(0.05));
        assert!(Color::gray(0.02, 0.3).is_essentially_black(0.05));
    }

    #[test]
    fn test_black_threshold_sweep() {
        let tolerance = 0.1;
        for step in 0..=20 {
            let v = step as f32 * 0.01;
            let dark = Color::srgb(v, v * 0.5, 0.0, 1.0);
            assert_eq!(dark.is_essentially_black(tolerance), v <= tolerance, "v = {}", v);

            let tinted = Color::srgb(0.0, 0.0, v, 1.0);
            assert_eq!(tinted.is_essentially_black(tolerance), v <= tolerance, "v = {}", v);
        }
    }

    #[test]
    fn test_pattern_is_never_black() {
        let pattern = Color::Pattern {
            name: "charcoal".to_string(),
        };
        assert!(pattern.to_srgb().is_none());
        assert!(!pattern.is_essentially_black(1.0));
    }

    #[test]
    fn test_non_finite_fails_normalization() {
        let broken = Color::srgb(f32::NAN, 0.0, 0.0, 1.0);
        assert!(broken.to_srgb().is_none());
        assert!(!broken.is_essentially_black(1.0));
    }

    #[test]
    fn test_visually_equal_reflexive() {
        let colors = [
            Color::BLACK,
            Color::WHITE,
            Color::srgb(0.3, 0.6, 0.9, 0.5),
            Color::DisplayP3 {
                r: 1.0,
                g: 0.2,
                b: 0.1,
                a: 1.0,
            },
            Color::Hsb {
                hue: 0.7,
                saturation: 0.4,
                brightness: 0.8,
                alpha: 1.0,
            },
            Color::Pattern {
                name: "crosshatch".to_string(),
            },
            Color::srgb(f32::NAN, 0.0, 0.0, 1.0),
        ];
        for c in &colors {
            for tolerance in [0.0, DEFAULT_EQUALITY_TOLERANCE, 0.5] {
                assert!(c.is_visually_equal(c, tolerance), "{:?}", c);
            }
        }
    }

    #[test]
    fn test_visually_equal_across_spaces() {
        let gray = Color::gray(0.15, 1.0);
        let srgb = Color::srgb(0.15, 0.15, 0.15, 1.0);
        assert!(is_visually_equal(&gray, &srgb, DEFAULT_EQUALITY_TOLERANCE));
        assert!(!is_visually_equal(&gray, &Color::srgb(0.15, 0.15, 0.15, 0.9), 0.001));
    }

    #[test]
    fn test_visually_equal_fallback_requires_same_representation() {
        let a = Color::Pattern {
            name: "a".to_string(),
        };
        let b = Color::Pattern {
            name: "b".to_string(),
        };
        assert!(!is_visually_equal(&a, &b, 1.0));
        assert!(!is_visually_equal(&a, &Color::BLACK, 1.0));
    }

    #[test]
    fn test_display_p3_primaries() {
        let white = Color::DisplayP3 {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
        }
        .to_srgb()
        .unwrap();
        assert!((white.r - 1.0).abs() < 0.01);
        assert!((white.g - 1.0).abs() < 0.01);
        assert!((white.b - 1.0).abs() < 0.01);

        let black = Color::DisplayP3 {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        };
        assert!(black.is_essentially_black(DEFAULT_BLACK_TOLERANCE));

        // P3 red lies outside sRGB and clamps
        let red = Color::DisplayP3 {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        }
        .to_srgb()
        .unwrap();
        assert!((red.r - 1.0).abs() < 1e-4);
        assert!(red.g.abs() < 1e-4);
    }

    #[test]
    fn test_hsb_conversion() {
        let red = Color::Hsb {
            hue: 0.0,
            saturation: 1.0,
            brightness: 1.0,
            alpha: 1.0,
        }
        .to_srgb()
        .unwrap();
        assert_eq!((red.r, red.g, red.b), (1.0, 0.0, 0.0));

        let dark = Color::Hsb {
            hue: 0.5,
            saturation: 1.0,
            brightness: 0.02,
            alpha: 1.0,
        };
        assert!(dark.is_essentially_black(0.05));
    }

    #[test]
    fn test_rgba8_round_trip_quantization() {
        let c = Color::from_rgba8([255, 0, 128, 255]).to_srgb().unwrap();
        assert_eq!(c.to_rgba8(), [255, 0, 128, 255]);
    }

    #[test]
    fn test_serde_tagged() {
        let json = r#"{"space":"gray","white":0.0,"alpha":1.0}"#;
        let color: Color = serde_json::from_str(json).unwrap();
        assert_eq!(color, Color::BLACK);
    }
}
