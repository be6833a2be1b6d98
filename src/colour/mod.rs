//! Conversions between hex strings, 8-bit RGB and the bridge's xy
//! chromaticity coordinates.
//!
//! Lights can only reproduce colours inside their gamut triangle, so every
//! xy value produced or consumed here is first pulled onto the triangle.

use common::Xy;

use crate::error::{SceneError, SceneResult};

pub mod gamut;

pub use gamut::{Gamut, GAMUT_C};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// D65 white point, used for black which has no chromaticity.
pub const WHITE_POINT: Xy = Xy::new(0.3127, 0.3290);

/// Parses `#RRGGBB`, `RRGGBB` or the `#RGB` shorthand, in either case.
pub fn hex_to_rgb(hex: &str) -> SceneResult<Rgb> {
    let digits = hex.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SceneError::invalid(format!("'{}' is not a hex colour", hex)));
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| {
        SceneError::invalid(format!("'{}' is not a hex colour", hex))
    });

    match digits.len() {
        6 => Ok(Rgb::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        3 => {
            // #abc is #aabbcc
            let r = channel(&digits[0..1])?;
            let g = channel(&digits[1..2])?;
            let b = channel(&digits[2..3])?;
            Ok(Rgb::new(r * 17, g * 17, b * 17))
        }
        _ => Err(SceneError::invalid(format!(
            "'{}' is not a hex colour",
            hex
        ))),
    }
}

pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

/// Gamma-expands sRGB and projects it through the wide gamut D65 matrix.
pub fn rgb_to_xy(rgb: Rgb, gamut: &Gamut) -> Xy {
    let r = gamma_expand(rgb.r as f64 / 255.0);
    let g = gamma_expand(rgb.g as f64 / 255.0);
    let b = gamma_expand(rgb.b as f64 / 255.0);

    let x = r * 0.664511 + g * 0.154324 + b * 0.162028;
    let y = r * 0.283881 + g * 0.668433 + b * 0.047685;
    let z = r * 0.000088 + g * 0.072310 + b * 0.986039;

    let sum = x + y + z;
    if sum == 0.0 {
        return gamut.clamp(WHITE_POINT);
    }

    gamut.clamp(Xy::new(x / sum, y / sum))
}

/// Converts a chromaticity back to RGB at full brightness.
pub fn xy_to_rgb(xy: Xy, gamut: &Gamut) -> Rgb {
    let xy = gamut.clamp(xy);
    if xy.y <= 0.0 {
        return Rgb::new(0, 0, 0);
    }

    let big_y = 1.0;
    let big_x = (big_y / xy.y) * xy.x;
    let big_z = (big_y / xy.y) * (1.0 - xy.x - xy.y);

    let r = big_x * 1.656492 - big_y * 0.354851 - big_z * 0.255038;
    let g = -big_x * 0.707196 + big_y * 1.655397 + big_z * 0.036152;
    let b = big_x * 0.051713 - big_y * 0.121364 + big_z * 1.011530;

    let (r, g, b) = (r.max(0.0), g.max(0.0), b.max(0.0));

    // Keep the hue when a channel overshoots
    let max = r.max(g).max(b);
    let (r, g, b) = if max > 1.0 {
        (r / max, g / max, b / max)
    } else {
        (r, g, b)
    };

    Rgb::new(to_channel(r), to_channel(g), to_channel(b))
}

pub fn hex_to_xy(hex: &str, gamut: &Gamut) -> SceneResult<Xy> {
    Ok(rgb_to_xy(hex_to_rgb(hex)?, gamut))
}

pub fn xy_to_hex(xy: Xy, gamut: &Gamut) -> String {
    rgb_to_hex(xy_to_rgb(xy, gamut))
}

fn gamma_expand(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / (1.0 + 0.055)).powf(2.4)
    } else {
        c / 12.92
    }
}

fn gamma_compress(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        (1.0 + 0.055) * c.powf(1.0 / 2.4) - 0.055
    }
}

fn to_channel(c: f64) -> u8 {
    (gamma_compress(c).clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: Xy, b: Xy) {
        assert!(
            (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4,
            "{:?} is not near {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF0000").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(hex_to_rgb("00ff00").unwrap(), Rgb::new(0, 255, 0));
        assert_eq!(hex_to_rgb("#1a2B3c").unwrap(), Rgb::new(0x1a, 0x2b, 0x3c));
        assert_eq!(hex_to_rgb("#f80").unwrap(), Rgb::new(0xff, 0x88, 0x00));
    }

    #[test]
    fn test_malformed_hex_is_invalid_input() {
        for bad in ["", "#", "#12345", "#GG0000", "red", "#ff00ff00", "#ff 000"] {
            assert!(
                matches!(hex_to_rgb(bad), Err(SceneError::InvalidInput(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex(Rgb::new(255, 0, 16)), "#ff0010");
    }

    #[test]
    fn test_primaries_clamp_to_gamut_corners() {
        assert_near(rgb_to_xy(Rgb::new(255, 0, 0), &GAMUT_C), GAMUT_C.red);
        assert_near(rgb_to_xy(Rgb::new(0, 255, 0), &GAMUT_C), GAMUT_C.green);
    }

    #[test]
    fn test_white_is_inside_gamut() {
        let white = rgb_to_xy(Rgb::new(255, 255, 255), &GAMUT_C);
        assert!(GAMUT_C.contains(white));
        assert!((white.x - 0.3227).abs() < 1e-3);
        assert!((white.y - 0.3290).abs() < 1e-3);
    }

    #[test]
    fn test_black_maps_to_white_point() {
        assert_near(rgb_to_xy(Rgb::new(0, 0, 0), &GAMUT_C), WHITE_POINT);
    }

    #[test]
    fn test_xy_to_rgb_keeps_dominant_channel() {
        let red = xy_to_rgb(GAMUT_C.red, &GAMUT_C);
        assert_eq!(red.r, 255);
        assert!(red.g < 64 && red.b < 64, "{:?}", red);

        let green = xy_to_rgb(GAMUT_C.green, &GAMUT_C);
        assert_eq!(green.g, 255);
        assert!(green.r < 128 && green.b < 128, "{:?}", green);
    }

    #[test]
    fn test_hex_xy_hex_stays_close() {
        let xy = hex_to_xy("#3366cc", &GAMUT_C).unwrap();
        let back = hex_to_rgb(&xy_to_hex(xy, &GAMUT_C)).unwrap();

        // Brightness is lost going through xy, so compare channel ratios
        let ratio = |c: Rgb| c.b as f64 / (c.r as f64 + c.g as f64 + c.b as f64);
        assert!((ratio(back) - ratio(Rgb::new(0x33, 0x66, 0xcc))).abs() < 0.1);
    }
}
