use std::str::FromStr;

use palette::{LinSrgba, Srgb, Srgba};

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` into straight-alpha sRGB bytes.
pub fn parse_hex_color(input: &str) -> Option<Srgba<u8>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(short) = expand_short_hex(trimmed) {
        return parse_hex_color(&short);
    }

    if let Ok(rgba) = Srgba::<u8>::from_str(trimmed) {
        return Some(rgba);
    }

    let rgb = Srgb::<u8>::from_str(trimmed).ok()?;
    Some(Srgba::new(rgb.red, rgb.green, rgb.blue, 255))
}

pub fn to_linear(color: Srgba<u8>) -> LinSrgba<f32> {
    let rgba_f32: Srgba<f32> = color.into_format();
    rgba_f32.into_linear()
}

/// Linear RGBA as a shader-ready array.
pub fn to_linear_array(color: Srgba<u8>) -> [f32; 4] {
    let lin = to_linear(color);
    [lin.red, lin.green, lin.blue, lin.alpha]
}

pub fn to_wgpu_color(color: Srgba<u8>) -> wgpu::Color {
    let lin = to_linear(color);
    wgpu::Color {
        r: lin.red as f64,
        g: lin.green as f64,
        b: lin.blue as f64,
        a: lin.alpha as f64,
    }
}

fn expand_short_hex(input: &str) -> Option<String> {
    let digits = input.strip_prefix('#')?;
    if digits.len() != 3 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let mut out = String::from("#");
    for ch in digits.chars() {
        out.push(ch);
        out.push(ch);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba() {
        let white = parse_hex_color("#ffffff").unwrap();
        assert_eq!((white.red, white.green, white.blue, white.alpha), (255, 255, 255, 255));
        let tinted = parse_hex_color("#10203080").unwrap();
        assert_eq!((tinted.red, tinted.green, tinted.blue, tinted.alpha), (16, 32, 48, 128));
    }

    #[test]
    fn parses_short_form() {
        let c = parse_hex_color("#f80").unwrap();
        assert_eq!((c.red, c.green, c.blue), (255, 136, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_hex_color("").is_none());
        assert!(parse_hex_color("#zzz").is_none());
        assert!(parse_hex_color("chartreuse-ish").is_none());
    }
}
