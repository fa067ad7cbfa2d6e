//! Value translation (spec §4.7 "Value translation"): mapping the vision
//! refiner's loosely-typed edit values onto the document's typed model.

use labelforge_core::{Palette, PaletteRole};

/// Projects a hex color onto the nearest palette role by Euclidean RGB
/// distance.
pub fn nearest_palette_role(hex: &str, palette: &Palette) -> Option<PaletteRole> {
    let target = parse_hex(hex)?;

    palette
        .roles()
        .into_iter()
        .filter_map(|(role, value)| parse_hex(value).map(|rgb| (role, rgb)))
        .min_by(|(_, a), (_, b)| {
            distance_sq(target, *a)
                .partial_cmp(&distance_sq(target, *b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(role, _)| role)
}

fn parse_hex(hex: &str) -> Option<(f64, f64, f64)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() < 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f64;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f64;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f64;
    Some((r, g, b))
}

fn distance_sq(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2) + (a.2 - b.2).powi(2)
}

/// Parses a relative or absolute font-size value against `current`:
/// `"larger"` → `current + 4`, `"smaller"` → `current - 4`,
/// `"+4"`/`"-2"` → `current + delta`, a bare number → that absolute value.
pub fn parse_relative_font_size(value: &str, current: f64) -> Option<f64> {
    let trimmed = value.trim();
    match trimmed {
        "larger" => return Some(current + 4.0),
        "smaller" => return Some((current - 4.0).max(1.0)),
        _ => {}
    }

    if let Some(delta_str) = trimmed.strip_prefix('+') {
        return delta_str.parse::<f64>().ok().map(|d| current + d);
    }
    if trimmed.starts_with('-') {
        return trimmed.parse::<f64>().ok().map(|d| current + d);
    }

    trimmed.parse::<f64>().ok()
}

/// Splits a bounds-delta edit into its move and resize components, per
/// spec §4.7: `bounds` deltas are split into `move{dx,dy}` and
/// `resize{dw,dh}` edits.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsDelta {
    pub dx: f64,
    pub dy: f64,
    pub dw: f64,
    pub dh: f64,
}

impl BoundsDelta {
    pub fn from_json(value: &serde_json::Value) -> Self {
        let field = |key: &str| value.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0);
        Self {
            dx: field("dx"),
            dy: field("dy"),
            dw: field("dw"),
            dh: field("dh"),
        }
    }

    pub fn is_move(self) -> bool {
        self.dx != 0.0 || self.dy != 0.0
    }

    pub fn is_resize(self) -> bool {
        self.dw != 0.0 || self.dh != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_core::{Contrast, Temperature};

    fn palette() -> Palette {
        Palette {
            primary: "#1a1a1a".to_string(),
            secondary: "#7a1f2b".to_string(),
            accent: "#c9a227".to_string(),
            background: "#f5f0e6".to_string(),
            temperature: Temperature::Warm,
            contrast: Contrast::High,
        }
    }

    #[test]
    fn nearest_role_picks_closest_by_rgb_distance() {
        let p = palette();
        assert_eq!(nearest_palette_role("#1b1b1b", &p), Some(PaletteRole::Primary));
        assert_eq!(nearest_palette_role("#c9a228", &p), Some(PaletteRole::Accent));
    }

    #[test]
    fn relative_font_size_keywords() {
        assert_eq!(parse_relative_font_size("larger", 18.0), Some(22.0));
        assert_eq!(parse_relative_font_size("smaller", 18.0), Some(14.0));
    }

    #[test]
    fn relative_font_size_sign_prefixed_delta() {
        assert_eq!(parse_relative_font_size("+6", 18.0), Some(24.0));
        assert_eq!(parse_relative_font_size("-3", 18.0), Some(15.0));
    }

    #[test]
    fn absolute_font_size_value() {
        assert_eq!(parse_relative_font_size("24", 18.0), Some(24.0));
    }

    #[test]
    fn bounds_delta_splits_move_and_resize() {
        let delta = BoundsDelta::from_json(&serde_json::json!({"dx": 0.05, "dw": -0.1}));
        assert!(delta.is_move());
        assert!(delta.is_resize());
    }
}
