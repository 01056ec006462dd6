use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use credit_dashboard::risk::TierColor;

fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Risk tier colours
// ---------------------------------------------------------------------------

pub fn tier_color(tag: TierColor) -> Color32 {
    match tag {
        TierColor::Green => from_hsl(125.0, 0.60, 0.40),
        TierColor::Orange => from_hsl(32.0, 0.95, 0.50),
        TierColor::Red => from_hsl(0.0, 0.80, 0.50),
    }
}

// ---------------------------------------------------------------------------
// Attribution bars: red pushes towards default, blue away from it
// ---------------------------------------------------------------------------

/// Colour for a contribution, saturating with its share of `max_abs`.
pub fn attribution_color(value: f64, max_abs: f64) -> Color32 {
    let strength = if max_abs > 0.0 {
        (value.abs() / max_abs).clamp(0.0, 1.0) as f32
    } else {
        0.0
    };
    let hue = if value >= 0.0 { 350.0 } else { 210.0 };
    from_hsl(hue, 0.35 + 0.55 * strength, 0.65 - 0.15 * strength)
}

/// Neutral colour for descriptive charts.
pub fn population_color() -> Color32 {
    from_hsl(205.0, 0.55, 0.55)
}

/// Highlight for the selected client.
pub fn client_color() -> Color32 {
    tier_color(TierColor::Green)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribution_sign_picks_hue() {
        let pos = attribution_color(1.0, 1.0);
        let neg = attribution_color(-1.0, 1.0);
        assert!(pos.r() > pos.b());
        assert!(neg.b() > neg.r());
    }

    #[test]
    fn tier_colors_are_distinct() {
        let c = [
            tier_color(TierColor::Green),
            tier_color(TierColor::Orange),
            tier_color(TierColor::Red),
        ];
        assert_ne!(c[0], c[1]);
        assert_ne!(c[1], c[2]);
        assert!(c[2].r() > c[2].g());
    }
}
