use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lighten, Srgb};

use crate::data::model::Churn;

// ---------------------------------------------------------------------------
// Dashboard theme
// ---------------------------------------------------------------------------

const CHURN_YES: [u8; 3] = [0xFF, 0x4B, 0x4B];
const CHURN_NO: [u8; 3] = [0x00, 0xCC, 0x96];
const BACKGROUND: [u8; 3] = [0xF4, 0xF7, 0xF6];
const TEXT: [u8; 3] = [0x2C, 0x3E, 0x50];
const MUTED: [u8; 3] = [0x7F, 0x8C, 0x8D];

fn rgb([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

pub fn background() -> Color32 {
    rgb(BACKGROUND)
}

pub fn text() -> Color32 {
    rgb(TEXT)
}

pub fn muted() -> Color32 {
    rgb(MUTED)
}

/// Stroke colour for a churn outcome.
pub fn churn_color(churn: Churn) -> Color32 {
    match churn {
        Churn::Yes => rgb(CHURN_YES),
        Churn::No => rgb(CHURN_NO),
    }
}

/// A lighter variant of the churn colour for filled areas (box bodies).
/// `amount` in `[0, 1]` is the fraction of the remaining lightness added.
pub fn churn_fill(churn: Churn, amount: f32) -> Color32 {
    let base = match churn {
        Churn::Yes => CHURN_YES,
        Churn::No => CHURN_NO,
    };
    lighten(base, amount)
}

fn lighten([r, g, b]: [u8; 3], amount: f32) -> Color32 {
    let srgb: Srgb = Srgb::<u8>::new(r, g, b).into_format::<f32>();
    let hsl: Hsl = srgb.into_color();
    let lighter: Srgb = hsl.lighten(amount.clamp(0.0, 1.0)).into_color();
    Color32::from_rgb(
        (lighter.red * 255.0).round() as u8,
        (lighter.green * 255.0).round() as u8,
        (lighter.blue * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_colours_are_distinct() {
        assert_ne!(churn_color(Churn::Yes), churn_color(Churn::No));
        assert_eq!(churn_color(Churn::Yes), Color32::from_rgb(0xFF, 0x4B, 0x4B));
    }

    #[test]
    fn fill_is_lighter_than_stroke() {
        let stroke = churn_color(Churn::No);
        let fill = churn_fill(Churn::No, 0.4);
        let sum = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(sum(fill) > sum(stroke));
    }

    #[test]
    fn zero_lightening_keeps_the_colour() {
        assert_eq!(churn_fill(Churn::Yes, 0.0), churn_color(Churn::Yes));
    }
}
