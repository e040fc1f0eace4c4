use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Named marker colours
// ---------------------------------------------------------------------------

/// The fixed set of pin colours a fallback marker can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerColor {
    Blue,
    Green,
    Red,
    Orange,
    Purple,
    DarkRed,
    DarkBlue,
    CadetBlue,
    LightGray,
    Gray,
    Beige,
    Pink,
    LightGreen,
    Black,
}

/// Fallback palette, assigned cyclically to the sorted company names.
pub const MARKER_PALETTE: [MarkerColor; 14] = [
    MarkerColor::Blue,
    MarkerColor::Green,
    MarkerColor::Red,
    MarkerColor::Orange,
    MarkerColor::Purple,
    MarkerColor::DarkRed,
    MarkerColor::DarkBlue,
    MarkerColor::CadetBlue,
    MarkerColor::LightGray,
    MarkerColor::Gray,
    MarkerColor::Beige,
    MarkerColor::Pink,
    MarkerColor::LightGreen,
    MarkerColor::Black,
];

impl MarkerColor {
    /// Pin fill colour, matching the usual web-map marker set.
    pub fn color32(self) -> Color32 {
        match self {
            MarkerColor::Blue => Color32::from_rgb(0x38, 0xaa, 0xdd),
            MarkerColor::Green => Color32::from_rgb(0x72, 0xb0, 0x26),
            MarkerColor::Red => Color32::from_rgb(0xd6, 0x3e, 0x2a),
            MarkerColor::Orange => Color32::from_rgb(0xf6, 0x97, 0x30),
            MarkerColor::Purple => Color32::from_rgb(0xd2, 0x52, 0xb9),
            MarkerColor::DarkRed => Color32::from_rgb(0xa2, 0x33, 0x36),
            MarkerColor::DarkBlue => Color32::from_rgb(0x00, 0x67, 0xa3),
            MarkerColor::CadetBlue => Color32::from_rgb(0x43, 0x69, 0x78),
            MarkerColor::LightGray => Color32::from_rgb(0xa3, 0xa3, 0xa3),
            MarkerColor::Gray => Color32::from_rgb(0x57, 0x57, 0x57),
            MarkerColor::Beige => Color32::from_rgb(0xff, 0xcb, 0x92),
            MarkerColor::Pink => Color32::from_rgb(0xff, 0x8e, 0xe9),
            MarkerColor::LightGreen => Color32::from_rgb(0xbb, 0xf9, 0x70),
            MarkerColor::Black => Color32::from_rgb(0x30, 0x30, 0x30),
        }
    }
}

// ---------------------------------------------------------------------------
// Company → marker colour
// ---------------------------------------------------------------------------

/// Maps every known company to one fallback pin colour.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyColors {
    mapping: BTreeMap<String, MarkerColor>,
    default_color: MarkerColor,
}

impl CompanyColors {
    /// `companies` iterates in sorted order, so identical input always yields
    /// an identical mapping.
    pub fn new(companies: &BTreeSet<String>) -> Self {
        let mapping = companies
            .iter()
            .filter(|c| !c.is_empty())
            .enumerate()
            .map(|(i, c)| (c.clone(), MARKER_PALETTE[i % MARKER_PALETTE.len()]))
            .collect();

        CompanyColors {
            mapping,
            default_color: MarkerColor::Gray,
        }
    }

    /// Look up the colour for a company; unknown companies are gray.
    pub fn color_for(&self, company: Option<&str>) -> MarkerColor {
        company
            .and_then(|c| self.mapping.get(c))
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (company → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(c, color)| (c.clone(), color.color32()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Palettes for charts and the heat overlay
// ---------------------------------------------------------------------------

fn to_color32(rgb: Srgb) -> Color32 {
    let (r, g, b) = rgb.into_format::<u8>().into_components();
    Color32::from_rgb(r, g, b)
}

fn linear(r: u8, g: u8, b: u8) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

/// Sequential light-to-dark blue scale; `t` is clamped to `0..=1`.
pub fn blues(t: f32) -> Color32 {
    let light = linear(0xde, 0xeb, 0xf7);
    let dark = linear(0x08, 0x30, 0x6b);
    to_color32(Srgb::from_linear(light.mix(dark, t.clamp(0.0, 1.0))))
}

/// Heat gradient (blue → cyan → lime → yellow → red) for intensity `t`.
pub fn heat(t: f32) -> Color32 {
    const STOPS: [(f32, (u8, u8, u8)); 5] = [
        (0.4, (0x00, 0x00, 0xff)),
        (0.6, (0x00, 0xff, 0xff)),
        (0.7, (0x00, 0xff, 0x00)),
        (0.8, (0xff, 0xff, 0x00)),
        (1.0, (0xff, 0x00, 0x00)),
    ];
    let t = t.clamp(0.0, 1.0);
    let (first_at, (r, g, b)) = STOPS[0];
    if t <= first_at {
        return to_color32(Srgb::from_linear(linear(r, g, b)));
    }
    for pair in STOPS.windows(2) {
        let (lo_at, (lr, lg, lb)) = pair[0];
        let (hi_at, (hr, hg, hb)) = pair[1];
        if t <= hi_at {
            let f = (t - lo_at) / (hi_at - lo_at);
            let mixed = linear(lr, lg, lb).mix(linear(hr, hg, hb), f);
            return to_color32(Srgb::from_linear(mixed));
        }
    }
    Color32::RED
}

#[cfg(test)]
mod tests {
    use super::*;

    fn companies(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn colors_follow_sorted_order_and_cycle() {
        let names: Vec<String> = (0..16).map(|i| format!("Company {i:02}")).collect();
        let set: BTreeSet<String> = names.iter().cloned().collect();
        let colors = CompanyColors::new(&set);

        assert_eq!(colors.color_for(Some("Company 00")), MarkerColor::Blue);
        assert_eq!(colors.color_for(Some("Company 01")), MarkerColor::Green);
        assert_eq!(colors.color_for(Some("Company 13")), MarkerColor::Black);
        assert_eq!(colors.color_for(Some("Company 14")), MarkerColor::Blue);
        assert_eq!(colors.color_for(Some("Company 15")), MarkerColor::Green);
    }

    #[test]
    fn mapping_is_deterministic() {
        let a = CompanyColors::new(&companies(&["Zeta", "Acme", "Beta"]));
        let b = CompanyColors::new(&companies(&["Beta", "Zeta", "Acme"]));
        assert_eq!(a, b);
        assert_eq!(a.color_for(Some("Acme")), MarkerColor::Blue);
        assert_eq!(a.color_for(Some("Zeta")), MarkerColor::Red);
    }

    #[test]
    fn unmapped_company_is_gray() {
        let colors = CompanyColors::new(&companies(&["Acme"]));
        assert_eq!(colors.color_for(Some("Nobody")), MarkerColor::Gray);
        assert_eq!(colors.color_for(None), MarkerColor::Gray);
    }

    #[test]
    fn blues_darken_with_count() {
        let light = blues(0.0);
        let dark = blues(1.0);
        assert!(dark.b() < light.b());
        assert!(dark.r() < light.r());
    }

    #[test]
    fn heat_ends_in_red() {
        assert_eq!(heat(1.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(heat(0.0), Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn gradient_stops_survive_the_linear_round_trip() {
        assert_eq!(heat(0.6), Color32::from_rgb(0, 255, 255));
        assert_eq!(heat(0.7), Color32::from_rgb(0, 255, 0));
        assert_eq!(heat(0.8), Color32::from_rgb(255, 255, 0));
        assert_eq!(blues(0.0), Color32::from_rgb(0xde, 0xeb, 0xf7));
        assert_eq!(blues(1.0), Color32::from_rgb(0x08, 0x30, 0x6b));
    }
}
