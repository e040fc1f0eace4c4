use std::path::{Path, PathBuf};

use super::{Clustering, MapOptions};
use crate::color::MarkerColor;
use crate::context::DashboardContext;
use crate::data::model::PointRecord;

// ---------------------------------------------------------------------------
// Map description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Everything the map widget needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    pub markers: Option<MarkerLayer>,
    pub heat: Option<HeatLayer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayer {
    /// Group nearby markers depending on zoom.
    pub clustered: bool,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: GeoPoint,
    pub icon: MarkerIcon,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerIcon {
    /// Company logo found on disk.
    Custom { path: PathBuf, size: [f32; 2] },
    /// Generic pin in the company's fallback colour.
    Pin { color: MarkerColor },
}

/// Text shown when a marker is selected: bold name, then one line each.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub name: String,
    pub company: String,
    pub category: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatLayer {
    pub points: Vec<GeoPoint>,
    pub radius: f32,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Icon file name for a company: lowercase, no whitespace, `í`/`é` folded.
pub fn logo_file_name(company: &str) -> String {
    let folded: String = company
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'í' => 'i',
            'é' => 'e',
            other => other,
        })
        .collect();
    format!("{folded}.png")
}

/// Custom icon if `<logos_dir>/<company>.png` exists, else a coloured pin.
pub fn marker_icon(record: &PointRecord, ctx: &DashboardContext) -> MarkerIcon {
    let logo = record
        .company
        .as_deref()
        .map(|company| ctx.logos_dir.join(logo_file_name(company)))
        .filter(|path| logo_exists(path));

    match logo {
        Some(path) => MarkerIcon::Custom {
            path,
            size: ctx.map.icon_size,
        },
        None => MarkerIcon::Pin {
            color: ctx.company_colors.color_for(record.company.as_deref()),
        },
    }
}

fn logo_exists(path: &Path) -> bool {
    let found = path.exists();
    if !found {
        log::trace!("No logo at {}", path.display());
    }
    found
}

fn popup(record: &PointRecord) -> Popup {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    Popup {
        name: text(&record.name),
        company: text(&record.company),
        category: text(&record.category),
        address: text(&record.address),
    }
}

/// Build the map layers requested by `options` for the filtered points.
pub fn build_map(points: &[&PointRecord], options: MapOptions, ctx: &DashboardContext) -> MapView {
    let [lat, lon] = ctx.map.center;

    let markers = options.mode.shows_markers().then(|| MarkerLayer {
        clustered: options.clustering == Clustering::Cluster,
        markers: points
            .iter()
            .map(|rec| Marker {
                position: GeoPoint {
                    lat: rec.lat,
                    lon: rec.lon,
                },
                icon: marker_icon(rec, ctx),
                popup: popup(rec),
            })
            .collect(),
    });

    let heat = if options.mode.shows_heat() {
        let heat_points: Vec<GeoPoint> = points
            .iter()
            .filter(|rec| rec.lat.is_finite() && rec.lon.is_finite())
            .map(|rec| GeoPoint {
                lat: rec.lat,
                lon: rec.lon,
            })
            .collect();
        (!heat_points.is_empty()).then(|| HeatLayer {
            points: heat_points,
            radius: ctx.map.heat_radius,
        })
    } else {
        None
    };

    MapView {
        center: GeoPoint { lat, lon },
        zoom: ctx.map.zoom,
        markers,
        heat,
    }
}
