/// Toolkit-independent rendering: one call per interaction turns the
/// current criteria into a map description and three chart tables.
///
/// ```text
///  FilterCriteria + MapOptions
///        │
///        ▼
///   filtered_indices ──► map::build_map    ──► MapView
///                    └─► stats::build_charts ─► Charts
/// ```
pub mod map;
pub mod screen;
pub mod stats;

use crate::context::DashboardContext;
use crate::data::filter::{filtered_indices, FilterCriteria};
use crate::data::model::PointRecord;

use map::MapView;
use stats::Charts;

/// What the map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    Markers,
    Heat,
    #[default]
    Both,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [DisplayMode::Markers, DisplayMode::Heat, DisplayMode::Both];

    pub fn shows_markers(self) -> bool {
        matches!(self, DisplayMode::Markers | DisplayMode::Both)
    }

    pub fn shows_heat(self) -> bool {
        matches!(self, DisplayMode::Heat | DisplayMode::Both)
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Markers => "Clusters with pins/logos",
            DisplayMode::Heat => "Heatmap",
            DisplayMode::Both => "Both",
        }
    }
}

/// Whether markers are grouped into a zoom-dependent cluster layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clustering {
    #[default]
    Cluster,
    Individual,
}

impl Clustering {
    pub fn label(self) -> &'static str {
        match self {
            Clustering::Cluster => "Yes (cluster)",
            Clustering::Individual => "No (show all)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapOptions {
    pub mode: DisplayMode,
    pub clustering: Clustering,
}

/// Result of one recomputation pass.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Indices into the joined table of the records that passed the filters.
    pub visible: Vec<usize>,
    pub map: MapView,
    pub charts: Charts,
}

/// Filter, then derive the map and the charts from the same subset.
pub fn render(criteria: &FilterCriteria, options: MapOptions, ctx: &DashboardContext) -> RenderOutput {
    let visible = filtered_indices(&ctx.table, criteria);
    let points: Vec<&PointRecord> = visible.iter().map(|&i| &ctx.table.records[i]).collect();

    let map = map::build_map(&points, options, ctx);
    let charts = stats::build_charts(&points, ctx.charts.top_neighborhoods);
    log::debug!(
        "Rendered {} of {} points ({} markers, heat: {})",
        points.len(),
        ctx.table.len(),
        map.markers.as_ref().map_or(0, |layer| layer.markers.len()),
        map.heat.is_some()
    );

    RenderOutput {
        visible,
        map,
        charts,
    }
}
