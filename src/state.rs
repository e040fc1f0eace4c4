use crate::context::DashboardContext;
use crate::data::filter::FilterCriteria;
use crate::data::model::Dimension;
use crate::render::map::GeoPoint;
use crate::render::{render, Clustering, DisplayMode, MapOptions, RenderOutput};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Joined table and colour mapping, read-only after startup.
    pub context: DashboardContext,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Display mode and clustering toggle.
    pub options: MapOptions,

    /// Output of the last recomputation pass (cached until a control changes).
    pub output: RenderOutput,

    /// Marker whose popup is open, as an index into `output.map` markers.
    pub selected_marker: Option<usize>,

    /// Map viewport requests for the next frame.
    pub view: ViewRequest,
}

/// Pending changes to the map viewport, consumed by the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ViewRequest {
    /// Re-center on the configured center and zoom.
    #[default]
    Reset,
    /// Center on a point at a given zoom level, e.g. a clicked cluster.
    Focus { center: GeoPoint, zoom: f64 },
    None,
}

impl AppState {
    /// Start with every value selected, mode "both" and clustering on.
    pub fn new(context: DashboardContext) -> Self {
        let criteria = FilterCriteria::select_all(&context.table);
        let options = MapOptions::default();
        let output = render(&criteria, options, &context);
        Self {
            context,
            criteria,
            options,
            output,
            selected_marker: None,
            view: ViewRequest::Reset,
        }
    }

    /// Recompute filter → map + charts after any control change.
    pub fn refresh(&mut self) {
        self.output = render(&self.criteria, self.options, &self.context);
        self.selected_marker = None;
    }

    pub fn set_search(&mut self, search: String) {
        if self.criteria.search != search {
            self.criteria.search = search;
            self.refresh();
        }
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.options.mode != mode {
            self.options.mode = mode;
            self.refresh();
        }
    }

    pub fn set_clustering(&mut self, clustering: Clustering) {
        if self.options.clustering != clustering {
            self.options.clustering = clustering;
            self.refresh();
        }
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.criteria.selected_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refresh();
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        let all = self.context.table.distinct(dim).clone();
        *self.criteria.selected_mut(dim) = all;
        self.refresh();
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.criteria.selected_mut(dim).clear();
        self.refresh();
    }

    pub fn visible_count(&self) -> usize {
        self.output.visible.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChartConfig, MapConfig};
    use crate::data::model::{PointRecord, PointTable};

    fn state() -> AppState {
        let rec = |id, company: &str| PointRecord {
            id,
            name: Some(format!("P{id}")),
            company: Some(company.into()),
            category: Some("Food".into()),
            neighborhood: Some("Centro".into()),
            address: None,
            lat: -25.4,
            lon: -49.2,
        };
        let ctx = DashboardContext::new(
            PointTable::from_records(vec![rec(1, "Acme"), rec(2, "Beta")]),
            "logos".into(),
            MapConfig::default(),
            ChartConfig::default(),
        );
        AppState::new(ctx)
    }

    #[test]
    fn starts_unfiltered_with_both_layers_clustered() {
        let state = state();
        assert_eq!(state.visible_count(), 2);
        assert_eq!(state.options.mode, DisplayMode::Both);
        assert_eq!(state.options.clustering, Clustering::Cluster);
    }

    #[test]
    fn controls_trigger_recomputation() {
        let mut state = state();

        state.toggle_filter_value(Dimension::Company, "Acme");
        assert_eq!(state.visible_count(), 1);

        state.select_none(Dimension::Category);
        assert_eq!(state.visible_count(), 0);

        state.select_all(Dimension::Category);
        state.toggle_filter_value(Dimension::Company, "Acme");
        assert_eq!(state.visible_count(), 2);

        state.set_search("p2".into());
        assert_eq!(state.output.visible, vec![1]);

        state.set_mode(DisplayMode::Heat);
        assert!(state.output.map.markers.is_none());
    }
}
