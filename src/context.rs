use std::path::PathBuf;

use crate::color::CompanyColors;
use crate::config::{ChartConfig, DashboardConfig, MapConfig};
use crate::data::error::LoadError;
use crate::data::loader::load_points;
use crate::data::model::{Dimension, PointTable};

/// Everything computed once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    pub table: PointTable,
    pub company_colors: CompanyColors,
    pub logos_dir: PathBuf,
    pub map: MapConfig,
    pub charts: ChartConfig,
}

impl DashboardContext {
    pub fn new(table: PointTable, logos_dir: PathBuf, map: MapConfig, charts: ChartConfig) -> Self {
        let company_colors = CompanyColors::new(table.distinct(Dimension::Company));
        Self {
            table,
            company_colors,
            logos_dir,
            map,
            charts,
        }
    }

    /// Read and join both datasets named by the configuration.
    pub fn load(config: &DashboardConfig) -> Result<Self, LoadError> {
        let data = &config.data;
        let table = load_points(
            &data.points_path,
            &data.coords_path,
            &data.points_columns,
            &data.coords_columns,
        )?;
        Ok(Self::new(
            table,
            data.logos_dir.clone(),
            config.map.clone(),
            config.charts.clone(),
        ))
    }
}
