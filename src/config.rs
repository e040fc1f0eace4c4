use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Points dataset (id, name, company, category, neighborhood, address)
    #[arg(long, value_name = "FILE")]
    pub points: Option<PathBuf>,

    /// Coordinates dataset (id, latitude, longitude)
    #[arg(long, value_name = "FILE")]
    pub coords: Option<PathBuf>,

    /// Directory holding `<company>.png` marker icons
    #[arg(long, value_name = "DIR")]
    pub logos: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Configuration file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub map: MapConfig,
    pub charts: ChartConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub points_path: PathBuf,
    pub coords_path: PathBuf,
    pub logos_dir: PathBuf,
    pub points_columns: PointColumns,
    pub coords_columns: CoordColumns,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            points_path: PathBuf::from("Pontos_Concorrencia_Curitiba.xlsx"),
            coords_path: PathBuf::from("lat-long.xlsx"),
            logos_dir: PathBuf::from("logos"),
            points_columns: PointColumns::default(),
            coords_columns: CoordColumns::default(),
        }
    }
}

/// Header names of the points dataset.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointColumns {
    pub id: String,
    pub name: String,
    pub company: String,
    pub category: String,
    pub neighborhood: String,
    pub address: String,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self {
            id: "numero".into(),
            name: "Nome do Ponto".into(),
            company: "Empresa".into(),
            category: "Categoria".into(),
            neighborhood: "Bairro".into(),
            address: "Endereço Completo".into(),
        }
    }
}

/// Header names of the coordinates dataset.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoordColumns {
    pub id: String,
    pub lat: String,
    pub lon: String,
}

impl Default for CoordColumns {
    fn default() -> Self {
        Self {
            id: "enum".into(),
            lat: "lat".into(),
            lon: "lon".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    /// `[latitude, longitude]` the map opens on.
    pub center: [f64; 2],
    /// Web-map zoom level the map opens at.
    pub zoom: u8,
    /// Heat overlay radius, in screen points.
    pub heat_radius: f32,
    /// Custom icon size `[width, height]`, in screen points.
    pub icon_size: [f32; 2],
    /// Markers closer than this (screen points) share a cluster.
    pub cluster_radius: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [-25.4284, -49.2733],
            zoom: 12,
            heat_radius: 15.0,
            icon_size: [30.0, 30.0],
            cluster_radius: 80.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub top_neighborhoods: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_neighborhoods: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
        }
    }
}

impl DashboardConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: DashboardConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Defaults, then the config file, then command-line overrides.
    ///
    /// An explicit `--config` must exist; the implicit `dashboard.toml` is
    /// only read when present.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(points) = &cli.points {
            self.data.points_path = points.clone();
        }
        if let Some(coords) = &cli.coords {
            self.data.coords_path = coords.clone();
        }
        if let Some(logos) = &cli.logos {
            self.data.logos_dir = logos.clone();
        }
    }
}
