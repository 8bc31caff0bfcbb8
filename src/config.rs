use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level dhwgen configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DhwConfig {
    /// Base RNG seed; each scenario derives its own stream from it.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Directory for `dhwRCP<code>.json` outputs.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Ensemble settings.
    #[serde(default)]
    pub generation: GenerationToml,

    /// Trend fit settings.
    #[serde(default)]
    pub detrend: DetrendToml,

    /// GEV fit settings.
    #[serde(default)]
    pub gev: GevToml,

    /// Domain historical yearly maxima.
    pub historical: SeriesToml,

    /// One projection per scenario.
    pub projections: Vec<ProjectionToml>,

    /// Fine reference pattern.
    pub reference: ReferenceToml,

    /// Target sites.
    pub sites: Vec<SiteToml>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationToml {
    #[serde(default = "default_n_members")]
    pub n_members: usize,
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    /// Exclusive.
    #[serde(default = "default_end_year")]
    pub end_year: i32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_intensity_quantile")]
    pub intensity_quantile: f64,
    #[serde(default = "default_trend_anchor")]
    pub trend_anchor: String,
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<String>,
}

impl Default for GenerationToml {
    fn default() -> Self {
        Self {
            n_members: default_n_members(),
            start_year: default_start_year(),
            end_year: default_end_year(),
            max_attempts: default_max_attempts(),
            intensity_quantile: default_intensity_quantile(),
            trend_anchor: default_trend_anchor(),
            scenarios: default_scenarios(),
        }
    }
}

fn default_n_members() -> usize {
    50
}
fn default_start_year() -> i32 {
    2025
}
fn default_end_year() -> i32 {
    2100
}
fn default_max_attempts() -> usize {
    1000
}
fn default_intensity_quantile() -> f64 {
    0.97
}
fn default_trend_anchor() -> String {
    "generation-index".to_string()
}
fn default_scenarios() -> Vec<String> {
    ["2.6", "4.5", "6.0", "8.5"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetrendToml {
    #[serde(default = "default_patience")]
    pub patience: usize,
}

impl Default for DetrendToml {
    fn default() -> Self {
        Self {
            patience: default_patience(),
        }
    }
}

fn default_patience() -> usize {
    200
}

/// A GEV parameter policy: a number fixes the value, `"free"` estimates
/// it, `"sample"` takes it from the fitting window.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamToml {
    Value(f64),
    Mode(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GevToml {
    #[serde(default = "default_shape")]
    pub shape: ParamToml,
    #[serde(default = "default_location")]
    pub location: ParamToml,
    #[serde(default = "default_scale")]
    pub scale: ParamToml,
    #[serde(default = "default_max_iters")]
    pub max_iters: u64,
    #[serde(default = "default_sd_tolerance")]
    pub sd_tolerance: f64,
}

impl Default for GevToml {
    fn default() -> Self {
        Self {
            shape: default_shape(),
            location: default_location(),
            scale: default_scale(),
            max_iters: default_max_iters(),
            sd_tolerance: default_sd_tolerance(),
        }
    }
}

fn default_shape() -> ParamToml {
    ParamToml::Mode("free".to_string())
}
fn default_location() -> ParamToml {
    ParamToml::Value(1.0)
}
fn default_scale() -> ParamToml {
    ParamToml::Value(0.8)
}
fn default_max_iters() -> u64 {
    1000
}
fn default_sd_tolerance() -> f64 {
    1e-8
}

/// Consecutive yearly values starting at `start_year`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesToml {
    pub start_year: i32,
    pub values: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionToml {
    /// Scenario label, e.g. `"4.5"`.
    pub scenario: String,
    pub start_year: i32,
    pub values: Vec<f64>,
}

/// Reference cells and one or more value layers over them.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceToml {
    /// `[lon, lat]` per cell.
    pub cells: Vec<[f64; 2]>,
    /// `layers[k][j]` is the value of cell `j` in layer `k`.
    pub layers: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteToml {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub history: Option<SeriesToml>,
}

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<DhwConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [historical]
        start_year = 2015
        values = [3.0, 4.0, 2.5]

        [[projections]]
        scenario = "4.5"
        start_year = 2025
        values = [5.0, 5.5]

        [reference]
        cells = [[0.0, 0.0], [10.0, 10.0]]
        layers = [[1.0, -1.0]]

        [[sites]]
        lon = 0.0
        lat = 0.0
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: DhwConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.generation.n_members, 50);
        assert_eq!(cfg.generation.start_year, 2025);
        assert_eq!(cfg.generation.end_year, 2100);
        assert_eq!(cfg.generation.scenarios, vec!["2.6", "4.5", "6.0", "8.5"]);
        assert_eq!(cfg.gev.location, ParamToml::Value(1.0));
        assert_eq!(cfg.gev.shape, ParamToml::Mode("free".to_string()));
        assert_eq!(cfg.detrend.patience, 200);
        assert_eq!(cfg.sites.len(), 1);
        assert!(cfg.sites[0].history.is_none());
    }

    #[test]
    fn unknown_field_rejected() {
        let text = format!("bogus = 1\n{MINIMAL}");
        assert!(toml::from_str::<DhwConfig>(&text).is_err());
    }

    #[test]
    fn site_history_and_gev_modes_parse() {
        let text = format!(
            "seed = 9\n[gev]\nshape = 0.1\nlocation = \"sample\"\nscale = \"free\"\n{}\n\
             [sites.history]\nstart_year = 2015\nvalues = [1.0, 2.0, 3.0]\n",
            MINIMAL
        );
        let cfg: DhwConfig = toml::from_str(&text).unwrap();
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.gev.shape, ParamToml::Value(0.1));
        assert_eq!(cfg.gev.location, ParamToml::Mode("sample".to_string()));
        assert_eq!(cfg.sites[0].history.as_ref().unwrap().values.len(), 3);
    }
}
