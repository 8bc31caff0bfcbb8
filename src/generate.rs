use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use dhwgen_ensemble::{EnsembleResult, generate_ensemble, mix_seed, rcp_code};

use crate::cli::GenerateArgs;
use crate::config::{self, DhwConfig};
use crate::convert;

/// Serialized form of one scenario's ensemble.
#[derive(Serialize)]
struct EnsembleFile<'a> {
    scenario: &'a str,
    seed: u64,
    /// `[member, site, year]`.
    dims: [usize; 3],
    years: &'a [i32],
    /// `[lon, lat]` per site.
    sites: Vec<[f64; 2]>,
    intensity_threshold: f64,
    /// Member-major, then site, then year.
    values: &'a [f64],
    warnings: Vec<WarningRecord>,
}

#[derive(Serialize)]
struct WarningRecord {
    site: usize,
    member: usize,
    year: i32,
    attempts: usize,
}

impl<'a> EnsembleFile<'a> {
    fn new(scenario: &'a str, result: &'a EnsembleResult) -> Self {
        let array = result.array();
        let warnings = result
            .warnings()
            .iter()
            .map(|w| WarningRecord {
                site: w.site,
                member: w.member,
                year: array.years()[w.year_index],
                attempts: w.attempts,
            })
            .collect();
        Self {
            scenario,
            seed: result.seed(),
            dims: [array.n_members(), array.n_sites(), array.n_years()],
            years: array.years(),
            sites: array.sites().iter().map(|c| [c.lon, c.lat]).collect(),
            intensity_threshold: result.intensity_threshold(),
            values: array.values(),
            warnings,
        }
    }
}

/// Output path for a scenario label, e.g. `dhwRCP45.json`.
fn output_path(dir: &Path, scenario: &str) -> PathBuf {
    dir.join(format!("dhwRCP{}.json", rcp_code(scenario)))
}

/// Run the generation pipeline for every configured scenario.
pub fn run(args: GenerateArgs) -> Result<()> {
    let mut config: DhwConfig = config::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }

    // Inputs shared by every scenario
    let historical = convert::build_series(&config.historical).context("historical series")?;
    let pattern = convert::build_reference(&config.reference).context("reference pattern")?;
    let sites = convert::build_sites(&config.sites)?;
    info!(
        n_hist = historical.len(),
        n_sites = sites.len(),
        n_cells = pattern.cells().len(),
        "inputs loaded"
    );

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    for (k, scenario) in config.generation.scenarios.iter().enumerate() {
        let seed = config.seed.map(|s| mix_seed(s, &[k as u64]));
        let ens_cfg = convert::build_ensemble_config(&config, seed)?;
        let projection = convert::find_projection(&config.projections, scenario)
            .and_then(convert::build_projection)
            .with_context(|| format!("projection for scenario {scenario:?}"))?;

        info!(scenario = %scenario, "generating ensemble");
        let result = generate_ensemble(&historical, &projection, &sites, &pattern, &ens_cfg)
            .with_context(|| format!("scenario {scenario:?} failed"))?;
        if !result.warnings().is_empty() {
            warn!(
                scenario = %scenario,
                n_clamped = result.warnings().len(),
                "some draws were clamped after exhausting the rejection budget"
            );
        }

        let path = output_path(&config.output_dir, scenario);
        let json = serde_json::to_string(&EnsembleFile::new(scenario, &result))
            .context("failed to serialize ensemble")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write output: {}", path.display()))?;
        info!(
            scenario = %scenario,
            seed = result.seed(),
            path = %path.display(),
            "ensemble written"
        );
    }

    info!("generation complete");
    Ok(())
}
