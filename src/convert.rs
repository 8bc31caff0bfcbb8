//! Pure conversion functions: TOML config structs -> crate API types.

use anyhow::{Context, Result, bail};

use crate::config::*;

use dhwgen_ensemble::{
    DetrendConfig, EnsembleConfig, GevFitConfig, ParamSpec, ReferencePattern, Site, SiteCoord,
    TimeSeries, TrendAnchor,
};

/// Parses a GEV parameter policy.
pub fn parse_param(p: &ParamToml) -> Result<ParamSpec> {
    match p {
        ParamToml::Value(v) => Ok(ParamSpec::Fixed(*v)),
        ParamToml::Mode(s) => match s.to_lowercase().as_str() {
            "free" => Ok(ParamSpec::Free),
            "sample" => Ok(ParamSpec::FromSample),
            other => bail!("unknown GEV parameter mode: {other:?}"),
        },
    }
}

/// Parses a trend anchor name.
pub fn parse_trend_anchor(s: &str) -> Result<TrendAnchor> {
    match s.to_lowercase().as_str() {
        "generation-index" | "index" => Ok(TrendAnchor::GenerationIndex),
        "timeline" => Ok(TrendAnchor::Timeline),
        other => bail!("unknown trend anchor: {other:?}"),
    }
}

/// Builds a [`GevFitConfig`] from the `[gev]` section.
pub fn build_gev_config(gev: &GevToml) -> Result<GevFitConfig> {
    let cfg = GevFitConfig::new()
        .with_shape(parse_param(&gev.shape).context("gev.shape")?)
        .with_location(parse_param(&gev.location).context("gev.location")?)
        .with_scale(parse_param(&gev.scale).context("gev.scale")?)
        .with_max_iters(gev.max_iters)
        .with_sd_tolerance(gev.sd_tolerance);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds the [`EnsembleConfig`] for one scenario run.
pub fn build_ensemble_config(config: &DhwConfig, seed: Option<u64>) -> Result<EnsembleConfig> {
    let generation = &config.generation;
    let cfg = EnsembleConfig::new()
        .with_n_members(generation.n_members)
        .with_years(generation.start_year, generation.end_year)
        .with_seed_opt(seed)
        .with_max_attempts(generation.max_attempts)
        .with_intensity_quantile(generation.intensity_quantile)
        .with_trend_anchor(parse_trend_anchor(&generation.trend_anchor)?)
        .with_detrend(DetrendConfig::new().with_patience(config.detrend.patience))
        .with_gev(build_gev_config(&config.gev)?);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a yearly series from a start year and values.
pub fn build_series(s: &SeriesToml) -> Result<TimeSeries> {
    Ok(TimeSeries::from_start(s.start_year, s.values.clone())?)
}

/// Builds a projected series.
pub fn build_projection(p: &ProjectionToml) -> Result<TimeSeries> {
    Ok(TimeSeries::from_start(p.start_year, p.values.clone())?)
}

/// Builds the reference pattern from its cells and layers.
pub fn build_reference(r: &ReferenceToml) -> Result<ReferencePattern> {
    let coords: Vec<SiteCoord> = r
        .cells
        .iter()
        .map(|&[lon, lat]| SiteCoord::new(lon, lat))
        .collect();
    Ok(ReferencePattern::from_layers(&coords, &r.layers)?)
}

/// Builds the target sites, attaching per-site histories where given.
pub fn build_sites(sites: &[SiteToml]) -> Result<Vec<Site>> {
    sites
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let coord = SiteCoord::new(s.lon, s.lat);
            match &s.history {
                Some(h) => {
                    let history =
                        build_series(h).with_context(|| format!("history of site {i}"))?;
                    Ok(Site::with_history(coord, history))
                }
                None => Ok(Site::new(coord)),
            }
        })
        .collect()
}

/// Finds the projection for a scenario label.
pub fn find_projection<'a>(
    projections: &'a [ProjectionToml],
    scenario: &str,
) -> Result<&'a ProjectionToml> {
    match projections.iter().find(|p| p.scenario == scenario) {
        Some(p) => Ok(p),
        None => bail!("no projection configured for scenario {scenario:?}"),
    }
}
