//! Intensity-scaled spatial blending.

/// Share of the site deviation applied to a raw value.
///
/// Full (1.0) at or above `threshold` and `raw / threshold` below it, so a
/// negative raw value gets a negative share. A non-positive `threshold`
/// has no proportional range: positive raw values get the full deviation
/// and the rest get none.
pub fn intensity_factor(raw: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return if raw > 0.0 { 1.0 } else { 0.0 };
    }
    if raw >= threshold {
        1.0
    } else {
        raw / threshold
    }
}

/// Adds the intensity-scaled deviation and clamps the result at zero.
pub fn blend(raw: f64, deviation: f64, threshold: f64) -> f64 {
    (raw + deviation * intensity_factor(raw, threshold)).max(0.0)
}
