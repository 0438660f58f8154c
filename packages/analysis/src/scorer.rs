//! Current vulnerability from variable means.

use std::collections::BTreeMap;

use solaris_analysis_models::{Factor, RiskLevel, VulnerabilityResult};
use solaris_variable_models::{Dataset, Variable, VariableReading};

use crate::round2;

/// LST mean (degrees Celsius) that maps to a temperature score of 100.
const MAX_LST_C: f64 = 45.0;

/// Population density (people per km²) that maps to a score of 100.
const MAX_POP_DENSITY: f64 = 10_000.0;

/// Scores a dataset.
///
/// Each variable with at least one reading contributes the factor it maps
/// to. Absent factors contribute zero to the weighted sum; the weights are
/// not renormalized over the factors present. An empty dataset scores 0.
#[must_use]
pub fn score(dataset: &Dataset) -> VulnerabilityResult {
    let factors: BTreeMap<Factor, f64> = dataset
        .iter()
        .filter_map(|(variable, series)| {
            let factor = factor_for(variable)?;
            let mean = mean(series)?;
            Some((factor, factor_score(factor, mean)))
        })
        .collect();

    let overall: f64 = factors
        .iter()
        .map(|(factor, score)| score * factor.weight())
        .sum();
    let level = RiskLevel::from_score(overall);

    log::debug!("Vulnerability score {overall:.4} ({level}) from {} factors", factors.len());

    VulnerabilityResult {
        current_risk: round2(overall),
        factors: factors
            .into_iter()
            .map(|(factor, score)| (factor, round2(score)))
            .collect(),
        level,
    }
}

/// The factor a variable feeds, if any.
#[must_use]
pub const fn factor_for(variable: Variable) -> Option<Factor> {
    match variable {
        Variable::Lst => Some(Factor::Temperature),
        Variable::Ndvi => Some(Factor::Vegetation),
        Variable::Ndbi => Some(Factor::Construction),
        Variable::Ndwi => Some(Factor::Water),
        Variable::PopDens => Some(Factor::Population),
        Variable::NightLights => None,
    }
}

/// Maps a variable mean to its factor score in `[0, 100]`.
#[must_use]
pub fn factor_score(factor: Factor, mean: f64) -> f64 {
    let raw = match factor {
        Factor::Temperature => mean / MAX_LST_C * 100.0,
        Factor::Vegetation => (1.0 - mean) * 100.0,
        Factor::Construction => (mean + 0.2) * 100.0,
        Factor::Water => (1.0 - (mean + 0.5)) * 100.0,
        Factor::Population => mean / MAX_POP_DENSITY * 100.0,
    };
    raw.clamp(0.0, 100.0)
}

#[allow(clippy::cast_precision_loss)]
fn mean(series: &[VariableReading]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    Some(series.iter().map(|r| r.value).sum::<f64>() / series.len() as f64)
}
