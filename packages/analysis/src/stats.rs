//! Descriptive statistics per variable.

use std::collections::BTreeMap;

use solaris_analysis_models::SummaryStats;
use solaris_variable_models::{Dataset, Variable, VariableReading};

/// Summarizes the values of `series`, or `None` when it is empty.
///
/// The standard deviation is the population one (divides by `n`).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(series: &[VariableReading]) -> Option<SummaryStats> {
    let mut values: Vec<f64> = series.iter().map(|r| r.value).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let middle = count / 2;
    let median = if count % 2 == 0 {
        f64::midpoint(values[middle - 1], values[middle])
    } else {
        values[middle]
    };

    Some(SummaryStats {
        count,
        min: values[0],
        max: values[count - 1],
        mean,
        median,
        std_dev: variance.sqrt(),
    })
}

/// Summarizes every non-empty series in `dataset`.
#[must_use]
pub fn summarize_dataset(dataset: &Dataset) -> BTreeMap<Variable, SummaryStats> {
    dataset
        .iter()
        .filter_map(|(variable, series)| Some((variable, summarize(series)?)))
        .collect()
}
