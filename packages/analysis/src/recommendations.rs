//! Mitigation advice for high-scoring factors.

use solaris_analysis_models::{Factor, VulnerabilityResult};

/// Factor score strictly above which a recommendation is emitted.
pub const RECOMMENDATION_THRESHOLD: f64 = 70.0;

/// Mitigation advice for one factor.
#[must_use]
pub const fn advice(factor: Factor) -> &'static str {
    match factor {
        Factor::Temperature => "Implement green corridors to lower surface temperature",
        Factor::Vegetation => "Increase urban tree cover with parks and street planting",
        Factor::Construction => "Promote green roofs and permeable paving",
        Factor::Water => "Create water retention areas and reflecting pools",
        Factor::Population => "Prioritise high-density areas for interventions",
    }
}

/// One recommendation per factor scoring above 70, in factor order.
#[must_use]
pub fn recommendations(result: &VulnerabilityResult) -> Vec<String> {
    Factor::all()
        .iter()
        .filter(|factor| {
            result
                .factor(**factor)
                .is_some_and(|score| score > RECOMMENDATION_THRESHOLD)
        })
        .map(|factor| advice(*factor).to_string())
        .collect()
}
