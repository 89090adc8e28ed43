//! JSON reports

use crate::istanbul::{CoverageMap, CoverageSummary};
use crate::result::V8CovResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// The coverage map itself, pretty printed
pub fn render_json(map: &CoverageMap) -> V8CovResult<String> {
    Ok(serde_json::to_string_pretty(map)?)
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    total: CoverageSummary,
    #[serde(flatten)]
    files: BTreeMap<&'a str, CoverageSummary>,
}

/// `{"total": ..., "<path>": ...}` with totals first
pub fn render_json_summary(map: &CoverageMap) -> V8CovResult<String> {
    let report = JsonSummary {
        total: map.summary(),
        files: map.iter().map(|fc| (fc.path.as_str(), fc.summary())).collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
