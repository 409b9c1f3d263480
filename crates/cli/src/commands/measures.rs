use serde::Serialize;
use tradeguard_core::Measure;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
pub(crate) struct MeasureView {
    pub code: u8,
    pub description: &'static str,
}

impl From<Measure> for MeasureView {
    fn from(measure: Measure) -> Self {
        Self { code: measure.code(), description: measure.description() }
    }
}

#[derive(Debug, Serialize)]
struct MeasuresReport {
    command: &'static str,
    status: &'static str,
    measures: Vec<MeasureView>,
}

pub fn run(json_output: bool) -> CommandResult {
    if json_output {
        return CommandResult::json(&MeasuresReport {
            command: "measures",
            status: "ok",
            measures: Measure::ALL.into_iter().map(MeasureView::from).collect(),
        });
    }

    let lines: Vec<String> = Measure::ALL
        .into_iter()
        .map(|measure| format!("{} {}", measure.code(), measure.description()))
        .collect();
    CommandResult::text(lines.join("\n"))
}
