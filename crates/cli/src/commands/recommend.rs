use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::info;
use tradeguard_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use tradeguard_core::errors::ApplicationError;
use tradeguard_core::{RecommendationService, SourceSnapshot, TracingAuditSink};
use uuid::Uuid;

use crate::commands::measures::MeasureView;
use crate::commands::CommandResult;

const COMMAND: &str = "recommend";

#[derive(Debug, Serialize)]
struct RecommendReport {
    command: &'static str,
    status: &'static str,
    product_code: String,
    correlation_id: String,
    measures: Vec<MeasureView>,
    steps: Vec<String>,
}

pub fn run(product_code: &str, snapshot_path: Option<PathBuf>, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions {
        overrides: ConfigOverrides { snapshot_path, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error(COMMAND, &ApplicationError::from(error)),
    };

    let snapshot = match load_snapshot(&config.data.snapshot_path) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            return CommandResult::from_error(
                COMMAND,
                &ApplicationError::Snapshot(format!("{error:#}")),
            );
        }
    };

    let correlation_id = Uuid::new_v4().to_string();
    let recommendation = RecommendationService::new(&snapshot).recommend_with_audit(
        product_code,
        &TracingAuditSink,
        &correlation_id,
    );

    let report = RecommendReport {
        command: COMMAND,
        status: "ok",
        product_code: recommendation.product_code,
        correlation_id,
        measures: recommendation.measures.into_iter().map(MeasureView::from).collect(),
        steps: recommendation.steps,
    };

    if json_output {
        return CommandResult::json(&report);
    }
    CommandResult::text(render_human(&report))
}

fn load_snapshot(path: &Path) -> anyhow::Result<SourceSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read snapshot `{}`", path.display()))?;
    let snapshot: SourceSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("could not parse snapshot `{}`", path.display()))?;

    info!(
        event_name = "snapshot.loaded",
        path = %path.display(),
        countries = snapshot.countries.len(),
        imports = snapshot.imports.len(),
        volumes = snapshot.volumes.len(),
        restrictions = snapshot.restrictions.len(),
        "source snapshot loaded"
    );
    Ok(snapshot)
}

fn render_human(report: &RecommendReport) -> String {
    let mut lines = vec![format!("Recommended measures for {}:", report.product_code)];
    lines.extend(
        report
            .measures
            .iter()
            .map(|measure| format!("  - [{}] {}", measure.code, measure.description)),
    );

    if report.steps.is_empty() {
        lines.push("Decision log: no import records for this product code".to_string());
    } else {
        lines.push("Decision log:".to_string());
        lines.extend(
            report.steps.iter().enumerate().map(|(index, step)| format!("  {}. {step}", index + 1)),
        );
    }

    lines.join("\n")
}
