pub mod aggregator;
pub mod analyzer;
pub mod period;
pub mod trend;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit::{AuditEvent, AuditOutcome, AuditSink};
use crate::domain::measure::Measure;
use crate::domain::source::SourceSnapshot;

use self::{
    aggregator::aggregate,
    analyzer::{
        AnalysisInput, DeterministicAnalyzer, MeasureAnalyzer, NonTariffSnapshot, TariffSnapshot,
    },
    trend::TrendContext,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_code: String,
    /// Unique, first-occurrence order, never empty.
    pub measures: Vec<Measure>,
    pub steps: Vec<String>,
}

impl Recommendation {
    pub fn codes(&self) -> Vec<u8> {
        self.measures.iter().map(|measure| measure.code()).collect()
    }

    fn fallback(product_code: &str) -> Self {
        Self {
            product_code: product_code.to_owned(),
            measures: vec![Measure::NoAction],
            steps: Vec::new(),
        }
    }
}

/// Runs recommendations against a borrowed, read-only source snapshot.
///
/// Every call derives its aggregates from scratch, so one service can be
/// shared across threads for different product codes.
pub struct RecommendationService<'a, A = DeterministicAnalyzer> {
    snapshot: &'a SourceSnapshot,
    analyzer: A,
}

impl<'a> RecommendationService<'a, DeterministicAnalyzer> {
    pub fn new(snapshot: &'a SourceSnapshot) -> Self {
        Self::with_analyzer(snapshot, DeterministicAnalyzer)
    }
}

impl<'a, A> RecommendationService<'a, A>
where
    A: MeasureAnalyzer,
{
    pub fn with_analyzer(snapshot: &'a SourceSnapshot, analyzer: A) -> Self {
        Self { snapshot, analyzer }
    }

    /// `None` when the product code has no import records.
    pub fn build_input(&self, product_code: &str) -> Option<AnalysisInput> {
        let records = aggregate(product_code, self.snapshot);
        let tariff = TariffSnapshot::from_restrictions(&records.restrictions);
        let non_tariff = NonTariffSnapshot::from_restrictions(&records.restrictions);
        let trend = TrendContext::build(records)?;

        Some(AnalysisInput { product_code: product_code.to_owned(), trend, tariff, non_tariff })
    }

    pub fn recommend(&self, product_code: &str) -> Recommendation {
        self.evaluate(product_code).0
    }

    /// Pairs the recommendation with whether the decision tree actually ran.
    fn evaluate(&self, product_code: &str) -> (Recommendation, AuditOutcome) {
        let Some(input) = self.build_input(product_code) else {
            info!(
                event_name = "recommendation.no_import_data",
                product_code = %product_code,
                "no import records for product code, returning fallback"
            );
            return (Recommendation::fallback(product_code), AuditOutcome::Fallback);
        };

        let analysis = self.analyzer.analyze(&input);
        let mut measures = dedupe_preserving_order(analysis.measures);
        if measures.is_empty() {
            measures.push(Measure::NoAction);
        }

        let recommendation = Recommendation {
            product_code: product_code.to_owned(),
            measures,
            steps: analysis.steps,
        };
        info!(
            event_name = "recommendation.completed",
            product_code = %product_code,
            current_year = input.trend.current_year(),
            measures = ?recommendation.codes(),
            steps = recommendation.steps.len(),
            "recommendation completed"
        );
        (recommendation, AuditOutcome::Evaluated)
    }

    pub fn recommend_with_audit<S>(
        &self,
        product_code: &str,
        sink: &S,
        correlation_id: &str,
    ) -> Recommendation
    where
        S: AuditSink,
    {
        let (recommendation, outcome) = self.evaluate(product_code);
        let event_type = match outcome {
            AuditOutcome::Evaluated => "recommendation.evaluated",
            AuditOutcome::Fallback => "recommendation.no_import_data",
        };
        let codes: Vec<String> =
            recommendation.codes().iter().map(|code| code.to_string()).collect();

        sink.emit(
            AuditEvent::new(product_code, correlation_id, event_type, outcome)
                .with_metadata("measures", codes.join(","))
                .with_metadata("steps", recommendation.steps.len().to_string()),
        );
        recommendation
    }
}

fn dedupe_preserving_order(measures: Vec<Measure>) -> Vec<Measure> {
    let mut seen = HashSet::new();
    measures.into_iter().filter(|measure| seen.insert(*measure)).collect()
}
