pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommendation;

pub use audit::{AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use domain::measure::Measure;
pub use domain::source::{
    Country, ImportRecord, RestrictionRecord, RestrictionValue, SourceSnapshot, VolumeKind,
    VolumeRecord,
};
pub use errors::{ApplicationError, DomainError};
pub use recommendation::analyzer::{
    Analysis, AnalysisInput, DeterministicAnalyzer, MeasureAnalyzer, NonTariffSnapshot,
    TariffSnapshot,
};
pub use recommendation::{Recommendation, RecommendationService};
