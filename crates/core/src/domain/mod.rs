pub mod measure;
pub mod source;

pub use measure::Measure;
pub use source::{
    Country, ImportRecord, RestrictionRecord, RestrictionValue, SourceSnapshot, VolumeKind,
    VolumeRecord,
};
