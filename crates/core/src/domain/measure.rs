use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Trade-defense measure catalog. Codes are stable and exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Measure {
    RaiseTariff,
    BanUnfriendlyImports,
    AntiDumpingInvestigation,
    ProcurementBan,
    MandatoryCertification,
    NoAction,
}

const CATALOG: [(Measure, u8, &str); 6] = [
    (Measure::RaiseTariff, 1, "Measure 1: Raise the customs tariff rate"),
    (Measure::BanUnfriendlyImports, 2, "Measure 2: Ban imports from unfriendly countries"),
    (
        Measure::AntiDumpingInvestigation,
        3,
        "Measure 3: Anti-dumping investigation against the top supplier",
    ),
    (
        Measure::ProcurementBan,
        4,
        "Measure 4: Exclude goods from unfriendly countries from government procurement",
    ),
    (Measure::MandatoryCertification, 5, "Measure 5: Introduce mandatory certification"),
    (Measure::NoAction, 6, "Measure 6: No additional measures required"),
];

impl Measure {
    pub const ALL: [Measure; 6] = [
        Measure::RaiseTariff,
        Measure::BanUnfriendlyImports,
        Measure::AntiDumpingInvestigation,
        Measure::ProcurementBan,
        Measure::MandatoryCertification,
        Measure::NoAction,
    ];

    pub fn code(self) -> u8 {
        CATALOG[self.index()].1
    }

    pub fn description(self) -> &'static str {
        CATALOG[self.index()].2
    }

    fn index(self) -> usize {
        match self {
            Self::RaiseTariff => 0,
            Self::BanUnfriendlyImports => 1,
            Self::AntiDumpingInvestigation => 2,
            Self::ProcurementBan => 3,
            Self::MandatoryCertification => 4,
            Self::NoAction => 5,
        }
    }
}

impl TryFrom<u8> for Measure {
    type Error = DomainError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        CATALOG
            .iter()
            .find(|(_, catalog_code, _)| *catalog_code == code)
            .map(|(measure, _, _)| *measure)
            .ok_or(DomainError::UnknownMeasureCode(code))
    }
}

impl From<Measure> for u8 {
    fn from(measure: Measure) -> Self {
        measure.code()
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MEASURE_{}", self.code())
    }
}
