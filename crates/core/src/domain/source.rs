//! Typed source records consumed by the recommendation engine.
//!
//! Parsing of raw rows is a loader concern; these types are what a loader
//! hands over. Restriction values stay loosely typed because the upstream
//! registry mixes booleans, numbers and localized strings under the same key.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub is_friendly: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub product_code: String,
    pub country: String,
    pub year: i32,
    pub value: Decimal,
    #[serde(default)]
    pub quantity: Option<Decimal>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeKind {
    Import,
    Production,
    Consumption,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub product_code: String,
    pub kind: VolumeKind,
    pub year: i32,
    pub volume: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionRecord {
    pub product_code: String,
    pub key: String,
    #[serde(default)]
    pub value: RestrictionValue,
}

/// Immutable input for one or more recommendation runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub imports: Vec<ImportRecord>,
    #[serde(default)]
    pub volumes: Vec<VolumeRecord>,
    #[serde(default)]
    pub restrictions: Vec<RestrictionRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RestrictionValue {
    #[default]
    Absent,
    Bool(bool),
    Number(Decimal),
    Text(String),
}

impl RestrictionValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Coerces the value to a flag. Unrecognized text yields `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Absent => None,
            Self::Bool(flag) => Some(*flag),
            Self::Number(number) => Some(!number.is_zero()),
            Self::Text(text) => match text.trim().to_lowercase().as_str() {
                "" | "none" | "null" => None,
                "true" | "1" | "yes" | "y" | "да" => Some(true),
                "false" | "0" | "no" | "n" | "нет" => Some(false),
                _ => None,
            },
        }
    }

    /// Coerces the value to a number. A trailing `%` is scaled by 1/100 so
    /// `"85%"` and `0.85` are the same rate.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Absent => None,
            Self::Bool(flag) => Some(if *flag { Decimal::ONE } else { Decimal::ZERO }),
            Self::Number(number) => Some(*number),
            Self::Text(text) => parse_localized_decimal(text),
        }
    }
}

fn parse_localized_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let (body, is_percent) = match trimmed.strip_suffix('%') {
        Some(body) => (body.trim_end(), true),
        None => (trimmed, false),
    };
    if body.is_empty() {
        return None;
    }

    let normalized = body.replace(',', ".");
    let parsed = Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()?;

    if is_percent {
        parsed.checked_div(Decimal::ONE_HUNDRED)
    } else {
        Some(parsed)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRestrictionValue {
    Bool(bool),
    Number(Decimal),
    Text(String),
}

impl<'de> Deserialize<'de> for RestrictionValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawRestrictionValue>::deserialize(deserializer)?;
        Ok(match raw {
            None => Self::Absent,
            Some(RawRestrictionValue::Bool(flag)) => Self::Bool(flag),
            Some(RawRestrictionValue::Number(number)) => Self::Number(number),
            Some(RawRestrictionValue::Text(text)) => Self::Text(text),
        })
    }
}

impl Serialize for RestrictionValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Number(number) => Serialize::serialize(number, serializer),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}
