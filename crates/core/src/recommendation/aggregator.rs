use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::domain::source::{Country, RestrictionValue, SourceSnapshot, VolumeKind};
use crate::recommendation::period::CountryImport;

/// Source records for one product code, grouped the way the engine reads them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregatedRecords {
    /// Per-year country entries, value descending, ties by country code.
    pub imports_by_year: BTreeMap<i32, Vec<CountryImport>>,
    pub production_by_year: BTreeMap<i32, Decimal>,
    pub consumption_by_year: BTreeMap<i32, Decimal>,
    /// Flattened restriction bag. Duplicate keys resolve to the last record in
    /// snapshot order.
    pub restrictions: BTreeMap<String, RestrictionValue>,
}

impl AggregatedRecords {
    pub fn has_imports(&self) -> bool {
        !self.imports_by_year.is_empty()
    }
}

pub fn aggregate(product_code: &str, snapshot: &SourceSnapshot) -> AggregatedRecords {
    let registry: HashMap<&str, &Country> =
        snapshot.countries.iter().map(|country| (country.code.as_str(), country)).collect();

    let mut grouped: BTreeMap<i32, BTreeMap<&str, CountryImport>> = BTreeMap::new();
    for record in snapshot.imports.iter().filter(|record| record.product_code == product_code) {
        let quantity = record.quantity.unwrap_or(Decimal::ZERO);
        let entry = grouped
            .entry(record.year)
            .or_default()
            .entry(record.country.as_str())
            .or_insert_with(|| new_entry(&record.country, registry.get(record.country.as_str())));
        entry.value = entry.value.saturating_add(record.value);
        entry.quantity = entry.quantity.saturating_add(quantity);
    }

    let imports_by_year = grouped
        .into_iter()
        .map(|(year, by_country)| {
            let mut entries: Vec<CountryImport> = by_country.into_values().collect();
            entries.sort_by(|left, right| {
                right
                    .value
                    .cmp(&left.value)
                    .then_with(|| left.country_code.cmp(&right.country_code))
            });
            (year, entries)
        })
        .collect();

    let mut production_by_year = BTreeMap::new();
    let mut consumption_by_year = BTreeMap::new();
    for record in snapshot.volumes.iter().filter(|record| record.product_code == product_code) {
        match record.kind {
            VolumeKind::Production => {
                production_by_year.insert(record.year, record.volume);
            }
            VolumeKind::Consumption => {
                consumption_by_year.insert(record.year, record.volume);
            }
            VolumeKind::Import => {}
        }
    }

    let restrictions = snapshot
        .restrictions
        .iter()
        .filter(|record| record.product_code == product_code)
        .map(|record| (record.key.clone(), record.value.clone()))
        .collect();

    AggregatedRecords { imports_by_year, production_by_year, consumption_by_year, restrictions }
}

// Countries missing from the registry count as friendly.
fn new_entry(code: &str, country: Option<&&Country>) -> CountryImport {
    CountryImport {
        country_code: code.to_owned(),
        country_name: country
            .map(|country| country.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(code)
            .to_owned(),
        is_friendly: country.map(|country| country.is_friendly).unwrap_or(true),
        value: Decimal::ZERO,
        quantity: Decimal::ZERO,
    }
}
