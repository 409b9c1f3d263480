use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::recommendation::aggregator::AggregatedRecords;
use crate::recommendation::period::{ratio, saturating_sum, PeriodSummary};

/// Cross-period view used by the decision tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrendContext {
    current_year: i32,
    previous_year: Option<i32>,
    periods: BTreeMap<i32, PeriodSummary>,
    production: Decimal,
    consumption: Decimal,
    production_previous: Option<Decimal>,
    production_history: BTreeMap<i32, Decimal>,
}

impl TrendContext {
    /// Returns `None` when the product code has no import records.
    pub fn build(records: AggregatedRecords) -> Option<Self> {
        let AggregatedRecords { imports_by_year, production_by_year, consumption_by_year, .. } =
            records;

        let mut years = imports_by_year.keys().rev();
        let current_year = *years.next()?;
        let previous_year = years.next().copied();

        let periods: BTreeMap<i32, PeriodSummary> = imports_by_year
            .into_iter()
            .map(|(year, imports)| (year, PeriodSummary::new(year, imports)))
            .collect();

        let production = production_by_year.get(&current_year).copied().unwrap_or(Decimal::ZERO);
        let consumption = consumption_by_year.get(&current_year).copied().unwrap_or(Decimal::ZERO);
        let production_previous =
            previous_year.and_then(|year| production_by_year.get(&year).copied());

        Some(Self {
            current_year,
            previous_year,
            periods,
            production,
            consumption,
            production_previous,
            production_history: production_by_year,
        })
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn previous_year(&self) -> Option<i32> {
        self.previous_year
    }

    pub fn current(&self) -> &PeriodSummary {
        // `build` only constructs a context when the current year has a period.
        &self.periods[&self.current_year]
    }

    pub fn previous(&self) -> Option<&PeriodSummary> {
        self.previous_year.and_then(|year| self.periods.get(&year))
    }

    pub fn get_period(&self, year: i32) -> Option<&PeriodSummary> {
        self.periods.get(&year)
    }

    /// Up to `window` periods strictly before the current year, most recent first.
    pub fn prior_periods(&self, window: usize) -> Vec<&PeriodSummary> {
        self.periods
            .range(..self.current_year)
            .rev()
            .take(window)
            .map(|(_, period)| period)
            .collect()
    }

    pub fn production(&self) -> Decimal {
        self.production
    }

    pub fn consumption(&self) -> Decimal {
        self.consumption
    }

    pub fn production_previous(&self) -> Option<Decimal> {
        self.production_previous
    }

    pub fn production_history(&self) -> &BTreeMap<i32, Decimal> {
        &self.production_history
    }

    pub fn is_production_sufficient(&self) -> bool {
        self.production >= self.consumption
    }

    pub fn is_production_growing(&self) -> bool {
        self.production_previous.map(|previous| self.production > previous).unwrap_or(false)
    }

    pub fn total_import_growing(&self) -> bool {
        self.compare_previous(|current, previous| current.total_value() > previous.total_value())
    }

    pub fn total_quantity_growing(&self) -> bool {
        self.compare_previous(|current, previous| {
            current.total_quantity() > previous.total_quantity()
        })
    }

    pub fn unfriendly_share_declining(&self) -> bool {
        self.compare_previous(|current, previous| {
            current.unfriendly_share() < previous.unfriendly_share()
        })
    }

    /// Not the complement of [`Self::unfriendly_share_declining`]: both are
    /// false without a previous period.
    pub fn unfriendly_share_stable_or_growing(&self) -> bool {
        self.compare_previous(|current, previous| {
            current.unfriendly_share() >= previous.unfriendly_share()
        })
    }

    pub fn unfriendly_import_not_decreasing(&self) -> bool {
        self.compare_previous(|current, previous| {
            current.unfriendly_value() >= previous.unfriendly_value()
        })
    }

    /// Compares current production against the mean of up to `window` most
    /// recent earlier years with recorded production. `None` when there is
    /// no such year.
    pub fn is_production_declining_multi(&self, window: usize) -> Option<bool> {
        let prior: Vec<Decimal> = self
            .production_history
            .range(..self.current_year)
            .rev()
            .take(window)
            .map(|(_, volume)| *volume)
            .collect();
        if prior.is_empty() {
            return None;
        }

        let average = ratio(saturating_sum(prior.iter().copied()), Decimal::from(prior.len()));
        Some(self.production < average)
    }

    fn compare_previous<F>(&self, predicate: F) -> bool
    where
        F: Fn(&PeriodSummary, &PeriodSummary) -> bool,
    {
        self.previous().map(|previous| predicate(self.current(), previous)).unwrap_or(false)
    }
}
