use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One country's aggregated import for a single product code and year.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryImport {
    pub country_code: String,
    pub country_name: String,
    pub is_friendly: bool,
    pub value: Decimal,
    pub quantity: Decimal,
}

impl CountryImport {
    /// Average contract price; zero when no physical quantity was recorded.
    pub fn average_price(&self) -> Decimal {
        ratio(self.value, self.quantity)
    }
}

/// Per-year view over aggregated imports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    year: i32,
    imports: Vec<CountryImport>,
}

impl PeriodSummary {
    pub fn new(year: i32, imports: Vec<CountryImport>) -> Self {
        Self { year, imports }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn imports(&self) -> &[CountryImport] {
        &self.imports
    }

    pub fn total_value(&self) -> Decimal {
        saturating_sum(self.imports.iter().map(|entry| entry.value))
    }

    pub fn total_quantity(&self) -> Decimal {
        saturating_sum(self.imports.iter().map(|entry| entry.quantity))
    }

    pub fn unfriendly_value(&self) -> Decimal {
        saturating_sum(
            self.imports.iter().filter(|entry| !entry.is_friendly).map(|entry| entry.value),
        )
    }

    /// Unfriendly import value as a percentage of total value.
    pub fn unfriendly_share(&self) -> Decimal {
        percent(self.unfriendly_value(), self.total_value())
    }

    /// Entry with the highest value. Exact ties go to the lexicographically
    /// smallest country code so the choice does not depend on input order.
    pub fn top_supplier(&self) -> Option<&CountryImport> {
        self.imports.iter().fold(None, |best: Option<&CountryImport>, entry| match best {
            None => Some(entry),
            Some(current) => {
                let wins = entry.value > current.value
                    || (entry.value == current.value && entry.country_code < current.country_code);
                Some(if wins { entry } else { current })
            }
        })
    }

    pub fn get(&self, country_code: &str) -> Option<&CountryImport> {
        self.imports.iter().find(|entry| entry.country_code == country_code)
    }

    pub fn average_price_excluding(&self, country_code: &str) -> Decimal {
        let (value, quantity) = self
            .imports
            .iter()
            .filter(|entry| entry.country_code != country_code)
            .fold((Decimal::ZERO, Decimal::ZERO), |(value, quantity), entry| {
                (value.saturating_add(entry.value), quantity.saturating_add(entry.quantity))
            });
        ratio(value, quantity)
    }

    pub fn share_of(&self, country_code: &str) -> Decimal {
        self.get(country_code)
            .map(|entry| percent(entry.value, self.total_value()))
            .unwrap_or(Decimal::ZERO)
    }
}

pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

pub(crate) fn percent(numerator: Decimal, denominator: Decimal) -> Decimal {
    ratio(numerator, denominator).saturating_mul(Decimal::ONE_HUNDRED)
}

/// Sums amounts, clamping at the representable range instead of panicking.
pub(crate) fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}
