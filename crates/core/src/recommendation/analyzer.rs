//! Decision tree that maps a product's trade picture to trade-defense measures.
//!
//! Each call walks the tree once, top to bottom. Every predicate it evaluates
//! is written to the step log so an operator can replay the reasoning; the
//! log never feeds back into control flow.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::measure::Measure;
use crate::domain::source::RestrictionValue;
use crate::recommendation::period::{ratio, saturating_sum};
use crate::recommendation::trend::TrendContext;

pub const UNFRIENDLY_SHARE_THRESHOLD_PCT: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
pub const CHINA_COUNTRY_CODE: &str = "CN";
pub const TRAILING_WINDOW_YEARS: usize = 3;

pub const KEY_CUSTOMS_DUTY_RATE: &str = "customs_duty_rate";
pub const KEY_CUSTOMS_DUTY_RATE_WTO: &str = "customs_duty_rate_wto";
pub const KEY_PROCUREMENT_RESTRICTION: &str = "rf_decree_1875_present";
pub const KEY_CERTIFICATION_REQUIRED: &str = "tech_regulations_present";
pub const KEY_CERTIFICATION_EXEMPT: &str = "order_4114_present";

/// Applied and WTO-bound tariff, both in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffSnapshot {
    pub applied_pct: Decimal,
    pub wto_max_pct: Decimal,
}

impl TariffSnapshot {
    /// Source rates are fractions; missing, unparseable or out-of-range rates
    /// count as zero.
    pub fn from_restrictions(restrictions: &BTreeMap<String, RestrictionValue>) -> Self {
        let rate_pct = |key: &str| {
            restrictions
                .get(key)
                .and_then(RestrictionValue::as_decimal)
                .and_then(|rate| rate.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
        };
        Self {
            applied_pct: rate_pct(KEY_CUSTOMS_DUTY_RATE),
            wto_max_pct: rate_pct(KEY_CUSTOMS_DUTY_RATE_WTO),
        }
    }

    pub fn has_headroom(&self) -> bool {
        self.wto_max_pct > self.applied_pct
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonTariffSnapshot {
    pub in_procurement_list: bool,
    pub certification_required: bool,
    pub certification_exempt: bool,
}

impl NonTariffSnapshot {
    /// `None` only when the product code has no restriction records at all.
    pub fn from_restrictions(restrictions: &BTreeMap<String, RestrictionValue>) -> Option<Self> {
        if restrictions.is_empty() {
            return None;
        }
        let flag =
            |key: &str| restrictions.get(key).and_then(RestrictionValue::as_bool).unwrap_or(false);
        Some(Self {
            in_procurement_list: flag(KEY_PROCUREMENT_RESTRICTION),
            certification_required: flag(KEY_CERTIFICATION_REQUIRED),
            certification_exempt: flag(KEY_CERTIFICATION_EXEMPT),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisInput {
    pub product_code: String,
    pub trend: TrendContext,
    pub tariff: TariffSnapshot,
    pub non_tariff: Option<NonTariffSnapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub measures: Vec<Measure>,
    pub steps: Vec<String>,
}

pub trait MeasureAnalyzer: Send + Sync {
    fn analyze(&self, input: &AnalysisInput) -> Analysis;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicAnalyzer;

impl MeasureAnalyzer for DeterministicAnalyzer {
    fn analyze(&self, input: &AnalysisInput) -> Analysis {
        DecisionWalk::new(input).run()
    }
}

struct DecisionWalk<'a> {
    input: &'a AnalysisInput,
    measures: Vec<Measure>,
    steps: Vec<String>,
}

impl<'a> DecisionWalk<'a> {
    fn new(input: &'a AnalysisInput) -> Self {
        Self { input, measures: Vec::new(), steps: Vec::new() }
    }

    fn trend(&self) -> &'a TrendContext {
        &self.input.trend
    }

    fn log(&mut self, step: impl Into<String>) {
        let step = step.into();
        debug!(
            event_name = "analysis.step",
            product_code = %self.input.product_code,
            step = %step,
            "decision step evaluated"
        );
        self.steps.push(step);
    }

    fn recommend(&mut self, measure: Measure, reason: &str) {
        self.log(format!("{reason} -> {measure}"));
        self.measures.push(measure);
    }

    fn run(mut self) -> Analysis {
        let trend = self.trend();
        let current = trend.current();
        let share = current.unfriendly_share();
        self.log(format!("Unfriendly share in {}: {share:.2}%", current.year()));

        match trend.previous() {
            Some(previous) => {
                self.log(format!(
                    "Unfriendly share in {}: {:.2}%",
                    previous.year(),
                    previous.unfriendly_share()
                ));
                self.log(format!(
                    "Unfriendly import value: previous {:.2}, current {:.2}",
                    previous.unfriendly_value(),
                    current.unfriendly_value()
                ));
            }
            None => self.log("No previous period: trend comparisons evaluate to false"),
        }

        let stable_or_growing = trend.unfriendly_share_stable_or_growing();
        let not_decreasing = trend.unfriendly_import_not_decreasing();
        self.log(format!("Unfriendly share stable or growing: {stable_or_growing}"));
        self.log(format!("Unfriendly import not decreasing: {not_decreasing}"));

        if share >= UNFRIENDLY_SHARE_THRESHOLD_PCT && stable_or_growing && not_decreasing {
            self.high_unfriendly_share();
        } else {
            self.low_unfriendly_share();
        }

        if self.measures.is_empty() {
            self.recommend(Measure::NoAction, "No measure selected by any branch");
        }

        Analysis { measures: self.measures, steps: self.steps }
    }

    fn log_sufficiency(&mut self) -> bool {
        let trend = self.trend();
        let sufficient = trend.is_production_sufficient();
        self.log(format!(
            "Production {:.2} covers consumption {:.2}: {sufficient}",
            trend.production(),
            trend.consumption()
        ));
        sufficient
    }

    fn high_unfriendly_share(&mut self) {
        self.log("Scenario: high unfriendly share (>= 30%, not declining)");

        if self.log_sufficiency() {
            self.recommend(Measure::BanUnfriendlyImports, "Domestic production is sufficient");
            self.non_tariff();
        } else {
            self.recommend(Measure::NoAction, "Domestic production is insufficient");
        }
    }

    fn low_unfriendly_share(&mut self) {
        self.log("Scenario: low or declining unfriendly share");

        let tariff = self.input.tariff;
        let headroom = tariff.has_headroom();
        self.log(format!(
            "Applied tariff {:.2}% below WTO bound {:.2}%: {headroom}",
            tariff.applied_pct, tariff.wto_max_pct
        ));
        let sufficient = self.log_sufficiency();

        match (headroom, sufficient) {
            (true, true) => {
                let declining = self.trend().unfriendly_share_declining();
                self.log(format!("Unfriendly share declining: {declining}"));
                if declining {
                    self.recommend(
                        Measure::RaiseTariff,
                        "Tariff headroom with sufficient production",
                    );
                } else {
                    self.log("Unfriendly share is not declining, tariff increase not proposed");
                }
                self.non_tariff();
            }
            (true, false) => {
                self.recommend(Measure::NoAction, "Tariff headroom but production is insufficient");
            }
            (false, false) => {
                self.log("No tariff headroom and insufficient production: checking top supplier");
                self.china_sub_case();
            }
            (false, true) => {
                self.log("No tariff headroom with sufficient production: checking non-tariff");
                self.non_tariff();
            }
        }
    }

    fn non_tariff(&mut self) {
        self.log("Sub-scenario: non-tariff measures");

        if !self.log_sufficiency() {
            self.recommend(Measure::NoAction, "No non-tariff action without sufficient supply");
            return;
        }

        let Some(restrictions) = self.input.non_tariff else {
            self.log("No restriction data for product code, non-tariff sub-scenario skipped");
            return;
        };

        if restrictions.in_procurement_list {
            self.log("Already restricted in government procurement");
        } else {
            self.recommend(Measure::ProcurementBan, "Not yet restricted in government procurement");
        }

        let trend = self.trend();
        let required = restrictions.certification_required;
        let not_exempt = !restrictions.certification_exempt;
        let import_growing = trend.total_quantity_growing() || trend.total_import_growing();
        let production_growing = trend.is_production_growing();
        self.log(format!(
            "Certification required: {required}, not exempted: {not_exempt}, \
             import growing: {import_growing}, production growing: {production_growing}"
        ));

        if required && not_exempt && import_growing && production_growing {
            self.recommend(Measure::MandatoryCertification, "All certification conditions hold");
        }
    }

    fn china_sub_case(&mut self) {
        self.log("Sub-case: anti-dumping test against the top supplier");

        let trend = self.trend();
        let current = trend.current();
        match current.top_supplier() {
            Some(top) if top.country_code == CHINA_COUNTRY_CODE => {
                self.log(format!("Top supplier is {CHINA_COUNTRY_CODE}"));
            }
            Some(top) => {
                let reason =
                    format!("Top supplier is {}, not {CHINA_COUNTRY_CODE}", top.country_code);
                self.recommend(Measure::NoAction, &reason);
                return;
            }
            None => {
                self.recommend(Measure::NoAction, "No top supplier in current period");
                return;
            }
        }

        let china = current.get(CHINA_COUNTRY_CODE).filter(|entry| entry.value > Decimal::ZERO);
        let Some(china) = china else {
            self.recommend(Measure::NoAction, "No positive import value from CN in current period");
            return;
        };

        let history: Vec<(i32, Decimal, Decimal)> = trend
            .prior_periods(TRAILING_WINDOW_YEARS)
            .into_iter()
            .filter_map(|period| {
                period
                    .get(CHINA_COUNTRY_CODE)
                    .map(|entry| (period.year(), entry.value, period.share_of(CHINA_COUNTRY_CODE)))
            })
            .collect();
        if history.is_empty() {
            self.recommend(Measure::NoAction, "No CN imports in the trailing window");
            return;
        }

        let years = Decimal::from(history.len());
        let value_total = saturating_sum(history.iter().map(|(_, value, _)| *value));
        let share_total = saturating_sum(history.iter().map(|(_, _, share)| *share));
        let average_value = ratio(value_total, years);
        let average_share = ratio(share_total, years);
        let current_share = current.share_of(CHINA_COUNTRY_CODE);
        let covered: Vec<String> = history.iter().map(|(year, _, _)| year.to_string()).collect();
        self.log(format!(
            "CN import value {:.2} vs trailing average {average_value:.2} ({})",
            china.value,
            covered.join(", ")
        ));
        self.log(format!("CN share {current_share:.2}% vs trailing average {average_share:.2}%"));

        if !(china.value > average_value && current_share > average_share) {
            self.recommend(Measure::NoAction, "CN imports are not above their trailing average");
            return;
        }

        match trend.is_production_declining_multi(TRAILING_WINDOW_YEARS) {
            Some(true) => self.log("Domestic production declining over the trailing window"),
            Some(false) => {
                self.recommend(Measure::NoAction, "Domestic production is not declining");
                return;
            }
            None => {
                self.recommend(Measure::NoAction, "Production trend indeterminate without history");
                return;
            }
        }

        let china_price = china.average_price();
        let others_price = current.average_price_excluding(CHINA_COUNTRY_CODE);
        self.log(format!(
            "Average contract price: CN {china_price:.2}, other suppliers {others_price:.2}"
        ));

        if china_price.is_zero() || others_price.is_zero() {
            self.recommend(Measure::NoAction, "Contract price unavailable without quantity data");
        } else if china_price < others_price {
            self.recommend(Measure::AntiDumpingInvestigation, "CN price is below other suppliers");
        } else {
            self.recommend(Measure::NoAction, "CN price is not below other suppliers");
        }
    }
}
