use rust_decimal::Decimal;
use tradeguard_core::{
    Country, ImportRecord, Measure, Recommendation, RecommendationService, RestrictionRecord,
    RestrictionValue, SourceSnapshot, VolumeKind, VolumeRecord,
};

const PRODUCT: &str = "8418";

fn country(code: &str, is_friendly: bool) -> Country {
    Country { code: code.to_owned(), name: code.to_owned(), region: String::new(), is_friendly }
}

fn import(country: &str, year: i32, value: i64, quantity: Option<i64>) -> ImportRecord {
    ImportRecord {
        product_code: PRODUCT.to_owned(),
        country: country.to_owned(),
        year,
        value: Decimal::from(value),
        quantity: quantity.map(Decimal::from),
    }
}

fn volume(kind: VolumeKind, year: i32, volume: i64) -> VolumeRecord {
    VolumeRecord { product_code: PRODUCT.to_owned(), kind, year, volume: Decimal::from(volume) }
}

fn restriction(key: &str, value: RestrictionValue) -> RestrictionRecord {
    RestrictionRecord { product_code: PRODUCT.to_owned(), key: key.to_owned(), value }
}

fn codes(snapshot: &SourceSnapshot) -> Vec<u8> {
    RecommendationService::new(snapshot).recommend(PRODUCT).codes()
}

/// CN unfriendly with a growing share, sufficient and growing production.
fn high_share_fixture() -> SourceSnapshot {
    SourceSnapshot {
        countries: vec![country("CN", false), country("DE", true)],
        imports: vec![
            import("CN", 2023, 60, Some(5)),
            import("DE", 2023, 55, Some(5)),
            import("CN", 2024, 100, Some(10)),
            import("DE", 2024, 50, Some(10)),
        ],
        volumes: vec![
            volume(VolumeKind::Production, 2023, 100),
            volume(VolumeKind::Consumption, 2023, 90),
            volume(VolumeKind::Production, 2024, 120),
            volume(VolumeKind::Consumption, 2024, 100),
        ],
        restrictions: Vec::new(),
    }
}

fn certification_fixture() -> SourceSnapshot {
    let mut snapshot = high_share_fixture();
    snapshot.restrictions = vec![
        restriction("rf_decree_1875_present", RestrictionValue::text("да")),
        restriction("tech_regulations_present", RestrictionValue::Bool(true)),
        restriction("order_4114_present", RestrictionValue::text("нет")),
    ];
    snapshot
}

fn set_restriction(snapshot: &mut SourceSnapshot, key: &str, value: RestrictionValue) {
    snapshot.restrictions.push(restriction(key, value));
}

/// CN tops a friendly market with no tariff headroom and collapsing production.
fn china_fixture() -> SourceSnapshot {
    SourceSnapshot {
        countries: vec![country("CN", true), country("DE", true)],
        imports: vec![
            import("CN", 2021, 100, Some(50)),
            import("DE", 2021, 100, Some(10)),
            import("CN", 2022, 120, Some(60)),
            import("DE", 2022, 100, Some(10)),
            import("CN", 2023, 110, Some(55)),
            import("DE", 2023, 100, Some(10)),
            import("CN", 2024, 300, Some(100)),
            import("DE", 2024, 100, Some(10)),
        ],
        volumes: vec![
            volume(VolumeKind::Production, 2021, 100),
            volume(VolumeKind::Production, 2022, 90),
            volume(VolumeKind::Production, 2023, 80),
            volume(VolumeKind::Production, 2024, 50),
            volume(VolumeKind::Consumption, 2024, 200),
        ],
        restrictions: Vec::new(),
    }
}

#[test]
fn growing_unfriendly_share_with_sufficient_production_bans_imports() {
    let snapshot = SourceSnapshot {
        countries: vec![country("CN", false), country("DE", true)],
        imports: vec![
            import("CN", 2023, 60, None),
            import("DE", 2023, 55, None),
            import("CN", 2024, 100, Some(10)),
            import("DE", 2024, 50, Some(10)),
        ],
        volumes: vec![
            volume(VolumeKind::Production, 2023, 100),
            volume(VolumeKind::Consumption, 2023, 100),
            volume(VolumeKind::Production, 2024, 100),
            volume(VolumeKind::Consumption, 2024, 100),
        ],
        restrictions: Vec::new(),
    };

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![2]);
    assert!(recommendation
        .steps
        .iter()
        .any(|step| step.contains("No restriction data for product code")));
}

#[test]
fn insufficient_production_in_high_share_branch_is_exactly_no_action() {
    let mut snapshot = high_share_fixture();
    snapshot.volumes.push(volume(VolumeKind::Consumption, 2024, 500));

    assert_eq!(codes(&snapshot), vec![6]);
}

#[test]
fn missing_imports_return_fallback_with_empty_log() {
    let snapshot = high_share_fixture();

    let recommendation = RecommendationService::new(&snapshot).recommend("0000");

    assert_eq!(recommendation.measures, vec![Measure::NoAction]);
    assert!(recommendation.steps.is_empty());
}

#[test]
fn certification_fires_when_all_four_conditions_hold() {
    assert_eq!(codes(&certification_fixture()), vec![2, 5]);
}

#[test]
fn certification_requires_the_regulation() {
    let mut snapshot = certification_fixture();
    set_restriction(&mut snapshot, "tech_regulations_present", RestrictionValue::Bool(false));

    assert_eq!(codes(&snapshot), vec![2]);
}

#[test]
fn certification_is_skipped_when_exempted() {
    let mut snapshot = certification_fixture();
    set_restriction(&mut snapshot, "order_4114_present", RestrictionValue::text("да"));

    assert_eq!(codes(&snapshot), vec![2]);
}

#[test]
fn certification_requires_growing_imports() {
    let mut snapshot = certification_fixture();
    snapshot.imports.retain(|record| record.year != 2023);
    snapshot.imports.push(import("CN", 2023, 90, Some(20)));
    snapshot.imports.push(import("DE", 2023, 70, Some(20)));

    assert_eq!(codes(&snapshot), vec![2]);
}

#[test]
fn certification_requires_growing_production() {
    let mut snapshot = certification_fixture();
    snapshot.volumes.push(volume(VolumeKind::Production, 2024, 100));

    assert_eq!(codes(&snapshot), vec![2]);
}

#[test]
fn procurement_ban_is_proposed_when_not_yet_listed() {
    let mut snapshot = certification_fixture();
    set_restriction(&mut snapshot, "rf_decree_1875_present", RestrictionValue::Bool(false));

    assert_eq!(codes(&snapshot), vec![2, 4, 5]);
}

#[test]
fn declining_unfriendly_share_with_tariff_headroom_raises_tariff() {
    let mut snapshot = high_share_fixture();
    snapshot.imports = vec![
        import("CN", 2023, 80, Some(10)),
        import("DE", 2023, 20, Some(10)),
        import("CN", 2024, 20, Some(10)),
        import("DE", 2024, 80, Some(10)),
    ];
    snapshot.restrictions = vec![
        restriction("customs_duty_rate", RestrictionValue::text("5%")),
        restriction("customs_duty_rate_wto", RestrictionValue::Number(Decimal::new(15, 2))),
        restriction("rf_decree_1875_present", RestrictionValue::Bool(true)),
    ];

    assert_eq!(codes(&snapshot), vec![1]);
}

#[test]
fn china_sub_case_recommends_anti_dumping_investigation() {
    let recommendation = RecommendationService::new(&china_fixture()).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![3]);
    assert!(recommendation.steps.iter().any(|step| step.contains("Top supplier is CN")));
}

#[test]
fn china_sub_case_requires_cn_as_top_supplier() {
    let mut snapshot = china_fixture();
    snapshot.imports.push(import("DE", 2024, 400, Some(40)));

    assert_eq!(codes(&snapshot), vec![6]);
}

#[test]
fn china_sub_case_requires_lower_contract_price() {
    let mut snapshot = china_fixture();
    snapshot.imports.push(import("DE", 2024, 0, Some(90)));

    assert_eq!(codes(&snapshot), vec![6]);
}

#[test]
fn china_sub_case_requires_declining_production() {
    let mut snapshot = china_fixture();
    snapshot.volumes.push(volume(VolumeKind::Production, 2024, 150));

    assert_eq!(codes(&snapshot), vec![6]);
}

fn replace_import(snapshot: &mut SourceSnapshot, record: ImportRecord) {
    snapshot
        .imports
        .retain(|existing| !(existing.country == record.country && existing.year == record.year));
    snapshot.imports.push(record);
}

fn has_step(recommendation: &Recommendation, needle: &str) -> bool {
    recommendation.steps.iter().any(|step| step.contains(needle))
}

#[test]
fn china_sub_case_requires_cn_history_in_trailing_window() {
    let mut snapshot = china_fixture();
    snapshot.imports.retain(|record| record.country != "CN" || record.year == 2024);

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![6]);
    assert!(has_step(&recommendation, "No CN imports in the trailing window"));
}

#[test]
fn china_sub_case_requires_value_above_trailing_average() {
    let mut snapshot = china_fixture();
    replace_import(&mut snapshot, import("CN", 2024, 105, Some(100)));

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![6]);
    assert!(has_step(&recommendation, "CN imports are not above their trailing average"));
}

#[test]
fn china_sub_case_requires_share_above_trailing_average() {
    let mut snapshot = china_fixture();
    replace_import(&mut snapshot, import("DE", 2024, 290, Some(10)));

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![6]);
    assert!(has_step(&recommendation, "CN import value 300.00 vs trailing average 110.00"));
    assert!(has_step(&recommendation, "CN imports are not above their trailing average"));
}

#[test]
fn china_sub_case_without_cn_quantity_has_no_contract_price() {
    let mut snapshot = china_fixture();
    replace_import(&mut snapshot, import("CN", 2024, 300, None));

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![6]);
    assert!(has_step(&recommendation, "Contract price unavailable without quantity data"));
}

#[test]
fn china_sub_case_without_other_supplier_quantity_has_no_contract_price() {
    let mut snapshot = china_fixture();
    replace_import(&mut snapshot, import("DE", 2024, 100, None));

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![6]);
    assert!(has_step(&recommendation, "Contract price unavailable without quantity data"));
}

#[test]
fn china_sub_case_production_trend_is_indeterminate_without_history() {
    let mut snapshot = china_fixture();
    snapshot
        .volumes
        .retain(|record| record.kind != VolumeKind::Production || record.year == 2024);

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![6]);
    assert!(has_step(&recommendation, "Production trend indeterminate without history"));
}

#[test]
fn out_of_range_applied_tariff_counts_as_zero() {
    let mut snapshot = china_fixture();
    snapshot.restrictions.push(restriction(
        "customs_duty_rate",
        RestrictionValue::text("79228162514264337593543950335"),
    ));

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![3]);
    assert!(has_step(&recommendation, "Applied tariff 0.00% below WTO bound 0.00%: false"));
}

#[test]
fn out_of_range_wto_bound_from_json_counts_as_zero() {
    let json = r#"{
        "countries": [{"code": "DE", "name": "Germany", "is_friendly": true}],
        "imports": [
            {"product_code": "8418", "country": "DE", "year": 2023, "value": 100},
            {"product_code": "8418", "country": "DE", "year": 2024, "value": 120}
        ],
        "volumes": [
            {"product_code": "8418", "kind": "production", "year": 2024, "volume": 100},
            {"product_code": "8418", "kind": "consumption", "year": 2024, "volume": 50}
        ],
        "restrictions": [
            {"product_code": "8418", "key": "customs_duty_rate_wto",
             "value": "1000000000000000000000000000"}
        ]
    }"#;
    let snapshot: SourceSnapshot = serde_json::from_str(json).expect("snapshot should parse");

    let recommendation = RecommendationService::new(&snapshot).recommend(PRODUCT);

    assert_eq!(recommendation.codes(), vec![4]);
    assert!(has_step(&recommendation, "WTO bound 0.00%: false"));
}

#[test]
fn saturated_import_totals_still_produce_a_recommendation() {
    let mut snapshot = high_share_fixture();
    let mut huge = import("CN", 2024, 0, Some(1));
    huge.value = Decimal::MAX;
    snapshot.imports.push(huge.clone());
    snapshot.imports.push(huge);

    assert_eq!(codes(&snapshot), vec![2]);
}

#[test]
fn service_can_be_shared_across_threads() {
    let snapshot = certification_fixture();
    let service = RecommendationService::new(&snapshot);

    let results: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| service.recommend(PRODUCT).codes()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap_or_default()).collect()
    });

    assert!(results.iter().all(|codes| codes == &vec![2, 5]));
}
