use pomedos_engine::{
    DeathValue, EngineError, MissingYearPolicy, SeriesRequest, SexSelection, StandardizationEngine,
    bracket_shares, project_counts,
};
use pomedos_model::{
    AgeBracket, BracketValues, CauseId, DeathRecord, PopulationTable, Sex, StandardBracket,
    StandardPopulation, Year,
};
use pomedos_store::{MortalityStore, StoreError, Table};

/// Native brackets in source order: under-1 follows the other fine brackets.
const BRACKETS: [&str; 10] = [
    "1 bis unter 15 Jahre",
    "15 bis unter 20 Jahre",
    "20 bis unter 25 Jahre",
    "25 bis unter 30 Jahre",
    "30 bis unter 50 Jahre",
    "50 bis unter 65 Jahre",
    "65 bis unter 80 Jahre",
    "80 Jahre und mehr",
    "unter 1 Jahr",
    "Alter unbekannt",
];

const ALL_MALE: [u64; 10] = [20, 10, 15, 20, 300, 900, 3000, 6000, 5, 4];
const ALL_FEMALE: [u64; 10] = [15, 5, 6, 8, 200, 600, 2500, 8000, 4, 2];
const FLU_MALE: [u64; 10] = [1, 0, 0, 1, 2, 3, 10, 20, 0, 1];
const FLU_FEMALE: [u64; 10] = [0, 0, 0, 0, 1, 2, 8, 25, 1, 0];
const CANCER_MALE: [u64; 10] = [3, 2, 2, 3, 80, 300, 900, 700, 0, 0];
const CANCER_FEMALE: [u64; 10] = [2, 1, 1, 2, 90, 250, 700, 800, 0, 0];

const ESP_FOLDED: [u64; 7] = [1000, 15000, 5500, 6000, 6000, 47000, 19500];

fn cause_records(year: i32, cause: &str, male: [u64; 10], female: [u64; 10]) -> Vec<DeathRecord> {
    // later years scale every count so that years differ
    let factor = u64::try_from(year - 1997).unwrap();
    let mut rows = Vec::new();
    for (idx, label) in BRACKETS.iter().enumerate() {
        for (sex, counts) in [(Sex::Male, male), (Sex::Female, female)] {
            rows.push(DeathRecord {
                year: Year::new(year),
                cause: CauseId::new(cause).unwrap(),
                bracket: label.parse::<AgeBracket>().unwrap(),
                sex,
                count: counts[idx] * factor,
            });
        }
    }
    rows
}

fn population(multiplier: u64) -> BracketValues<u64> {
    let mut values = ESP_FOLDED.iter();
    BracketValues::from_fn(|_| values.next().copied().unwrap_or(0) * multiplier)
}

fn records() -> Vec<DeathRecord> {
    let mut rows = Vec::new();
    for year in 1998..=2000 {
        rows.extend(cause_records(year, "Insgesamt", ALL_MALE, ALL_FEMALE));
        rows.extend(cause_records(year, "Grippe", FLU_MALE, FLU_FEMALE));
        rows.extend(cause_records(year, "Krebs", CANCER_MALE, CANCER_FEMALE));
    }
    rows
}

fn store() -> MortalityStore {
    let population: PopulationTable = [
        (Year::new(1998), population(1)),
        (Year::new(1999), population(2)),
        (Year::new(2000), population(1)),
    ]
    .into_iter()
    .collect();
    MortalityStore::new(records(), population).unwrap()
}

fn known_total(male: [u64; 10], female: [u64; 10]) -> u64 {
    // the last entry is the unknown-age bucket
    male[..9].iter().sum::<u64>() + female[..9].iter().sum::<u64>()
}

fn cause(name: &str) -> CauseId {
    CauseId::new(name).unwrap()
}

fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() <= 1e-9 * right.abs().max(1.0)
}

#[test]
fn raw_series_matches_independent_all_cause_totals() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);

    let series = engine
        .total_deaths(&SeriesRequest::new(Year::new(1998), Year::new(2000), ["Insgesamt"]))
        .unwrap();

    let years: Vec<i32> = series.years().map(Year::get).collect();
    assert_eq!(years, vec![1998, 1999, 2000]);
    let base = known_total(ALL_MALE, ALL_FEMALE);
    for (factor, point) in (1..).zip(&series.points) {
        assert_eq!(point.deaths, DeathValue::Count(base * factor));
    }
    assert!(series.skipped.is_empty());
}

#[test]
fn coverage_of_all_cause_slice() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);
    let all = [cause("Insgesamt")];

    for year in store.years() {
        let slice = store.all_cause_deaths(year).unwrap();
        let independent = slice.totals().total() - slice.unknown().total();
        assert_eq!(engine.raw_total(year, &all).unwrap(), independent);
    }
}

#[test]
fn fold_is_lossless_and_paths_agree() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);
    let all = [cause("Insgesamt")];

    for year in store.years() {
        let detail = engine.standardize_year(year, &all).unwrap();
        assert_eq!(detail.brackets.len(), 7);
        assert_eq!(detail.deaths(), engine.raw_total(year, &all).unwrap());
        assert!(detail.unknown_age > 0);
    }
}

#[test]
fn folded_brackets_follow_age_order() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);

    let detail = engine
        .standardize_year(Year::new(1998), &[cause("Insgesamt")])
        .unwrap();
    let brackets: Vec<StandardBracket> = detail.brackets.iter().map(|b| b.bracket).collect();
    assert_eq!(brackets, StandardBracket::ALL.to_vec());
    // under-1 comes last in the source but lands in the first bracket
    assert_eq!(detail.brackets[0].deaths, 9);
    assert_eq!(
        detail.brackets[5].deaths,
        300 + 900 + 200 + 600,
        "30 - 65 sums the 30-50 and 50-65 bands"
    );
}

#[test]
fn weights_are_constant_across_years() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);

    for year in store.years() {
        let detail = engine
            .standardize_year(year, &[cause("Krebs")])
            .unwrap();
        let weights: f64 = detail.brackets.iter().map(|b| b.weight).sum();
        assert_eq!(weights, standard.total());
        assert_eq!(weights, 100_000.0);
    }
}

#[test]
fn standard_shaped_population_reproduces_raw_total() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);

    let series = engine
        .total_deaths(
            &SeriesRequest::new(Year::new(1998), Year::new(2000), ["Insgesamt"]).standardized(true),
        )
        .unwrap();
    let base = known_total(ALL_MALE, ALL_FEMALE) as f64;

    // 1998: population equals the weights; 1999: twice the weights at
    // twice the deaths; 2000: the weights again at three times the deaths
    let expected = [base, base, 3.0 * base];
    for (point, expected) in series.points.iter().zip(expected) {
        assert!(
            approx_eq(point.deaths.as_f64(), expected),
            "{}: {} != {expected}",
            point.year,
            point.deaths
        );
    }
}

#[test]
fn cause_group_is_standardized_combined() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);
    let year = Year::new(1999);

    let flu = engine.standardized_rate(year, &[cause("Grippe")]).unwrap();
    let cancer = engine.standardized_rate(year, &[cause("Krebs")]).unwrap();
    let both = engine
        .standardized_rate(year, &[cause("Grippe"), cause("Krebs")])
        .unwrap();
    assert!(approx_eq(both, flu + cancer));

    let series = engine
        .total_deaths(&SeriesRequest::new(year, year, ["Grippe", "Krebs"]))
        .unwrap();
    assert_eq!(series.label, None);
    assert_eq!(
        series.get(year),
        Some(DeathValue::Count(
            2 * (known_total(FLU_MALE, FLU_FEMALE) + known_total(CANCER_MALE, CANCER_FEMALE))
        ))
    );
}

#[test]
fn repeated_calls_are_identical() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);
    let request =
        SeriesRequest::new(Year::new(1998), Year::new(2000), ["Grippe"]).standardized(true);

    let first = engine.total_deaths(&request).unwrap();
    let second = engine.total_deaths(&request).unwrap();
    assert_eq!(first, second);
    for (a, b) in first.points.iter().zip(&second.points) {
        assert_eq!(a.deaths.as_f64().to_bits(), b.deaths.as_f64().to_bits());
    }
}

#[test]
fn missing_population_year_fails_or_is_skipped() {
    let population: PopulationTable = [
        (Year::new(1998), population(1)),
        (Year::new(1999), population(1)),
    ]
    .into_iter()
    .collect();
    let store = MortalityStore::new(records(), population).unwrap();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);
    let request =
        SeriesRequest::new(Year::new(1998), Year::new(2000), ["Insgesamt"]).standardized(true);

    assert_eq!(
        engine.total_deaths(&request),
        Err(EngineError::Store(StoreError::MissingYear {
            year: Year::new(2000),
            table: Table::Population,
        }))
    );

    let series = engine
        .total_deaths(&request.clone().with_missing_years(MissingYearPolicy::Skip))
        .unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.skipped.len(), 1);
    assert_eq!(series.skipped[0].year, Year::new(2000));

    // the raw path never touches the population table
    let raw = engine
        .total_deaths(&request.standardized(false))
        .unwrap();
    assert_eq!(raw.len(), 3);
}

#[test]
fn zero_population_is_division_by_zero() {
    let empty_infants = population(1).map(|bracket, count| {
        if bracket == StandardBracket::UnderOne {
            0
        } else {
            *count
        }
    });
    let population: PopulationTable = [
        (Year::new(1998), population(1)),
        (Year::new(1999), empty_infants),
        (Year::new(2000), population(1)),
    ]
    .into_iter()
    .collect();
    let store = MortalityStore::new(records(), population).unwrap();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);
    let request =
        SeriesRequest::new(Year::new(1998), Year::new(2000), ["Grippe"]).standardized(true);

    assert_eq!(
        engine.total_deaths(&request),
        Err(EngineError::DivisionByZero {
            year: Year::new(1999),
            bracket: "0 - 1".to_string(),
        })
    );
    let series = engine
        .total_deaths(&request.with_missing_years(MissingYearPolicy::Skip))
        .unwrap();
    let years: Vec<i32> = series.years().map(Year::get).collect();
    assert_eq!(years, vec![1998, 2000]);
}

#[test]
fn bracket_gap_is_never_skipped() {
    let mut rows = records();
    rows.retain(|record| {
        !(record.cause.as_str() == "Grippe"
            && record.year == Year::new(1999)
            && record.bracket.to_string() == "15 - 20")
    });
    let population: PopulationTable = [1998, 1999, 2000]
        .into_iter()
        .map(|year| (Year::new(year), population(1)))
        .collect();
    let store = MortalityStore::new(rows, population).unwrap();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);
    let request = SeriesRequest::new(Year::new(1998), Year::new(2000), ["Grippe"])
        .standardized(true)
        .with_missing_years(MissingYearPolicy::Skip);

    let result = engine.total_deaths(&request);
    assert!(matches!(
        result,
        Err(EngineError::BracketAlignment { year, .. }) if year == Year::new(1999)
    ));
}

#[test]
fn vocabulary_and_range_errors_come_first() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);

    let unknown = SeriesRequest::new(Year::new(1998), Year::new(2000), ["Pest"])
        .with_missing_years(MissingYearPolicy::Skip);
    assert_eq!(
        engine.total_deaths(&unknown),
        Err(EngineError::Store(StoreError::UnknownCause {
            cause: "Pest".to_string()
        }))
    );

    let empty = SeriesRequest::new(Year::new(1998), Year::new(2000), Vec::<String>::new());
    assert_eq!(
        engine.total_deaths(&empty),
        Err(EngineError::Store(StoreError::EmptyCauseSet))
    );

    let backwards = SeriesRequest::new(Year::new(2000), Year::new(1998), ["Grippe"]);
    assert_eq!(
        engine.total_deaths(&backwards),
        Err(EngineError::InvalidYearRange {
            start: Year::new(2000),
            end: Year::new(1998),
        })
    );
}

#[test]
fn raw_series_serializes_to_plottable_records() {
    let store = store();
    let standard = StandardPopulation::esp2013();
    let engine = StandardizationEngine::new(&store, &standard);

    let series = engine
        .total_deaths(&SeriesRequest::new(Year::new(1998), Year::new(2000), ["Grippe"]))
        .unwrap();

    insta::assert_json_snapshot!(series, @r###"
    {
      "label": "Grippe",
      "standardized": false,
      "points": [
        {
          "year": 1998,
          "deaths": 74
        },
        {
          "year": 1999,
          "deaths": 148
        },
        {
          "year": 2000,
          "deaths": 222
        }
      ],
      "skipped": []
    }
    "###);
}

#[test]
fn infant_shares_sum_to_one() {
    let store = store();
    let group: Vec<AgeBracket> = ["unter 1 Jahr", "1 bis unter 15 Jahre"]
        .iter()
        .map(|label| label.parse().unwrap())
        .collect();
    let years: Vec<Year> = Year::new(1998).through(Year::new(2000)).collect();

    let table = bracket_shares(&store, "Insgesamt", &years, &group, SexSelection::Male).unwrap();
    for (_, shares) in table.rows() {
        assert!(approx_eq(shares.iter().sum::<f64>(), 1.0));
        assert!(approx_eq(shares[0], 5.0 / 25.0));
    }

    let mean = table.mean_over(&table.last_years(3)).unwrap();
    let projected = project_counts(&mean, 1790.0);
    assert!(approx_eq(projected[0].1, 358.0));
}

#[test]
fn shares_of_missing_bracket_fail() {
    let store = store();
    let group: Vec<AgeBracket> = vec!["30 bis unter 35 Jahre".parse().unwrap()];
    let result = bracket_shares(
        &store,
        "Grippe",
        &[Year::new(1998)],
        &group,
        SexSelection::Total,
    );
    assert!(matches!(result, Err(EngineError::MissingBracket { .. })));
}
