use epitrends::config::{AreaParams, COUNTRY, YEAR};
use epitrends::data::coerce_numeric;
use epitrends::pipeline;
use epitrends::charts::ChartInput;
use epitrends::reshape::{align_pair, filter_year, group_by_entity, FillPolicy, WideMatrix};
use polars::prelude::*;

fn observations() -> DataFrame {
    DataFrame::new(vec![
        Column::new(
            "country".into(),
            vec!["Colombia", "Colombia", "Colombia"],
        ),
        Column::new("year".into(), vec!["2023", "2024", "2024"]),
        Column::new("x".into(), vec!["10.5", "bad", "12.0"]),
    ])
    .unwrap()
}

#[test]
fn filter_then_coerce_keeps_unparsable_values_as_missing() {
    // rows (Colombia, 2023, "10.5"), (Colombia, 2024, "bad"),
    // (Colombia, 2024, "12.0") -> year 2024 yields [missing, 12.0]
    let at_2024 = filter_year(&observations(), "year", 2024).unwrap();
    let coerced = coerce_numeric(&at_2024, &["x"]).unwrap();

    assert_eq!(coerced.height(), 2);
    let x: Vec<Option<f64>> = coerced
        .column("x")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(x, vec![None, Some(12.0)]);
}

#[test]
fn wide_matrix_zero_fill_places_zeros_exactly_at_the_gaps() {
    // entities with years {2010,2011}, {2010}, {2011}
    let df = DataFrame::new(vec![
        Column::new(
            "country".into(),
            vec!["E1", "E1", "E2", "E3"],
        ),
        Column::new("year".into(), vec!["2010", "2011", "2010", "2011"]),
        Column::new("v".into(), vec!["1", "2", "3", "4"]),
    ])
    .unwrap();
    let entities: Vec<String> = ["E1", "E2", "E3"].iter().map(|e| e.to_string()).collect();

    let groups = group_by_entity(&df, "country", "year", &entities).unwrap();
    let wide = WideMatrix::from_entity_tables(&groups, "year", "v").unwrap();
    let dense = wide.fill(FillPolicy::Zero);

    assert_eq!(dense.n_rows(), 2);
    assert_eq!(dense.n_cols(), 3);
    assert_eq!(dense.years(), &[2010, 2011]);
    // exactly one zero at (2011, E2) and one at (2010, E3)
    assert_eq!(dense.value(1, 1), 0.0);
    assert_eq!(dense.value(0, 2), 0.0);
    assert_eq!(dense.value(0, 0), 1.0);
    assert_eq!(dense.value(1, 0), 2.0);
    assert_eq!(dense.value(0, 1), 3.0);
    assert_eq!(dense.value(1, 2), 4.0);
    for col in 0..dense.n_cols() {
        assert!(dense.column(col).iter().all(|v| !v.is_nan()));
    }
}

#[test]
fn align_pair_finds_gap_rows_pointwise() {
    // a=[5,3,8], b=[4,6,2] over [2020,2021,2022] -> gaps at 2020 and 2022
    let df = DataFrame::new(vec![
        Column::new("year".into(), vec!["2020", "2021", "2022"]),
        Column::new("a".into(), vec!["5", "3", "8"]),
        Column::new("b".into(), vec!["4", "6", "2"]),
    ])
    .unwrap();

    let pair = align_pair(&df, "year", "a", "b", "a", "b").unwrap();
    let gap_years: Vec<i32> = pair
        .gap_rows()
        .into_iter()
        .map(|row| pair.points()[row].year)
        .collect();
    assert_eq!(gap_years, vec![2020, 2022]);
}

#[test]
fn area_pipeline_prunes_entities_with_no_data() {
    let df = DataFrame::new(vec![
        Column::new(
            "country".into(),
            vec!["Brazil", "Brazil", "Chile", "Paraguay"],
        ),
        Column::new("year".into(), vec!["2010", "2011", "2010", "2011"]),
        Column::new("treated".into(), vec![Some("100"), Some("120"), Some("30"), None]),
    ])
    .unwrap();
    let params = AreaParams {
        entities: ["Brazil", "Chile", "Paraguay"]
            .iter()
            .map(|e| e.to_string())
            .collect(),
        indicator: "treated".to_string(),
        title: String::new(),
        x_label: String::new(),
        y_label: String::new(),
    };

    let prepared = pipeline::area::prepare(&df, &params).unwrap();
    let ChartInput::Matrix(matrix) = &prepared.input else {
        panic!("expected a matrix input");
    };
    // Paraguay's only value failed to parse, so its column is all zeros and
    // gets pruned before stacking
    assert_eq!(matrix.labels(), &["Brazil", "Chile"]);
    assert_eq!(matrix.years(), &[2010, 2011]);
    assert_eq!(matrix.value(1, 1), 0.0);
    assert_eq!(prepared.spec.value_columns, vec!["Brazil", "Chile"]);
}

#[test]
fn semantic_column_names_flow_through_grouping() {
    let df = DataFrame::new(vec![
        Column::new(COUNTRY.into(), vec!["Peru", "Peru"]),
        Column::new(YEAR.into(), vec!["2011", "2010"]),
        Column::new("v".into(), vec!["1", "2"]),
    ])
    .unwrap();
    let groups =
        group_by_entity(&df, COUNTRY, YEAR, std::slice::from_ref(&"Peru".to_string())).unwrap();
    let years: Vec<f64> = groups[0]
        .1
        .column(YEAR)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(years, vec![2010.0, 2011.0]);
}
