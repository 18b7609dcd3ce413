//! Behavioral tests for the check functions.

use indexmap::IndexMap;

use rampart::checks::{
    has_columns, has_dtypes, has_no_nans, has_no_nones, has_no_x, has_schema,
    has_set_within_vals, has_unique_index, has_vals_within_n_std, has_vals_within_range,
    has_vals_within_set, is_monotonic, is_same_as, is_shape, multi_check_with, one_to_many,
    unique, Check, EqualityOptions, Monotonic, Shape,
};
use rampart::locations::Location;
use rampart::notice::{CollectingSink, NoticeBoard, NoticeKind};
use rampart::table::{Column, DType, Index, Table, Value};
use rampart::{CheckError, Payload};

fn table(columns: impl IntoIterator<Item = Column>) -> Table {
    Table::from_columns(columns).expect("valid table")
}

fn locations(err: &CheckError) -> Vec<Location> {
    err.failure()
        .and_then(|f| f.locations())
        .expect("failure with locations")
        .to_vec()
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_checks_are_idempotent() {
    let t = table([
        Column::new("a", [1.0, f64::NAN, 3.0]),
        Column::new("b", [1, 1, 2]),
    ]);

    let first = has_no_nans(&t, None).unwrap_err();
    let second = has_no_nans(&t, None).unwrap_err();
    assert_eq!(first, second);

    let before = t.clone();
    let out = unique(has_unique_index(&t).unwrap(), Some(&["a"])).unwrap();
    let out = unique(out, Some(&["a"])).unwrap();
    assert_eq!(out, &before);
}

// =============================================================================
// Columns and shape
// =============================================================================

#[test]
fn test_column_order_ignores_interleaved_extras() {
    let t = table([
        Column::new("a", [1]),
        Column::new("x", [1]),
        Column::new("b", [1]),
        Column::new("c", [1]),
    ]);
    assert!(has_columns(&t, &["a", "b", "c"], false, true).is_ok());
    assert!(has_columns(&t, &["a", "c"], false, true).is_ok());

    let err = has_columns(&t, &["b", "a"], false, true).unwrap_err();
    assert!(err.to_string().contains("order"));

    let err = has_columns(&t, &["a", "b", "c"], true, false).unwrap_err();
    assert!(err.to_string().contains("extra columns"));
}

#[test]
fn test_shape_wildcard() {
    let short = table([Column::new("a", [1]), Column::new("b", [2])]);
    let long = table([Column::new("a", 0..50), Column::new("b", 0..50)]);
    let wide = table([
        Column::new("a", [1]),
        Column::new("b", [2]),
        Column::new("c", [3]),
    ]);

    assert!(is_shape(&short, Shape::new(-1, 2)).is_ok());
    assert!(is_shape(&long, Shape::new(-1, 2)).is_ok());
    assert!(is_shape(&wide, Shape::new(-1, 2)).is_err());
}

#[test]
fn test_duplicate_index_labels_reported() {
    let t = table([Column::new("a", [1, 2, 3])])
        .with_index(Index::new([1, 1, 2]))
        .unwrap();
    let err = has_unique_index(&t).unwrap_err();
    assert!(matches!(
        &err.failure().unwrap().payload,
        Payload::Labels(labels) if labels.len() == 1
    ));
}

// =============================================================================
// Missing and excluded values
// =============================================================================

#[test]
fn test_has_no_nans_reports_column_major() {
    let t = table([
        Column::new("a", [1.0, f64::NAN, 3.0]),
        Column::new("b", [f64::NAN, 5.0, 6.0]),
    ]);
    let err = has_no_nans(&t, None).unwrap_err();
    assert_eq!(
        locations(&err),
        vec![Location::new(1, "a"), Location::new(0, "b")]
    );
}

#[test]
fn test_nones_and_excluded_values() {
    let t = table([
        Column::new("a", [Value::from("x"), Value::Null, Value::from("y")]),
        Column::new("b", [0, 7, 0]),
    ]);
    let err = has_no_nones(&t, None).unwrap_err();
    assert_eq!(locations(&err), vec![Location::new(1, "a")]);

    let err = has_no_x(&t, &[Value::from(0), Value::from("y")], None).unwrap_err();
    assert_eq!(
        locations(&err),
        vec![
            Location::new(2, "a"),
            Location::new(0, "b"),
            Location::new(2, "b"),
        ]
    );
}

// =============================================================================
// Value membership and ranges
// =============================================================================

#[test]
fn test_set_within_vals_aggregates_missing_pairs() {
    let t = table([
        Column::new("a", [1, 2, 3]),
        Column::new("b", ["a", "b", "c"]),
    ]);
    let items: IndexMap<String, Vec<Value>> = [
        ("a".to_string(), vec![Value::from(1), Value::from(9)]),
        ("b".to_string(), vec![Value::from("d")]),
    ]
    .into();
    let err = has_set_within_vals(&t, &items).unwrap_err();
    match &err.failure().unwrap().payload {
        Payload::Values(missing) => {
            assert_eq!(missing["a"], vec![Value::from(9)]);
            assert_eq!(missing["b"], vec![Value::from("d")]);
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn test_vals_within_set_and_range_are_fail_fast() {
    let t = table([
        Column::new("a", [1, 5, 9]),
        Column::new("b", ["x", "q", "y"]),
    ]);
    let sets: IndexMap<String, Vec<Value>> = [
        ("a".to_string(), vec![Value::from(1), Value::from(5)]),
        ("b".to_string(), vec![Value::from("x"), Value::from("y")]),
    ]
    .into();
    let err = has_vals_within_set(&t, &sets).unwrap_err();
    let failure = err.failure().unwrap();
    assert!(failure.message.contains("column 'a'"));
    assert!(!failure.message.contains("column 'b'"));

    let ranges: IndexMap<String, (Value, Value)> =
        [("a".to_string(), (Value::from(1), Value::from(9)))].into();
    assert!(has_vals_within_range(&t, &ranges).is_ok());

    let ranges: IndexMap<String, (Value, Value)> =
        [("a".to_string(), (Value::from(2), Value::from(9)))].into();
    assert!(has_vals_within_range(&t, &ranges).is_err());
}

#[test]
fn test_n_std_flags_outliers() {
    let mut values = vec![10.0; 20];
    values.push(1000.0);
    let t = table([Column::new("a", values)]);
    let err = has_vals_within_n_std(&t, 3.0).unwrap_err();
    assert_eq!(locations(&err), vec![Location::new(20, "a")]);
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_strict_either_direction_accepts_decreasing() {
    let t = table([Column::new("x", [5, 4, 3, 2])]);
    assert!(is_monotonic(&t, None, Monotonic::either().strict()).is_ok());
    assert!(is_monotonic(&t, None, Monotonic::increasing()).is_err());
}

#[test]
fn test_monotonic_per_column_rules() {
    let t = table([
        Column::new("up", [1, 2, 2, 3]),
        Column::new("down", [3, 2, 2, 1]),
    ]);
    let rules: IndexMap<String, Monotonic> = [
        ("up".to_string(), Monotonic::increasing()),
        ("down".to_string(), Monotonic::decreasing().strict()),
    ]
    .into();
    let err = is_monotonic(&t, Some(&rules), Monotonic::either()).unwrap_err();
    assert_eq!(locations(&err), vec![Location::new(2, "down")]);
}

// =============================================================================
// Types
// =============================================================================

#[test]
fn test_schema_distinguishes_bad_names_from_bad_data() {
    let t = table([Column::new("a", [1.5, 2.5])]);

    let bogus: IndexMap<String, String> = [("a".to_string(), "bogus".to_string())].into();
    assert!(has_schema(&t, &bogus).unwrap_err().is_configuration());

    let int: IndexMap<String, String> = [("a".to_string(), "int".to_string())].into();
    assert!(has_schema(&t, &int).unwrap_err().is_validation());

    let float: IndexMap<String, String> = [("a".to_string(), "float".to_string())].into();
    assert!(has_schema(&t, &float).is_ok());
}

#[test]
fn test_has_dtypes_names_the_column() {
    let t = table([Column::new("a", [1, 2]), Column::new("b", ["x", "y"])]);
    let items: IndexMap<String, DType> = [
        ("a".to_string(), DType::Int64),
        ("b".to_string(), DType::Float64),
    ]
    .into();
    let err = has_dtypes(&t, &items).unwrap_err();
    assert!(err.to_string().starts_with("b has the wrong dtype"));
}

// =============================================================================
// Relations
// =============================================================================

#[test]
fn test_one_to_many() {
    let bad = table([
        Column::new("m", [1, 1, 2]),
        Column::new("u", ["x", "y", "z"]),
    ]);
    let err = one_to_many(&bad, "u", "m").unwrap_err();
    assert!(err.to_string().starts_with("1 in m has multiple values for u"));

    let good = table([
        Column::new("m", [1, 1, 2]),
        Column::new("u", ["x", "x", "z"]),
    ]);
    assert!(one_to_many(&good, "u", "m").is_ok());
}

#[test]
fn test_is_same_as() {
    let a = table([Column::new("a", [1.0, 2.0]), Column::new("b", ["x", "y"])]);
    let b = table([Column::new("a", [1.0, 2.0 + 1e-12]), Column::new("b", ["x", "y"])]);
    assert!(is_same_as(&a, &b, &EqualityOptions::default()).is_ok());

    let exact = EqualityOptions {
        check_exact: true,
        ..EqualityOptions::default()
    };
    let err = is_same_as(&a, &b, &exact).unwrap_err();
    assert!(err.failure().unwrap().cause.is_some());
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_multi_check_raise_and_warn() {
    let t = table([
        Column::new("a", [1.0, f64::NAN]),
        Column::new("b", [1, 1]),
    ]);
    let checks = vec![
        Check::HasNoNans { columns: None },
        Check::Unique { columns: None },
    ];

    let board = NoticeBoard::new(CollectingSink::new());
    let err = multi_check_with(&t, &checks, false, &board).unwrap_err();
    let message = &err.failure().unwrap().message;
    let nans = has_no_nans(&t, None).unwrap_err();
    let dups = unique(&t, None).unwrap_err();
    assert!(message.contains(&nans.failure().unwrap().message));
    assert!(message.contains(&dups.failure().unwrap().message));

    let sink = std::sync::Arc::new(CollectingSink::new());
    let board = NoticeBoard::new(sink.clone());
    let before = t.clone();
    let out = multi_check_with(&t, &checks, true, &board).unwrap();
    assert_eq!(out, &before);
    let notices = sink.notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.kind == NoticeKind::CheckFailure));
}
