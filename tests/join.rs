use choropleth::Row;
use choropleth::join::{numeric_value, prepare_data};
use choropleth::models::Feature;
use serde_json::{Value, json};

fn rows(v: Value) -> Vec<Row> {
    serde_json::from_value(v).unwrap()
}

fn feature(props: Value) -> Feature {
    serde_json::from_value(json!({ "type": "Feature", "properties": props, "geometry": null }))
        .unwrap()
}

#[test]
fn duplicate_codes_keep_the_last_row() {
    let data = prepare_data(
        &rows(json!([
            {"code": "US", "val": 10},
            {"code": "FR", "val": 20},
            {"code": "US", "val": 30}
        ])),
        "code",
        "val",
    );
    assert_eq!(data.len(), 2);
    assert_eq!(data.value("US"), Some(30.0));
    assert_eq!(data.value("FR"), Some(20.0));
}

#[test]
fn codes_match_case_insensitively_and_trimmed() {
    let data = prepare_data(
        &rows(json!([{"code": " us ", "val": "12.5"}])),
        "code",
        "val",
    );
    assert_eq!(data.value("US"), Some(12.5));
    let f = feature(json!({"iso_a2": "Us", "name": "United States"}));
    assert_eq!(data.value_for_feature(&f, "iso_a2"), Some(12.5));
    assert_eq!(data.value_for_feature(&f, "iso_a3"), None);
}

#[test]
fn numeric_codes_join_integral_floats() {
    let data = prepare_data(&rows(json!([{"id": 840.0, "v": 1}])), "id", "v");
    let f = feature(json!({"iso_n3": 840}));
    assert_eq!(data.value_for_feature(&f, "iso_n3"), Some(1.0));
}

#[test]
fn rows_without_code_or_numeric_value_are_skipped() {
    let data = prepare_data(
        &rows(json!([
            {"code": "DE", "val": 5},
            {"code": "DE", "val": "n/a"},
            {"code": null, "val": 3},
            {"code": "", "val": 3},
            {"val": 4}
        ])),
        "code",
        "val",
    );
    assert_eq!(data.len(), 1);
    assert_eq!(data.value("DE"), Some(5.0));
}

#[test]
fn unset_columns_give_an_empty_dataset() {
    let r = rows(json!([{"code": "US", "val": 1}]));
    assert!(prepare_data(&r, "", "val").is_empty());
    assert!(prepare_data(&r, "code", "").is_empty());
}

#[test]
fn joined_row_is_kept_whole() {
    let data = prepare_data(
        &rows(json!([{"code": "FR", "val": 2, "label": "France"}])),
        "code",
        "val",
    );
    let d = data.get("fr").unwrap();
    assert_eq!(d.row["label"], json!("France"));
}

#[test]
fn numeric_value_accepts_numbers_and_numeric_strings() {
    assert_eq!(numeric_value(&json!(3)), Some(3.0));
    assert_eq!(numeric_value(&json!(" 4.5 ")), Some(4.5));
    assert_eq!(numeric_value(&json!("abc")), None);
    assert_eq!(numeric_value(&json!(true)), None);
    assert_eq!(numeric_value(&Value::Null), None);
}
