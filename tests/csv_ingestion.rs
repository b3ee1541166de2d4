use std::fs::File;

use chrono::NaiveDate;
use data_analyst_api::ingestion::csv::{ingest_csv_from_reader, ingest_csv_records};
use data_analyst_api::types::{DataType, Value};
use data_analyst_api::IngestionError;

#[test]
fn ingest_csv_fixture_happy_path() {
    let file = File::open("tests/fixtures/people.csv").unwrap();
    let ds = ingest_csv_from_reader(file).unwrap();

    assert_eq!(ds.row_count(), 3);
    assert_eq!(
        ds.schema.field_names().collect::<Vec<_>>(),
        vec!["id", "name", "score", "active", "joined"]
    );
    let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
    assert_eq!(
        types,
        vec![
            DataType::Int64,
            DataType::Utf8,
            DataType::Float64,
            DataType::Bool,
            DataType::DateTime
        ]
    );

    let joined = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Int64(1),
            Value::Utf8("Ada".to_string()),
            Value::Float64(98.5),
            Value::Bool(true),
            Value::DateTime(joined),
        ]
    );
    assert_eq!(ds.rows[2][2], Value::Null);
    assert_eq!(ds.rows[2][4], Value::Null);
}

#[test]
fn ingest_csv_records_uses_caller_reader_settings() {
    let input = "id;label\n1;x\n2;y\n";
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(input.as_bytes());

    let ds = ingest_csv_records(&mut rdr).unwrap();
    assert_eq!(ds.schema.field_names().collect::<Vec<_>>(), vec!["id", "label"]);
    assert_eq!(ds.rows[1], vec![Value::Int64(2), Value::Utf8("y".to_string())]);
}

#[test]
fn ingest_csv_duplicate_and_blank_headers_are_renamed() {
    let ds = ingest_csv_from_reader("a,,a\n1,2,3\n".as_bytes()).unwrap();
    assert_eq!(
        ds.schema.field_names().collect::<Vec<_>>(),
        vec!["a", "Unnamed: 1", "a.1"]
    );
}

#[test]
fn ingest_csv_mixed_numeric_column_widens_to_float() {
    let ds = ingest_csv_from_reader("v\n1\n2.5\n\n3\n".as_bytes()).unwrap();
    assert_eq!(ds.schema.fields[0].data_type, DataType::Float64);
    assert_eq!(ds.rows[0][0], Value::Float64(1.0));
}

#[test]
fn ingest_csv_mixed_text_column_stays_text() {
    let ds = ingest_csv_from_reader("v\n1\nabc\n".as_bytes()).unwrap();
    assert_eq!(ds.schema.fields[0].data_type, DataType::Utf8);
    assert_eq!(ds.rows[0][0], Value::Utf8("1".to_string()));
}

#[test]
fn ingest_csv_all_na_column_is_numeric() {
    let ds = ingest_csv_from_reader("name,empty\nAda,NA\nBob,\n".as_bytes()).unwrap();
    assert_eq!(ds.schema.fields[1].data_type, DataType::Float64);
    assert!(ds.rows.iter().all(|r| r[1].is_null()));
}

#[test]
fn ingest_csv_rejects_rows_wider_than_header() {
    let err = ingest_csv_from_reader("a,b\n1,2,3\n".as_bytes()).unwrap_err();
    assert!(matches!(err, IngestionError::Malformed { .. }));
    assert!(err.is_malformed());
}
