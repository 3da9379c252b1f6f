//! End-to-end pulldown tests against an in-memory private API

mod helpers;

use helpers::{body_template, human_sample, pets_template, FakeSource};
use microsetta_admin::export::to_tsv_string;
use microsetta_admin::pulldown::constants::{COLLECTION_TIMESTAMP, HOST_SUBJECT_ID};
use microsetta_admin::pulldown::{
    drop_private_columns, retrieve_metadata, ErrorSubject, MISSING_VALUE,
};
use microsetta_admin::PulldownError;
use microsetta_common::ApiFailure;
use serde_json::json;

#[tokio::test]
async fn test_multiselect_round_trip_fills_false() {
    let source = FakeSource::default()
        .with_template("1", pets_template())
        .with_sample(
            "a",
            human_sample("a", json!([{"template": 1, "response": {"10": ["pets", ["x"]]}}])),
        )
        .with_sample(
            "b",
            human_sample("b", json!([{"template": 1, "response": {"10": ["pets", ["y"]]}}])),
        );

    let result = retrieve_metadata(&source, &["a", "b"]).await.unwrap();

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.table.get("a", "pets_x"), Some("true"));
    assert_eq!(result.table.get("a", "pets_y"), Some("false"));
    assert_eq!(result.table.get("b", "pets_x"), Some("false"));
    assert_eq!(result.table.get("b", "pets_y"), Some("true"));
    assert_eq!(result.table.get("a", HOST_SUBJECT_ID), Some("hsi-a"));
    assert_eq!(result.table.get("a", COLLECTION_TIMESTAMP), Some("2021-05-01T09:30:00"));
}

#[tokio::test]
async fn test_missing_sample_reported_and_batch_continues() {
    let source = FakeSource::default()
        .with_template("2", body_template())
        .with_sample_failure("gone", ApiFailure::Status(404))
        .with_sample(
            "ok",
            human_sample("ok", json!([{"template": 2, "response": {"20": ["weight_kg", "70"]}}])),
        );

    let result = retrieve_metadata(&source, &["gone", "ok"]).await.unwrap();

    assert_eq!(result.table.len(), 1);
    assert!(result.table.row("gone").is_none());
    assert!(result.table.row("ok").is_some());

    let records: Vec<_> = result.errors.iter().filter(|r| r.mentions("gone")).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].error, "404 from api");
    assert_eq!(result.errors.len(), 1);
}

#[tokio::test]
async fn test_optional_field_missing_in_one_sample() {
    let source = FakeSource::default()
        .with_template("2", body_template())
        .with_sample(
            "a",
            human_sample("a", json!([{"template": 2, "response": {"20": ["weight_kg", "70"]}}])),
        )
        .with_sample("b", human_sample("b", json!([])));

    let result = retrieve_metadata(&source, &["a", "b"]).await.unwrap();

    assert_eq!(result.table.get("a", "weight_kg"), Some("70"));
    assert_eq!(result.table.get("b", "weight_kg"), Some(MISSING_VALUE));
}

#[tokio::test]
async fn test_duplicates_flagged_fetched_each_time_one_row() {
    let source = FakeSource::default()
        .with_sample("a", human_sample("a", json!([])))
        .with_sample("b", human_sample("b", json!([])));

    let result = retrieve_metadata(&source, &["a", "b", "a"]).await.unwrap();

    assert_eq!(source.sample_calls(), vec!["a", "b", "a"]);
    assert_eq!(result.table.len(), 2);

    let tsv = to_tsv_string(&result.table).unwrap();
    assert_eq!(tsv.lines().filter(|l| l.starts_with("a\t")).count(), 1);

    let first = &result.errors.records()[0];
    assert_eq!(first.subject, ErrorSubject::Barcodes(vec!["a".to_string()]));
    assert_eq!(first.error, "Duplicated barcodes in input");
    assert_eq!(result.errors.len(), 1);
}

#[tokio::test]
async fn test_templates_fetched_once_per_distinct_id() {
    let answers = json!([
        {"template": 1, "response": {}},
        {"template": 2, "response": {}}
    ]);
    let source = FakeSource::default()
        .with_template("1", pets_template())
        .with_template("2", body_template())
        .with_sample("a", human_sample("a", answers.clone()))
        .with_sample("b", human_sample("b", answers.clone()))
        .with_sample("c", human_sample("c", answers));

    retrieve_metadata(&source, &["a", "b", "c"]).await.unwrap();

    assert_eq!(source.template_calls(), vec!["1", "2"]);
}

#[tokio::test]
async fn test_template_failure_reported_and_dependents_degrade() {
    let source = FakeSource::default()
        .with_template_failure("1", ApiFailure::Status(500))
        .with_sample(
            "a",
            human_sample("a", json!([{"template": 1, "response": {"10": ["pets", ["x"]]}}])),
        );

    let result = retrieve_metadata(&source, &["a"]).await.unwrap();

    assert_eq!(result.table.len(), 1);
    assert!(!result.table.has_column("pets_x"));

    let template_errors: Vec<_> = result
        .errors
        .iter()
        .filter(|r| matches!(r.subject, ErrorSubject::Template { .. }))
        .collect();
    assert_eq!(template_errors.len(), 1);
    assert_eq!(template_errors[0].error, "500 from api");

    assert!(result
        .errors
        .iter()
        .any(|r| r.mentions("a") && r.error == "Unknown question 10/pets"));
}

#[tokio::test]
async fn test_no_samples_fetched_returns_empty_table() {
    let source = FakeSource::default();

    let result = retrieve_metadata(&source, &["x", "y"]).await.unwrap();

    assert!(result.table.is_empty());
    let last = result.errors.records().last().unwrap();
    assert_eq!(last.subject, ErrorSubject::Batch);
    assert_eq!(last.error, "No metadata was obtained");
    assert!(source.template_calls().is_empty());
}

#[tokio::test]
async fn test_malformed_sample_is_schema_error() {
    let source = FakeSource::default().with_sample("bad", json!({"sample_barcode": "bad"}));

    let result = retrieve_metadata(&source, &["bad"]).await.unwrap();

    let record = &result.errors.records()[0];
    assert!(record.mentions("bad"));
    assert!(record.error.starts_with("Malformed sample metadata"));
}

#[tokio::test]
async fn test_unsafe_option_aborts_pulldown() {
    let source = FakeSource::default()
        .with_template(
            "1",
            json!({
                "survey_template_text": {
                    "fields": [{"id": 1, "type": "checklist", "shortname": "blood", "values": ["A+", "A-"]}]
                }
            }),
        )
        .with_sample("a", human_sample("a", json!([{"template": 1, "response": {}}])));

    let err = retrieve_metadata(&source, &["a"]).await.unwrap_err();
    assert!(matches!(err, PulldownError::UnsafeColumnName { .. }));
}

#[tokio::test]
async fn test_human_transforms_applied() {
    let source = FakeSource::default()
        .with_template("2", body_template())
        .with_sample(
            "a",
            human_sample(
                "a",
                json!([{"template": 2, "response": {
                    "20": ["weight_kg", "220.462"],
                    "21": ["weight_units", "pounds"]
                }}]),
            ),
        );

    let result = retrieve_metadata(&source, &["a"]).await.unwrap();

    assert_eq!(result.table.get("a", "weight_kg"), Some("100.0"));
    assert_eq!(result.table.get("a", "weight_units"), Some("kilograms"));
}

#[tokio::test]
async fn test_export_drops_private_columns() {
    let source = FakeSource::default()
        .with_template("1", pets_template())
        .with_sample(
            "a",
            human_sample(
                "a",
                json!([{"template": 1, "response": {
                    "11": ["ABOUT_YOURSELF_TEXT", "I like dogs"],
                    "10": ["pets", ["x"]]
                }}]),
            ),
        );

    let result = retrieve_metadata(&source, &["a"]).await.unwrap();
    assert!(result.table.has_column("ABOUT_YOURSELF_TEXT"));

    let tsv = to_tsv_string(&drop_private_columns(&result.table)).unwrap();
    assert!(!tsv.contains("ABOUT_YOURSELF_TEXT"));
    assert!(!tsv.contains("I like dogs"));
    assert!(tsv.starts_with("sample_name\tHOST_SUBJECT_ID\tCOLLECTION_TIMESTAMP"));
    assert!(tsv.contains("pets_x"));
}

#[tokio::test]
async fn test_malformed_answer_keeps_rest_of_sample() {
    let source = FakeSource::default()
        .with_template("2", body_template())
        .with_sample(
            "a",
            human_sample(
                "a",
                json!([{"template": 2, "response": {
                    "20": ["weight_kg", "70"],
                    "21": ["weight_units"]
                }}]),
            ),
        );

    let result = retrieve_metadata(&source, &["a"]).await.unwrap();

    assert_eq!(result.table.len(), 1);
    assert_eq!(result.table.get("a", "weight_kg"), Some("70"));
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors.records()[0].mentions("a"));
    assert_eq!(result.errors.records()[0].error, "Malformed response to question 21");
}

#[tokio::test]
async fn test_multiselect_with_non_string_option_reported() {
    let source = FakeSource::default()
        .with_template("1", pets_template())
        .with_sample(
            "a",
            human_sample("a", json!([{"template": 1, "response": {"10": ["pets", ["x", 1]]}}])),
        );

    let result = retrieve_metadata(&source, &["a"]).await.unwrap();

    assert!(!result.table.has_column("pets"));
    assert!(!result.table.has_column("pets_x"));
    assert_eq!(result.errors.records()[0].error, "Malformed response to question 10/pets");
}
