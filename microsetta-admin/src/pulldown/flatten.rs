//! Per-sample row flattening
//!
//! Turns one sample's nested survey answers into a flat column → value row.
//! Multiselect answers expand into one `"true"` column per chosen option;
//! unchosen options are left for table assembly to fill.

use super::constants::{
    human_site_invariants, COLLECTION_TIMESTAMP, HOST_SUBJECT_ID, MISSING_VALUE, SAMPLE_TYPE,
    SELECTED,
};
use super::multiselect::MultiselectMap;
use super::report::ErrorRecord;
use super::types::{AnswerValue, RawSampleMetadata};
use std::collections::{BTreeSet, HashMap};

/// One sample's columns in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    barcode: String,
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl FlatRow {
    pub fn new(barcode: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            order: Vec::new(),
            values: HashMap::new(),
        }
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    /// Set `column` unless it already has a value; returns whether it was set
    pub fn insert_new(&mut self, column: impl Into<String>, value: impl Into<String>) -> bool {
        let column = column.into();
        if self.values.contains_key(&column) {
            return false;
        }
        self.order.push(column.clone());
        self.values.insert(column, value.into());
        true
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Columns in the order they were first set
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<String>, HashMap<String, String>) {
        (self.barcode, self.order, self.values)
    }
}

/// Result of flattening one sample
#[derive(Debug, Clone)]
pub struct FlattenedSample {
    pub row: FlatRow,
    /// Multiselect-derived columns this row set
    pub multiselect_columns: BTreeSet<String>,
    pub errors: Vec<ErrorRecord>,
}

/// Flatten one sample
///
/// Answers are visited in input order. When two answers target the same
/// column the first value stays and the second is reported.
pub fn flatten_sample(sample: &RawSampleMetadata, multiselect_map: &MultiselectMap) -> FlattenedSample {
    let barcode = sample.sample_barcode.as_str();
    let mut row = FlatRow::new(barcode);
    let mut multiselect_columns = BTreeSet::new();
    let mut errors = Vec::new();

    row.insert_new(HOST_SUBJECT_ID, sample.host_subject_id.clone());
    row.insert_new(
        COLLECTION_TIMESTAMP,
        sample
            .sample
            .datetime_collected
            .clone()
            .unwrap_or_else(|| MISSING_VALUE.to_string()),
    );

    add_sample_type(sample, &mut row, &mut errors);

    for survey in &sample.survey_answers {
        for (question_id, entry) in survey.response.iter() {
            let Some(answer) = entry.answer() else {
                errors.push(ErrorRecord::barcode(
                    barcode,
                    format!("Malformed response to question {}", question_id),
                ));
                continue;
            };
            let short_name = answer.short_name();

            match answer.value() {
                AnswerValue::Multi(selected) => {
                    let Some(question) = multiselect_map.get(&survey.template, question_id) else {
                        errors.push(ErrorRecord::barcode(
                            barcode,
                            format!("Unknown question {}/{}", question_id, short_name),
                        ));
                        continue;
                    };

                    for choice in selected {
                        let Some(column) = question.column(choice, short_name) else {
                            errors.push(ErrorRecord::barcode(
                                barcode,
                                format!(
                                    "Invalid response to question {}/{}: unexpected option '{}'",
                                    question_id, short_name, choice
                                ),
                            ));
                            continue;
                        };

                        if row.insert_new(column.clone(), SELECTED) {
                            multiselect_columns.insert(column);
                        } else {
                            errors.push(duplicate_response(barcode, question_id, short_name));
                        }
                    }
                }
                structured if structured.is_structured() => {
                    errors.push(ErrorRecord::barcode(
                        barcode,
                        format!("Malformed response to question {}/{}", question_id, short_name),
                    ));
                }
                scalar => {
                    let Some(text) = scalar.scalar_text() else {
                        continue;
                    };
                    if !row.insert_new(short_name, text) {
                        errors.push(duplicate_response(barcode, question_id, short_name));
                    }
                }
            }
        }
    }

    FlattenedSample {
        row,
        multiselect_columns,
        errors,
    }
}

/// Type label plus, for human sites, the site's invariant columns
fn add_sample_type(sample: &RawSampleMetadata, row: &mut FlatRow, errors: &mut Vec<ErrorRecord>) {
    let barcode = sample.sample_barcode.as_str();

    let label = match sample.source_type() {
        Some("human") => {
            let site = sample.sample.site.as_deref();
            match site.and_then(human_site_invariants) {
                Some(invariants) => {
                    for (key, value) in invariants {
                        row.insert_new(*key, *value);
                    }
                }
                None => errors.push(ErrorRecord::barcode(
                    barcode,
                    format!("Unknown human sample site: {}", site.unwrap_or("none")),
                )),
            }
            site.map(str::to_string)
        }
        Some("animal") => sample.sample.site.clone(),
        _ => sample
            .sample
            .source
            .as_ref()
            .and_then(|s| s.description.clone())
            .or_else(|| sample.source.description.clone()),
    };

    row.insert_new(SAMPLE_TYPE, label.unwrap_or_else(|| MISSING_VALUE.to_string()));
}

fn duplicate_response(barcode: &str, question_id: &str, short_name: &str) -> ErrorRecord {
    ErrorRecord::barcode(
        barcode,
        format!("Duplicate response to question {}/{}", question_id, short_name),
    )
}
