//! Typed records for upstream survey JSON
//!
//! The private API hands back loosely shaped JSON. These records decode it
//! with optional fields wherever the upstream shape varies, so a malformed
//! sample or template is rejected at the decode step and reported instead of
//! failing deep inside the pipeline.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Survey template key
///
/// Upstream sends integers or strings; both normalize to the same text form so
/// `1` and `"1"` address the same template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(#[serde(deserialize_with = "string_or_number")] pub String);

impl TemplateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for TemplateId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Opaque `{ "id": ... }` holder used for accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdHolder {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Source block of a sample's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Nested `sample.source` block (environmental and other non-host sources)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSource {
    #[serde(default)]
    pub description: Option<String>,
}

/// Physical sample details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleInfo {
    #[serde(default)]
    pub datetime_collected: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub source: Option<SampleSource>,
}

/// Response of `GET /api/admin/metadata/samples/{barcode}/surveys/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSampleMetadata {
    pub sample_barcode: String,
    pub host_subject_id: String,
    #[serde(default)]
    pub source_type: Option<String>,
    pub account: IdHolder,
    pub source: SourceInfo,
    #[serde(default)]
    pub sample: SampleInfo,
    #[serde(default)]
    pub survey_answers: Vec<SurveyAnswer>,
}

impl RawSampleMetadata {
    /// Source type, preferring the top-level value over the source block
    pub fn source_type(&self) -> Option<&str> {
        self.source_type
            .as_deref()
            .or(self.source.source_type.as_deref())
    }

    pub fn is_human(&self) -> bool {
        self.source_type() == Some("human")
    }
}

/// One completed survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyAnswer {
    pub template: TemplateId,
    #[serde(default)]
    pub response: SurveyResponse,
}

/// Question answers in the order the upstream listed them
///
/// Input order drives duplicate detection, so this keeps the JSON object's
/// key order rather than sorting by question id. Entries are decoded one at
/// a time; a bad entry is kept as [`ResponseEntry::Malformed`] so the rest
/// of the sample survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurveyResponse(pub Vec<(String, ResponseEntry)>);

impl SurveyResponse {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResponseEntry)> {
        self.0.iter().map(|(q, a)| (q.as_str(), a))
    }
}

/// One entry of a survey response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseEntry {
    Answer(QuestionAnswer),
    /// Not a `[short_name, answer]` pair; the raw value as received
    Malformed(Value),
}

impl ResponseEntry {
    pub fn answer(&self) -> Option<&QuestionAnswer> {
        match self {
            ResponseEntry::Answer(answer) => Some(answer),
            ResponseEntry::Malformed(_) => None,
        }
    }
}

impl From<Value> for ResponseEntry {
    fn from(raw: Value) -> Self {
        match QuestionAnswer::deserialize(&raw) {
            Ok(answer) => ResponseEntry::Answer(answer),
            Err(_) => ResponseEntry::Malformed(raw),
        }
    }
}

impl<'de> Deserialize<'de> for SurveyResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = SurveyResponse;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of question id to [short_name, answer]")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((question_id, raw)) = map.next_entry::<String, Value>()? {
                    entries.push((question_id, ResponseEntry::from(raw)));
                }
                Ok(SurveyResponse(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// `[short_name, answer]` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer(pub String, pub AnswerValue);

impl QuestionAnswer {
    pub fn short_name(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> &AnswerValue {
        &self.1
    }
}

/// Multi-select answers arrive as string lists, everything else as a scalar
///
/// A list holding anything but strings lands in `Scalar`; see [`Self::is_structured`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Multi(Vec<String>),
    Scalar(Value),
}

impl AnswerValue {
    /// Array or object that is not a valid multiselect list
    pub fn is_structured(&self) -> bool {
        matches!(self, AnswerValue::Scalar(Value::Array(_) | Value::Object(_)))
    }

    /// Cell text for a scalar answer; `None` for null
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            AnswerValue::Scalar(Value::Null) => None,
            AnswerValue::Scalar(Value::String(s)) => Some(s.clone()),
            AnswerValue::Scalar(other) => Some(other.to_string()),
            AnswerValue::Multi(_) => None,
        }
    }
}

/// Response of `GET /api/accounts/{a}/sources/{s}/survey_templates/{t}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyTemplate {
    #[serde(default)]
    pub survey_template_id: Option<TemplateId>,
    pub survey_template_text: SurveyTemplateText,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyTemplateText {
    #[serde(default)]
    pub fields: Option<Vec<TemplateField>>,
    #[serde(default)]
    pub groups: Option<Vec<FieldGroup>>,
}

impl SurveyTemplateText {
    /// Top-level fields followed by every group's fields
    pub fn all_fields(&self) -> impl Iterator<Item = &TemplateField> {
        let top = self.fields.iter().flatten();
        let grouped = self.groups.iter().flatten().flat_map(|g| g.fields.iter().flatten());
        top.chain(grouped)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    #[serde(default)]
    pub fields: Option<Vec<TemplateField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub values: Option<Vec<Value>>,
}

impl TemplateField {
    pub fn is_checklist(&self) -> bool {
        self.field_type == "checklist"
    }

    /// Legal option strings
    pub fn options(&self) -> Vec<String> {
        self.values
            .iter()
            .flatten()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, found {}",
            other
        ))),
    }
}
