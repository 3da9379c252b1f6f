//! Shared fixtures for microsetta-admin integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use microsetta_admin::pulldown::{SurveySource, TemplateId};
use microsetta_common::ApiFailure;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory private API
#[derive(Default)]
pub struct FakeSource {
    pub samples: HashMap<String, Result<Value, ApiFailure>>,
    pub templates: HashMap<String, Result<Value, ApiFailure>>,
    pub sample_calls: Mutex<Vec<String>>,
    pub template_calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_sample(mut self, barcode: &str, body: Value) -> Self {
        self.samples.insert(barcode.to_string(), Ok(body));
        self
    }

    pub fn with_sample_failure(mut self, barcode: &str, failure: ApiFailure) -> Self {
        self.samples.insert(barcode.to_string(), Err(failure));
        self
    }

    pub fn with_template(mut self, template_id: &str, body: Value) -> Self {
        self.templates.insert(template_id.to_string(), Ok(body));
        self
    }

    pub fn with_template_failure(mut self, template_id: &str, failure: ApiFailure) -> Self {
        self.templates.insert(template_id.to_string(), Err(failure));
        self
    }

    pub fn sample_calls(&self) -> Vec<String> {
        self.sample_calls.lock().unwrap().clone()
    }

    pub fn template_calls(&self) -> Vec<String> {
        self.template_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SurveySource for FakeSource {
    async fn sample_surveys(&self, barcode: &str) -> Result<Value, ApiFailure> {
        self.sample_calls.lock().unwrap().push(barcode.to_string());
        self.samples
            .get(barcode)
            .cloned()
            .unwrap_or(Err(ApiFailure::Status(404)))
    }

    async fn survey_template(
        &self,
        _account_id: &str,
        _source_id: &str,
        template_id: &TemplateId,
    ) -> Result<Value, ApiFailure> {
        self.template_calls
            .lock()
            .unwrap()
            .push(template_id.to_string());
        self.templates
            .get(template_id.as_str())
            .cloned()
            .unwrap_or(Err(ApiFailure::Status(404)))
    }
}

/// Template 1: a "pets" checklist (x, y) and a free-text "about" field
pub fn pets_template() -> Value {
    json!({
        "survey_template_id": 1,
        "survey_template_text": {
            "fields": null,
            "groups": [{
                "fields": [
                    {"id": 10, "type": "checklist", "shortname": "pets", "values": ["x", "y"]},
                    {"id": 11, "type": "textArea", "shortname": "about_yourself_text"}
                ]
            }]
        }
    })
}

/// Template 2: scalar measurement questions
pub fn body_template() -> Value {
    json!({
        "survey_template_id": 2,
        "survey_template_text": {
            "fields": [
                {"id": 20, "type": "text", "shortname": "weight_kg"},
                {"id": 21, "type": "select", "shortname": "weight_units", "values": ["pounds", "kilograms"]}
            ],
            "groups": []
        }
    })
}

/// Human stool sample answering the given surveys
pub fn human_sample(barcode: &str, answers: Value) -> Value {
    json!({
        "sample_barcode": barcode,
        "host_subject_id": format!("hsi-{}", barcode),
        "account": {"id": "acct-1"},
        "source": {"id": "src-1", "source_type": "human"},
        "sample": {"datetime_collected": "2021-05-01T09:30:00", "site": "Stool"},
        "survey_answers": answers
    })
}
