//! Survey template resolution
//!
//! Templates are fetched once per distinct template id across the whole batch,
//! after every sample has been fetched.

use super::fetcher::SurveySource;
use super::report::{ErrorRecord, ErrorSubject};
use super::types::{RawSampleMetadata, SurveyTemplate, TemplateId};
use std::collections::{HashMap, HashSet};

/// One template to fetch, with ids authorized to read it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRequest {
    pub template_id: TemplateId,
    pub account_id: String,
    pub source_id: String,
}

impl TemplateRequest {
    fn error(&self, message: impl Into<String>) -> ErrorRecord {
        ErrorRecord {
            subject: ErrorSubject::Template {
                account_id: self.account_id.clone(),
                source_id: self.source_id.clone(),
                template_id: self.template_id.clone(),
            },
            error: message.into(),
        }
    }
}

/// Outcome of template resolution
#[derive(Debug, Default)]
pub struct TemplateResolution {
    /// Successfully fetched templates
    pub templates: HashMap<TemplateId, SurveyTemplate>,
    pub errors: Vec<ErrorRecord>,
}

/// Distinct templates referenced by `samples`, in first-reference order
///
/// The first sample referencing a template supplies the account/source ids.
pub fn referenced_templates(samples: &[RawSampleMetadata]) -> Vec<TemplateRequest> {
    let mut seen = HashSet::new();
    let mut requests = Vec::new();

    for sample in samples {
        for answer in &sample.survey_answers {
            if seen.insert(answer.template.clone()) {
                requests.push(TemplateRequest {
                    template_id: answer.template.clone(),
                    account_id: sample.account.id.clone(),
                    source_id: sample.source.id.clone(),
                });
            }
        }
    }

    requests
}

/// Fetch every distinct template referenced by `samples`
///
/// Failed templates are left out of the result; samples that depend on them
/// later report unknown questions instead.
pub async fn fetch_survey_templates<S: SurveySource + ?Sized>(
    source: &S,
    samples: &[RawSampleMetadata],
) -> TemplateResolution {
    let mut resolution = TemplateResolution::default();

    for request in referenced_templates(samples) {
        tracing::debug!(template_id = %request.template_id, "Fetching survey template");

        let body = match source
            .survey_template(&request.account_id, &request.source_id, &request.template_id)
            .await
        {
            Ok(body) => body,
            Err(failure) => {
                resolution.errors.push(request.error(failure.to_string()));
                continue;
            }
        };

        match serde_json::from_value::<SurveyTemplate>(body) {
            Ok(template) => {
                resolution.templates.insert(request.template_id, template);
            }
            Err(e) => {
                resolution
                    .errors
                    .push(request.error(format!("Malformed survey template: {}", e)));
            }
        }
    }

    resolution
}
