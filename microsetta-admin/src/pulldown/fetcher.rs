//! Upstream access for the pulldown
//!
//! [`SurveySource`] is the seam between the pipeline and the private REST
//! API. Production code uses [`ApiClient`]; tests plug in canned responses.

use super::report::ErrorRecord;
use super::types::{RawSampleMetadata, TemplateId};
use async_trait::async_trait;
use microsetta_common::{ApiClient, ApiFailure};
use serde_json::Value;

/// Read-only view of the private API used by the pulldown
#[async_trait]
pub trait SurveySource: Send + Sync {
    /// `GET /api/admin/metadata/samples/{barcode}/surveys/`
    async fn sample_surveys(&self, barcode: &str) -> Result<Value, ApiFailure>;

    /// `GET /api/accounts/{account_id}/sources/{source_id}/survey_templates/{template_id}`
    async fn survey_template(
        &self,
        account_id: &str,
        source_id: &str,
        template_id: &TemplateId,
    ) -> Result<Value, ApiFailure>;
}

pub fn sample_surveys_path(barcode: &str) -> String {
    format!("/api/admin/metadata/samples/{}/surveys/", barcode)
}

pub fn survey_template_path(account_id: &str, source_id: &str, template_id: &TemplateId) -> String {
    format!(
        "/api/accounts/{}/sources/{}/survey_templates/{}",
        account_id, source_id, template_id
    )
}

#[async_trait]
impl SurveySource for ApiClient {
    async fn sample_surveys(&self, barcode: &str) -> Result<Value, ApiFailure> {
        self.get_json(&sample_surveys_path(barcode)).await
    }

    async fn survey_template(
        &self,
        account_id: &str,
        source_id: &str,
        template_id: &TemplateId,
    ) -> Result<Value, ApiFailure> {
        self.get_json(&survey_template_path(account_id, source_id, template_id))
            .await
    }
}

/// Fetch and decode one barcode's survey metadata
///
/// Exactly one upstream request. Any failure (status, transport, or a body
/// that does not decode) comes back as an error record for this barcode.
pub async fn fetch_barcode_metadata<S: SurveySource + ?Sized>(
    source: &S,
    barcode: &str,
) -> Result<RawSampleMetadata, ErrorRecord> {
    tracing::debug!(barcode = %barcode, "Fetching sample metadata");

    let body = source
        .sample_surveys(barcode)
        .await
        .map_err(|failure| ErrorRecord::barcode(barcode, failure.to_string()))?;

    serde_json::from_value::<RawSampleMetadata>(body)
        .map_err(|e| ErrorRecord::barcode(barcode, format!("Malformed sample metadata: {}", e)))
}
