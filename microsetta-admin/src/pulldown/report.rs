//! Accumulated, non-fatal pulldown errors

use super::types::TemplateId;
use serde::Serialize;

/// What an error record is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSubject {
    Barcode(String),
    Barcodes(Vec<String>),
    Template {
        account_id: String,
        source_id: String,
        template_id: TemplateId,
    },
    /// Applies to the whole request
    Batch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub subject: ErrorSubject,
    pub error: String,
}

impl ErrorRecord {
    pub fn barcode(barcode: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            subject: ErrorSubject::Barcode(barcode.into()),
            error: error.into(),
        }
    }

    pub fn batch(error: impl Into<String>) -> Self {
        Self {
            subject: ErrorSubject::Batch,
            error: error.into(),
        }
    }

    /// True when this record names `barcode`, alone or in a list
    pub fn mentions(&self, barcode: &str) -> bool {
        match &self.subject {
            ErrorSubject::Barcode(b) => b == barcode,
            ErrorSubject::Barcodes(bs) => bs.iter().any(|b| b == barcode),
            _ => false,
        }
    }
}

/// Ordered error records for one pulldown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport(Vec<ErrorRecord>);

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ErrorRecord) {
        tracing::warn!(subject = ?record.subject, error = %record.error, "Pulldown error recorded");
        self.0.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ErrorRecord>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.0.iter()
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_serializes_as_list() {
        let mut report = ErrorReport::new();
        report.push(ErrorRecord::barcode("000000001", "404 from api"));
        report.push(ErrorRecord::batch("No metadata was obtained"));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!([
                {"subject": {"barcode": "000000001"}, "error": "404 from api"},
                {"subject": "batch", "error": "No metadata was obtained"}
            ])
        );
    }

    #[test]
    fn test_mentions_checks_lists() {
        let record = ErrorRecord {
            subject: ErrorSubject::Barcodes(vec!["a".into(), "b".into()]),
            error: "Duplicated barcodes in input".into(),
        };
        assert!(record.mentions("b"));
        assert!(!record.mentions("c"));
    }
}
