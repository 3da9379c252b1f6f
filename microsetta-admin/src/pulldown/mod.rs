//! Metadata pulldown
//!
//! Converts a list of sample barcodes into one wide metadata table:
//!
//! 1. Flag duplicated barcodes (reported, still fetched, one row each)
//! 2. Fetch every barcode's survey metadata, one request at a time
//! 3. Fetch each distinct survey template once
//! 4. Build the multiselect option → column map
//! 5. Flatten each sample into a row
//! 6. Assemble rows into a table and fill absent cells
//! 7. Derive human-specific columns
//!
//! Template fetches start only after every sample fetch has finished, since
//! the multiselect map must cover every referenced template before any row
//! is flattened. Recoverable problems go into the returned [`ErrorReport`];
//! only an unsafe column name aborts the pulldown.

pub mod constants;
pub mod dedup;
pub mod fetcher;
pub mod flatten;
pub mod multiselect;
pub mod privacy;
pub mod report;
pub mod table;
pub mod templates;
pub mod types;

pub use constants::MISSING_VALUE;
pub use dedup::find_duplicates;
pub use fetcher::{fetch_barcode_metadata, SurveySource};
pub use flatten::{flatten_sample, FlatRow, FlattenedSample};
pub use multiselect::{build_col_name, ChecklistQuestion, MultiselectMap};
pub use privacy::drop_private_columns;
pub use report::{ErrorRecord, ErrorReport, ErrorSubject};
pub use table::{ResultTable, TableRow};
pub use templates::fetch_survey_templates;
pub use types::{RawSampleMetadata, ResponseEntry, SurveyTemplate, TemplateId};

use crate::error::PulldownError;
use crate::transforms::{apply_transforms, human_transforms};
use std::collections::{BTreeSet, HashSet};
use tracing::info;

/// Table plus everything that went wrong while building it
#[derive(Debug, Clone, Default)]
pub struct PulldownResult {
    pub table: ResultTable,
    pub errors: ErrorReport,
}

/// Run a pulldown for `barcodes`
///
/// Per-barcode and per-template failures are reported and skipped. When no
/// sample could be fetched the table is empty and the report says so.
pub async fn retrieve_metadata<S, B>(source: &S, barcodes: &[B]) -> Result<PulldownResult, PulldownError>
where
    S: SurveySource + ?Sized,
    B: AsRef<str>,
{
    let mut errors = ErrorReport::new();

    if let Some(record) = dedup::duplicates_error(barcodes) {
        errors.push(record);
    }

    let mut fetched = Vec::with_capacity(barcodes.len());
    for barcode in barcodes {
        match fetch_barcode_metadata(source, barcode.as_ref()).await {
            Ok(sample) => fetched.push(sample),
            Err(record) => errors.push(record),
        }
    }

    if fetched.is_empty() {
        errors.push(ErrorRecord::batch("No metadata was obtained"));
        return Ok(PulldownResult {
            table: ResultTable::default(),
            errors,
        });
    }

    let resolution = fetch_survey_templates(source, &fetched).await;
    errors.extend(resolution.errors);

    let multiselect_map = MultiselectMap::build(&resolution.templates)?;

    let mut rows = Vec::with_capacity(fetched.len());
    let mut multiselect_columns = BTreeSet::new();
    let mut human_barcodes = HashSet::new();

    let mut flattened_barcodes = HashSet::new();

    for sample in &fetched {
        // one row per barcode; a repeated barcode keeps its first fetch
        if !flattened_barcodes.insert(sample.sample_barcode.as_str()) {
            continue;
        }

        let flattened = flatten_sample(sample, &multiselect_map);
        errors.extend(flattened.errors);
        multiselect_columns.extend(flattened.multiselect_columns);
        rows.push(flattened.row);

        if sample.is_human() {
            human_barcodes.insert(sample.sample_barcode.clone());
        }
    }

    let mut table = ResultTable::assemble(rows, &multiselect_columns);
    apply_transforms(&mut table, &human_barcodes, &human_transforms());

    info!(
        requested = barcodes.len(),
        fetched = fetched.len(),
        templates = resolution.templates.len(),
        columns = table.columns().len(),
        errors = errors.len(),
        "Metadata pulldown complete"
    );

    Ok(PulldownResult { table, errors })
}
