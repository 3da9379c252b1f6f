//! Duplicate barcode detection

use super::report::{ErrorRecord, ErrorSubject};
use std::collections::{BTreeSet, HashSet};

/// Barcodes that occur more than once in `barcodes`
pub fn find_duplicates<S: AsRef<str>>(barcodes: &[S]) -> BTreeSet<String> {
    let mut seen = HashSet::with_capacity(barcodes.len());
    let mut dups = BTreeSet::new();

    for barcode in barcodes {
        let barcode = barcode.as_ref();
        if !seen.insert(barcode) {
            dups.insert(barcode.to_string());
        }
    }

    dups
}

/// Error record listing duplicated barcodes, if any
pub fn duplicates_error<S: AsRef<str>>(barcodes: &[S]) -> Option<ErrorRecord> {
    let dups = find_duplicates(barcodes);
    if dups.is_empty() {
        return None;
    }

    Some(ErrorRecord {
        subject: ErrorSubject::Barcodes(dups.into_iter().collect()),
        error: "Duplicated barcodes in input".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_duplicates() {
        let obs = find_duplicates(&["foo", "bar", "foo", "bar", "baz"]);
        let exp: BTreeSet<String> = ["foo", "bar"].iter().map(|s| s.to_string()).collect();
        assert_eq!(obs, exp);

        assert!(find_duplicates(&["foo", "bar"]).is_empty());
    }

    #[test]
    fn test_triplicate_reported_once() {
        let obs = find_duplicates(&["a", "b", "a", "a"]);
        assert_eq!(obs.len(), 1);
        assert!(obs.contains("a"));
    }

    #[test]
    fn test_empty_input_has_no_error() {
        let empty: [&str; 0] = [];
        assert!(find_duplicates(&empty).is_empty());
        assert!(duplicates_error(&["a", "b"]).is_none());
    }

    #[test]
    fn test_duplicates_error_lists_barcodes() {
        let record = duplicates_error(&["a", "b", "a"]).unwrap();
        assert_eq!(record.subject, ErrorSubject::Barcodes(vec!["a".to_string()]));
        assert_eq!(record.error, "Duplicated barcodes in input");
    }
}
