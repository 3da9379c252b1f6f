//! Derived columns for human samples
//!
//! Each [`Transform`] computes one column from columns already in the table.
//! Transforms run in order because later ones read earlier outputs
//! (`bmi_cat` needs `bmi`, `bmi` needs normalized weight and height).

use crate::pulldown::constants::{COLLECTION_TIMESTAMP, MISSING_VALUE};
use crate::pulldown::table::{ResultTable, TableRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;

const DAYS_PER_YEAR: f64 = 365.2425;

/// One derived column
pub trait Transform: Send + Sync {
    /// Column written by this transform
    fn column(&self) -> &'static str;

    /// Columns that must all exist before the transform runs
    fn required_columns(&self) -> &'static [&'static str];

    /// Value for one row; `None` becomes the missing sentinel
    fn derive(&self, row: &TableRow) -> Option<String>;

    /// Column/value to set on rows where `derive` produced a value
    fn update_existing(&self) -> Option<(&'static str, &'static str)> {
        None
    }
}

/// Apply `transforms` to rows whose barcode is in `barcodes`
///
/// A transform whose required columns are not all present is skipped.
/// Other rows get the sentinel in newly created columns and keep their
/// values in existing ones.
pub fn apply_transforms(
    table: &mut ResultTable,
    barcodes: &HashSet<String>,
    transforms: &[&dyn Transform],
) {
    for transform in transforms {
        // earlier transforms may have added columns
        if !transform
            .required_columns()
            .iter()
            .all(|c| table.has_column(c))
        {
            tracing::debug!(column = transform.column(), "Skipping transform, required columns absent");
            continue;
        }

        let column = transform.column();
        table.add_column(column, MISSING_VALUE);
        if let Some((existing, _)) = transform.update_existing() {
            table.add_column(existing, MISSING_VALUE);
        }

        for row in table.rows_mut() {
            if !barcodes.contains(row.barcode()) {
                continue;
            }
            match transform.derive(row) {
                Some(value) => {
                    row.set(column, value);
                    if let Some((existing, value)) = transform.update_existing() {
                        row.set(existing, value);
                    }
                }
                None => row.set(column, MISSING_VALUE),
            }
        }
    }
}

/// Transforms applied to human samples, in dependency order
pub fn human_transforms() -> [&'static dyn Transform; 7] {
    [
        &AgeYears,
        &AgeCat,
        &NormalizeWeight,
        &NormalizeHeight,
        &Bmi,
        &BmiCat,
        &AlcoholConsumption,
    ]
}

fn number(row: &TableRow, column: &str) -> Option<f64> {
    row.get(column)
        .filter(|v| *v != MISSING_VALUE)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

fn categorize(value: f64, bounds: &[(&'static str, f64, f64)]) -> Option<String> {
    bounds
        .iter()
        .find(|(_, lower, upper)| value >= *lower && value < *upper)
        .map(|(label, _, _)| label.to_string())
}

/// Collection timestamps arrive in a handful of ISO-like shapes
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `birth_month` + `birth_year` + collection time → `age_years`
pub struct AgeYears;

impl Transform for AgeYears {
    fn column(&self) -> &'static str {
        "age_years"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["birth_month", "birth_year", COLLECTION_TIMESTAMP]
    }

    fn derive(&self, row: &TableRow) -> Option<String> {
        let month = row.get("birth_month").filter(|v| *v != MISSING_VALUE)?;
        let year = row.get("birth_year").filter(|v| *v != MISSING_VALUE)?;
        let birth = NaiveDate::parse_from_str(&format!("01 {} {}", month.trim(), year.trim()), "%d %B %Y")
            .ok()?
            .and_hms_opt(0, 0, 0)?;
        let collected = parse_timestamp(row.get(COLLECTION_TIMESTAMP)?)?;

        let days = (collected - birth).num_seconds() as f64 / 86_400.0;
        Some(one_decimal(days / DAYS_PER_YEAR))
    }
}

/// `age_years` → life-stage bucket
pub struct AgeCat;

impl Transform for AgeCat {
    fn column(&self) -> &'static str {
        "age_cat"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["age_years"]
    }

    fn derive(&self, row: &TableRow) -> Option<String> {
        const BOUNDS: &[(&str, f64, f64)] = &[
            ("baby", 0.0, 3.0),
            ("child", 3.0, 13.0),
            ("teen", 13.0, 20.0),
            ("20s", 20.0, 30.0),
            ("30s", 30.0, 40.0),
            ("40s", 40.0, 50.0),
            ("50s", 50.0, 60.0),
            ("60s", 60.0, 70.0),
            ("70+", 70.0, 123.0),
        ];
        categorize(number(row, "age_years")?, BOUNDS)
    }
}

/// Convert a measurement to the canonical unit
///
/// Negative values are dropped. Values without units are dropped because
/// their scale is unknown.
fn normalize(row: &TableRow, focus: &str, units: &str, convert_from: &str, factor: f64) -> Option<String> {
    let value = number(row, focus).filter(|v| *v >= 0.0)?;
    let unit = row.get(units).filter(|v| *v != MISSING_VALUE)?;
    if unit == convert_from {
        Some(one_decimal(value * factor))
    } else {
        Some(one_decimal(value))
    }
}

/// `weight_kg` in kilograms; pounds are converted
pub struct NormalizeWeight;

impl Transform for NormalizeWeight {
    fn column(&self) -> &'static str {
        "weight_kg"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["weight_kg", "weight_units"]
    }

    fn derive(&self, row: &TableRow) -> Option<String> {
        normalize(row, "weight_kg", "weight_units", "pounds", 1.0 / 2.20462)
    }

    fn update_existing(&self) -> Option<(&'static str, &'static str)> {
        Some(("weight_units", "kilograms"))
    }
}

/// `height_cm` in centimeters; inches are converted
pub struct NormalizeHeight;

impl Transform for NormalizeHeight {
    fn column(&self) -> &'static str {
        "height_cm"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["height_cm", "height_units"]
    }

    fn derive(&self, row: &TableRow) -> Option<String> {
        normalize(row, "height_cm", "height_units", "inches", 2.54)
    }

    fn update_existing(&self) -> Option<(&'static str, &'static str)> {
        Some(("height_units", "centimeters"))
    }
}

/// kg / m²
pub struct Bmi;

impl Transform for Bmi {
    fn column(&self) -> &'static str {
        "bmi"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["weight_kg", "height_cm"]
    }

    fn derive(&self, row: &TableRow) -> Option<String> {
        let weight = number(row, "weight_kg")?;
        let height_m = number(row, "height_cm")? / 100.0;
        if height_m <= 0.0 {
            return None;
        }
        Some(one_decimal(weight / (height_m * height_m)))
    }
}

pub struct BmiCat;

impl Transform for BmiCat {
    fn column(&self) -> &'static str {
        "bmi_cat"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["bmi"]
    }

    fn derive(&self, row: &TableRow) -> Option<String> {
        const BOUNDS: &[(&str, f64, f64)] = &[
            ("Underweight", 8.0, 18.5),
            ("Normal", 18.5, 25.0),
            ("Overweight", 25.0, 30.0),
            ("Obese", 30.0, 80.0),
        ];
        categorize(number(row, "bmi")?, BOUNDS)
    }
}

/// Drinking frequency collapsed to Yes/No
pub struct AlcoholConsumption;

impl Transform for AlcoholConsumption {
    fn column(&self) -> &'static str {
        "alcohol_consumption"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["alcohol_frequency"]
    }

    fn derive(&self, row: &TableRow) -> Option<String> {
        let frequency = row.get("alcohol_frequency")?;
        let mapped = match frequency {
            "Rarely (a few times/month)"
            | "Occasionally (1-2 times/week)"
            | "Regularly (3-5 times/week)"
            | "Daily" => "Yes",
            "Never" => "No",
            other => other,
        };
        Some(mapped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulldown::flatten::FlatRow;
    use std::collections::BTreeSet;

    fn table(rows: Vec<(&str, Vec<(&str, &str)>)>) -> ResultTable {
        let flat = rows
            .into_iter()
            .map(|(barcode, cells)| {
                let mut row = FlatRow::new(barcode);
                for (k, v) in cells {
                    row.insert_new(k, v);
                }
                row
            })
            .collect();
        ResultTable::assemble(flat, &BTreeSet::new())
    }

    fn humans(barcodes: &[&str]) -> HashSet<String> {
        barcodes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bmi_from_imperial_units() {
        let mut t = table(vec![(
            "a",
            vec![
                ("weight_kg", "154"),
                ("weight_units", "pounds"),
                ("height_cm", "70"),
                ("height_units", "inches"),
            ],
        )]);

        apply_transforms(&mut t, &humans(&["a"]), &human_transforms());

        assert_eq!(t.get("a", "weight_kg"), Some("69.9"));
        assert_eq!(t.get("a", "weight_units"), Some("kilograms"));
        assert_eq!(t.get("a", "height_cm"), Some("177.8"));
        assert_eq!(t.get("a", "height_units"), Some("centimeters"));
        assert_eq!(t.get("a", "bmi"), Some("22.1"));
        assert_eq!(t.get("a", "bmi_cat"), Some("Normal"));
    }

    #[test]
    fn test_negative_weight_becomes_missing() {
        let mut t = table(vec![(
            "a",
            vec![
                ("weight_kg", "-3"),
                ("weight_units", "kilograms"),
                ("height_cm", "170"),
                ("height_units", "centimeters"),
            ],
        )]);

        apply_transforms(&mut t, &humans(&["a"]), &human_transforms());

        assert_eq!(t.get("a", "weight_kg"), Some(MISSING_VALUE));
        assert_eq!(t.get("a", "bmi"), Some(MISSING_VALUE));
        assert_eq!(t.get("a", "bmi_cat"), Some(MISSING_VALUE));
    }

    #[test]
    fn test_age_years_and_category() {
        let mut t = table(vec![(
            "a",
            vec![
                ("birth_month", "January"),
                ("birth_year", "1980"),
                (COLLECTION_TIMESTAMP, "2020-01-01T00:00:00"),
            ],
        )]);

        apply_transforms(&mut t, &humans(&["a"]), &human_transforms());

        assert_eq!(t.get("a", "age_years"), Some("40.0"));
        assert_eq!(t.get("a", "age_cat"), Some("40s"));
    }

    #[test]
    fn test_age_with_unparseable_timestamp_is_missing() {
        let mut t = table(vec![(
            "a",
            vec![
                ("birth_month", "March"),
                ("birth_year", "1990"),
                (COLLECTION_TIMESTAMP, "sometime"),
            ],
        )]);

        apply_transforms(&mut t, &humans(&["a"]), &human_transforms());

        assert_eq!(t.get("a", "age_years"), Some(MISSING_VALUE));
        assert_eq!(t.get("a", "age_cat"), Some(MISSING_VALUE));
    }

    #[test]
    fn test_alcohol_consumption_mapping() {
        let mut t = table(vec![
            ("a", vec![("alcohol_frequency", "Daily")]),
            ("b", vec![("alcohol_frequency", "Never")]),
            ("c", vec![("alcohol_frequency", "Unspecified")]),
        ]);

        apply_transforms(&mut t, &humans(&["a", "b", "c"]), &human_transforms());

        assert_eq!(t.get("a", "alcohol_consumption"), Some("Yes"));
        assert_eq!(t.get("b", "alcohol_consumption"), Some("No"));
        assert_eq!(t.get("c", "alcohol_consumption"), Some("Unspecified"));
    }

    #[test]
    fn test_non_human_rows_untouched() {
        let mut t = table(vec![
            ("human", vec![("weight_kg", "150"), ("weight_units", "pounds")]),
            ("dog", vec![("weight_kg", "30"), ("weight_units", "pounds")]),
        ]);

        apply_transforms(&mut t, &humans(&["human"]), &human_transforms());

        assert_eq!(t.get("human", "weight_kg"), Some("68.0"));
        assert_eq!(t.get("dog", "weight_kg"), Some("30"));
        assert_eq!(t.get("dog", "weight_units"), Some("pounds"));
    }

    #[test]
    fn test_transform_skipped_without_required_columns() {
        let mut t = table(vec![("a", vec![("diet", "Vegan")])]);

        apply_transforms(&mut t, &humans(&["a"]), &human_transforms());

        assert!(!t.has_column("bmi"));
        assert!(!t.has_column("age_years"));
        assert_eq!(t.columns().len(), 1);
    }
}
