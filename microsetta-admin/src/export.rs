//! Tab-separated export of pulldown tables

use crate::pulldown::{ResultTable, MISSING_VALUE};
use std::io::Write;

/// Header of the sample identifier column
pub const INDEX_COLUMN: &str = "sample_name";

/// Write `table` as TSV: one header row, sample identifier first
pub fn write_tsv<W: Write>(table: &ResultTable, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(INDEX_COLUMN);
    header.extend(table.columns().iter().map(String::as_str));
    out.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.barcode());
        record.extend(
            table
                .columns()
                .iter()
                .map(|c| row.get(c).unwrap_or(MISSING_VALUE)),
        );
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// Render `table` as a TSV string
pub fn to_tsv_string(table: &ResultTable) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_tsv(table, &mut buffer)?;
    // csv only writes the UTF-8 text it was given
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulldown::FlatRow;
    use std::collections::BTreeSet;

    #[test]
    fn test_tsv_layout() {
        let mut a = FlatRow::new("000000001");
        a.insert_new("HOST_SUBJECT_ID", "h1");
        a.insert_new("diet", "Vegan");
        let mut b = FlatRow::new("000000002");
        b.insert_new("HOST_SUBJECT_ID", "h2");
        let table = ResultTable::assemble(vec![a, b], &BTreeSet::new());

        let tsv = to_tsv_string(&table).unwrap();
        let lines: Vec<&str> = tsv.lines().collect();

        assert_eq!(lines[0], "sample_name\tHOST_SUBJECT_ID\tdiet");
        assert_eq!(lines[1], "000000001\th1\tVegan");
        assert_eq!(lines[2], "000000002\th2\tMissing: not provided");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let tsv = to_tsv_string(&ResultTable::default()).unwrap();
        assert_eq!(tsv, "sample_name\n");
    }
}
